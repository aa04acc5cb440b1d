use std::path::PathBuf;

use clap::Args;

use super::{App, finish_mutation};

/// Arguments for `vx set-status`.
#[derive(Args, Debug)]
pub struct SetStatusArgs {
    /// Task ID or unique prefix (see `vx list`).
    pub id: String,

    /// New Status value. Open, Closed, Completed and Blocked are the usual
    /// ones; anything else is stored verbatim.
    pub status: String,

    /// Export the updated collection into this directory.
    #[arg(long, value_name = "DIR")]
    pub write: Option<PathBuf>,
}

/// Execute `vx set-status`.
pub fn run_set_status(args: &SetStatusArgs, app: &App) -> anyhow::Result<()> {
    let mut store = app.load()?;
    let id = store.resolve(&args.id)?;
    store.update_status(&id, &args.status, app.now)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    finish_mutation(
        &store,
        &id,
        "status updated",
        args.write.as_deref(),
        app.now,
        app.output,
        &mut out,
    )
}
