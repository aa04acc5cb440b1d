use std::path::PathBuf;

use clap::Args;

use super::{App, finish_mutation};

/// Arguments for `vx follow-up`.
#[derive(Args, Debug)]
pub struct FollowUpArgs {
    /// Task ID or unique prefix (see `vx list`).
    pub id: String,

    /// Export the updated collection into this directory.
    #[arg(long, value_name = "DIR")]
    pub write: Option<PathBuf>,
}

/// Execute `vx follow-up`.
///
/// Marks the follow-up as scheduled and sets `Last_Mentioned` to today.
pub fn run_follow_up(args: &FollowUpArgs, app: &App) -> anyhow::Result<()> {
    let mut store = app.load()?;
    let id = store.resolve(&args.id)?;
    store.schedule_follow_up(&id, app.now)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    finish_mutation(
        &store,
        &id,
        "follow-up scheduled",
        args.write.as_deref(),
        app.now,
        app.output,
        &mut out,
    )
}
