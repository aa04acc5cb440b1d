use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Args;
use vortex_core::TaskStore;

use super::{App, TaskRow, write_task_pretty, write_task_text};
use crate::output::{OutputMode, render_to};

/// Arguments for `vx list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tasks in this project (exact match).
    #[arg(long)]
    pub project: Option<String>,

    /// Only tasks owned by this person (exact match).
    #[arg(long)]
    pub owner: Option<String>,

    /// Only tasks with this raw Status value (e.g. Open, Closed, Blocked).
    #[arg(long)]
    pub status: Option<String>,
}

impl ListArgs {
    fn accepts(&self, row: &TaskRow<'_>) -> bool {
        let record = row.record;
        [
            (&self.project, record.project()),
            (&self.owner, record.owner()),
            (&self.status, record.status()),
        ]
        .into_iter()
        .all(|(wanted, actual)| wanted.as_deref().is_none_or(|wanted| actual == Some(wanted)))
    }
}

/// Execute `vx list`.
pub fn run_list(args: &ListArgs, app: &App) -> anyhow::Result<()> {
    let store = app.load()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_list(&store, args, app.now, app.output, &mut out)
}

pub fn write_list(
    store: &TaskStore,
    args: &ListArgs,
    now: DateTime<Utc>,
    mode: OutputMode,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let rows: Vec<TaskRow<'_>> = store
        .records()
        .iter()
        .map(|record| TaskRow::new(record, now))
        .filter(|row| args.accepts(row))
        .collect();

    render_to(
        out,
        mode,
        &rows,
        |rows, w| write_task_text(rows, w),
        |rows, w| write_task_pretty(rows, w),
    )
}
