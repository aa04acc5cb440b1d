use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use vortex_core::TaskStore;
use vortex_core::aggregate::{self, GhostedTask};

use super::App;
use crate::output::{OutputMode, pretty_section, render_to, truncate};

/// Arguments for `vx ghosted`.
#[derive(Args, Debug, Default)]
pub struct GhostedArgs {
    /// Show at most N tasks (default: all).
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GhostedReport {
    /// Ghosted tasks in the collection, before `--limit`.
    pub total: usize,
    pub tasks: Vec<GhostedTask>,
}

/// Execute `vx ghosted`.
pub fn run_ghosted(args: &GhostedArgs, app: &App) -> anyhow::Result<()> {
    let store = app.load()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_ghosted(&store, args.limit, app.now, app.output, &mut out)
}

pub fn write_ghosted(
    store: &TaskStore,
    limit: Option<usize>,
    now: DateTime<Utc>,
    mode: OutputMode,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let ghosted = aggregate::ghosted_tasks(store.records(), now);
    let report = GhostedReport {
        total: ghosted.len(),
        tasks: ghosted
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|record| GhostedTask::from_record(record, now))
            .collect(),
    };
    render_to(out, mode, &report, render_ghosted_text, render_ghosted_pretty)
}

fn days_label(task: &GhostedTask) -> String {
    task.days_since_mentioned
        .map_or_else(|| "?".to_string(), |days| days.to_string())
}

fn render_ghosted_text(report: &GhostedReport, w: &mut dyn Write) -> std::io::Result<()> {
    for task in &report.tasks {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            task.id,
            task.project.as_deref().unwrap_or_default(),
            task.owner.as_deref().unwrap_or_default(),
            task.last_mentioned.as_deref().unwrap_or_default(),
            days_label(task),
            task.description.as_deref().unwrap_or_default(),
        )?;
    }
    Ok(())
}

fn render_ghosted_pretty(report: &GhostedReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Ghosted tasks ({})", report.total))?;
    if report.tasks.is_empty() {
        return writeln!(w, "Nothing has slipped through the cracks.");
    }

    for task in &report.tasks {
        writeln!(
            w,
            "{}  {}",
            task.id,
            task.description.as_deref().unwrap_or("(no description)")
        )?;
        writeln!(
            w,
            "    project: {}  owner: {}",
            truncate(task.project.as_deref().unwrap_or("-"), 24),
            truncate(task.owner.as_deref().unwrap_or("-"), 24),
        )?;
        writeln!(
            w,
            "    due: {}  last mentioned: {} ({} days ago)",
            task.original_due_date.as_deref().unwrap_or("N/A"),
            task.last_mentioned.as_deref().unwrap_or("N/A"),
            days_label(task),
        )?;
    }

    let hidden = report.total.saturating_sub(report.tasks.len());
    if hidden > 0 {
        writeln!(w, "… {hidden} more")?;
    }
    Ok(())
}
