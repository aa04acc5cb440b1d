//! `vx stats`: the follow-up dashboard.

use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use vortex_core::TaskStore;
use vortex_core::aggregate::Dashboard;
use vortex_core::store::LoadState;

use super::App;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_to, truncate};

/// Arguments for `vx stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

/// Report payload for `vx stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub source: String,
    pub load_state: LoadState,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// Execute `vx stats`.
pub fn run_stats(_args: &StatsArgs, app: &App) -> anyhow::Result<()> {
    let store = app.load()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_stats(&store, &app.source.location(), app.now, app.output, &mut out)
}

pub fn write_stats(
    store: &TaskStore,
    source: &str,
    now: DateTime<Utc>,
    mode: OutputMode,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let report = StatsReport {
        source: source.to_string(),
        load_state: store.load_state(),
        dashboard: store.dashboard(now),
    };
    render_to(out, mode, &report, render_stats_text, render_stats_pretty)
}

fn render_stats_text(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    let d = &report.dashboard;
    writeln!(w, "total\t{}", d.summary.total)?;
    writeln!(w, "ghosted\t{}", d.summary.ghosted)?;
    writeln!(w, "followed_up\t{}", d.summary.followed_up)?;
    writeln!(w, "completed\t{}", d.summary.completed)?;
    writeln!(w, "average_delay\t{}", d.summary.average_delay)?;
    writeln!(w, "follow_up_rate\t{}", d.follow_up_rate)?;
    writeln!(w, "ghosted_share\t{}", d.ghosted_share)?;
    for slice in &d.status {
        writeln!(w, "status\t{}\t{}", slice.status, slice.value)?;
    }
    for project in &d.top_projects {
        writeln!(w, "project\t{}\t{}", project.name, project.count)?;
    }
    Ok(())
}

fn render_stats_pretty(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    let d = &report.dashboard;

    if report.load_state == LoadState::Failed {
        writeln!(w, "! could not load {}; showing empty data\n", report.source)?;
    }

    pretty_section(w, "Follow-up vortex")?;
    pretty_kv(w, "Total tasks", d.summary.total.to_string())?;
    pretty_kv(
        w,
        "Ghosted",
        format!("{}  ({}% of all tasks)", d.summary.ghosted, d.ghosted_share),
    )?;
    pretty_kv(
        w,
        "Followed up",
        format!("{}  ({}% follow-up rate)", d.summary.followed_up, d.follow_up_rate),
    )?;
    pretty_kv(w, "Completed", d.summary.completed.to_string())?;
    pretty_kv(w, "Average delay", format!("{} days", d.summary.average_delay))?;

    writeln!(w)?;
    pretty_section(w, "Task status")?;
    for slice in &d.status {
        writeln!(w, "  {:<12} {:>5}", slice.status, slice.value)?;
    }

    writeln!(w)?;
    pretty_section(w, "Tasks by project")?;
    if d.top_projects.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for project in &d.top_projects {
        writeln!(w, "  {:<24} {:>5}", truncate(&project.name, 24), project.count)?;
    }

    writeln!(w)?;
    pretty_section(w, "Ghosted tasks")?;
    if d.ghosted_preview.is_empty() {
        writeln!(w, "  Nothing has slipped through the cracks.")?;
    }
    for task in &d.ghosted_preview {
        let days = task
            .days_since_mentioned
            .map_or_else(|| "?".to_string(), |days| days.to_string());
        writeln!(
            w,
            "  {}  {}  [{}]  {}  (last mentioned {days} days ago)",
            task.id,
            truncate(task.description.as_deref().unwrap_or_default(), 36),
            task.project.as_deref().unwrap_or("-"),
            task.owner.as_deref().unwrap_or("-"),
        )?;
    }
    if d.ghosted_total > d.ghosted_preview.len() {
        writeln!(
            w,
            "  … view all {} ghosted tasks with `vx ghosted`",
            d.ghosted_total
        )?;
    }

    Ok(())
}
