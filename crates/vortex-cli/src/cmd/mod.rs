pub mod completions;
pub mod export;
pub mod follow_up;
pub mod ghosted;
pub mod list;
pub mod projects;
pub mod session;
pub mod stats;
pub mod status;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use vortex_core::aggregate::Summary;
use vortex_core::classify::{self, DerivedStatus};
use vortex_core::export::write_export;
use vortex_core::store::LoadState;
use vortex_core::{Record, Source, TaskId, TaskStore};

use crate::output::{OutputMode, pretty_kv, render_to, truncate};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct App {
    pub output: OutputMode,
    pub source: Source,
    pub export_dir: PathBuf,
    pub now: DateTime<Utc>,
}

impl App {
    /// Create a store and run the initial load.
    ///
    /// A failed fetch is not an error here: the store stays empty and the
    /// command renders zeros.
    pub fn load(&self) -> anyhow::Result<TaskStore> {
        let mut store = TaskStore::new();
        if store.refresh(&self.source, self.now)? == LoadState::Failed {
            warn!(source = %self.source, "showing an empty dashboard");
        }
        Ok(store)
    }
}

/// One task as listed by `vx list` and mutation commands.
#[derive(Debug, Serialize)]
pub struct TaskRow<'a> {
    #[serde(flatten)]
    pub record: &'a Record,
    pub derived: DerivedStatus,
}

impl<'a> TaskRow<'a> {
    pub fn new(record: &'a Record, now: DateTime<Utc>) -> Self {
        Self {
            record,
            derived: classify::derived_status(record, now),
        }
    }
}

pub const TASK_HEADERS: [&str; 7] = [
    "ID",
    "PROJECT",
    "OWNER",
    "STATUS",
    "LAST MENTIONED",
    "FOLLOW-UP",
    "DESCRIPTION",
];

/// Tab-separated rows, header first.
pub fn write_task_text(rows: &[TaskRow<'_>], w: &mut dyn Write) -> io::Result<()> {
    if !rows.is_empty() {
        writeln!(w, "{}", TASK_HEADERS.join("\t"))?;
    }
    for row in rows {
        let r = row.record;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.id(),
            r.project().unwrap_or_default(),
            r.owner().unwrap_or_default(),
            r.status().unwrap_or_default(),
            r.last_mentioned().unwrap_or_default(),
            r.follow_up_scheduled().unwrap_or_default(),
            r.description().unwrap_or_default(),
        )?;
    }
    Ok(())
}

/// Aligned table for terminals.
pub fn write_task_pretty(rows: &[TaskRow<'_>], w: &mut dyn Write) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "No tasks loaded.");
    }
    // IDs embed the line number, so the column grows with the file.
    let id_width = rows
        .iter()
        .map(|row| row.record.id().as_str().len())
        .max()
        .unwrap_or(0)
        .max(10);
    writeln!(
        w,
        "{:<id_width$}  {:<14}  {:<16}  {:<10}  {:<11}  {:<14}  {}",
        "ID", "PROJECT", "OWNER", "STATUS", "MENTIONED", "FOLLOW-UP", "DESCRIPTION"
    )?;
    for row in rows {
        let r = row.record;
        let follow_up = match r.follow_up_scheduled() {
            Some("Yes") => "scheduled".to_string(),
            _ if row.derived == DerivedStatus::Ghosted => "GHOSTED".to_string(),
            other => other.unwrap_or("-").to_string(),
        };
        writeln!(
            w,
            "{:<id_width$}  {:<14}  {:<16}  {:<10}  {:<11}  {:<14}  {}",
            r.id(),
            truncate(r.project().unwrap_or("-"), 14),
            truncate(r.owner().unwrap_or("-"), 16),
            truncate(r.status().unwrap_or("-"), 10),
            r.last_mentioned().unwrap_or("N/A"),
            follow_up,
            truncate(r.description().unwrap_or_default(), 48),
        )?;
    }
    Ok(())
}

/// Result of a follow-up or status change.
#[derive(Debug, Serialize)]
pub struct MutationReport<'a> {
    pub action: &'static str,
    pub task: TaskRow<'a>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<PathBuf>,
}

/// Render the mutated task, the recomputed summary and, when `export_dir`
/// is set, write the whole collection there.
pub fn finish_mutation(
    store: &TaskStore,
    id: &TaskId,
    action: &'static str,
    export_dir: Option<&Path>,
    now: DateTime<Utc>,
    mode: OutputMode,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let exported = export_dir
        .map(|dir| write_export(store.records(), dir, now.date_naive()))
        .transpose()?;

    let Some(record) = store.get(id) else {
        anyhow::bail!("task {id} vanished after {action}");
    };
    let report = MutationReport {
        action,
        task: TaskRow::new(record, now),
        summary: store.summary(),
        exported,
    };
    render_to(out, mode, &report, write_mutation_text, write_mutation_pretty)
}

fn write_mutation_text(report: &MutationReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    write_task_text(std::slice::from_ref(&report.task), w)?;
    let s = &report.summary;
    writeln!(
        w,
        "summary\t{}\t{}\t{}\t{}\t{}",
        s.total, s.ghosted, s.followed_up, s.completed, s.average_delay
    )?;
    if let Some(path) = &report.exported {
        writeln!(w, "exported\t{}", path.display())?;
    }
    Ok(())
}

fn write_mutation_pretty(report: &MutationReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    let r = report.task.record;
    writeln!(w, "✓ {} {}", report.action, r.id())?;
    pretty_kv(w, "Task", r.description().unwrap_or("-"))?;
    pretty_kv(w, "Status", r.status().unwrap_or("-"))?;
    pretty_kv(w, "Follow-up", r.follow_up_scheduled().unwrap_or("-"))?;
    pretty_kv(w, "Last mentioned", r.last_mentioned().unwrap_or("N/A"))?;
    pretty_kv(w, "Now", report.task.derived.label())?;
    writeln!(w)?;

    let s = &report.summary;
    writeln!(
        w,
        "{} tasks: {} ghosted, {} followed up, {} completed, avg delay {} days",
        s.total, s.ghosted, s.followed_up, s.completed, s.average_delay
    )?;
    if let Some(path) = &report.exported {
        writeln!(w, "Exported to {}", path.display())?;
    }
    Ok(())
}

/// Current time for commands that run inside a long-lived session.
pub fn wall_clock() -> DateTime<Utc> {
    Utc::now()
}
