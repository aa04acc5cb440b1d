use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use vortex_core::export::write_export;
use vortex_core::{TaskStore, csv};

use super::App;
use crate::output::{OutputMode, render_to};

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Directory to write the dated CSV into (defaults to `[export] dir`
    /// from `.vortex/config.toml`, then the working directory).
    #[arg(long, value_name = "DIR", conflicts_with = "stdout")]
    pub output_dir: Option<PathBuf>,

    /// Print the CSV to stdout instead of writing a file.
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub tasks: usize,
}

pub fn run_export(args: &ExportArgs, app: &App) -> anyhow::Result<()> {
    let store = app.load()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.stdout {
        out.write_all(csv::encode(store.records()).as_bytes())
            .context("failed to write CSV to stdout")?;
        return Ok(());
    }

    let dir = args.output_dir.as_deref().unwrap_or(&app.export_dir);
    write_export_report(&store, dir, app.now, app.output, &mut out)
}

pub fn write_export_report(
    store: &TaskStore,
    dir: &Path,
    now: DateTime<Utc>,
    mode: OutputMode,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let path = write_export(store.records(), dir, now.date_naive())?;
    let report = ExportReport {
        path,
        tasks: store.len(),
    };
    render_to(
        out,
        mode,
        &report,
        |r, w| writeln!(w, "{}", r.path.display()),
        |r, w| writeln!(w, "✓ exported {} tasks to {}", r.tasks, r.path.display()),
    )
}
