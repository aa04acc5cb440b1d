use std::io::Write;

use clap::Args;
use vortex_core::TaskStore;
use vortex_core::aggregate::{self, ProjectCount, TOP_PROJECTS};

use super::App;
use crate::output::{OutputMode, pretty_section, render_to, truncate};

/// Arguments for `vx projects`.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Number of project buckets to show.
    #[arg(long, short = 'n', default_value_t = TOP_PROJECTS)]
    pub limit: usize,
}

impl Default for ProjectsArgs {
    fn default() -> Self {
        Self { limit: TOP_PROJECTS }
    }
}

/// Execute `vx projects`.
pub fn run_projects(args: &ProjectsArgs, app: &App) -> anyhow::Result<()> {
    let store = app.load()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_projects(&store, args.limit, app.output, &mut out)
}

pub fn write_projects(
    store: &TaskStore,
    limit: usize,
    mode: OutputMode,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let projects = aggregate::top_projects(store.records(), limit);
    render_to(
        out,
        mode,
        &projects,
        |projects, w| render_projects_text(projects, w),
        |projects, w| render_projects_pretty(projects, w),
    )
}

fn render_projects_text(projects: &[ProjectCount], w: &mut dyn Write) -> std::io::Result<()> {
    for project in projects {
        writeln!(w, "{}\t{}", project.name, project.count)?;
    }
    Ok(())
}

fn render_projects_pretty(projects: &[ProjectCount], w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Tasks by project")?;
    if projects.is_empty() {
        return writeln!(w, "(none)");
    }

    let widest = projects.iter().map(|p| p.count).max().unwrap_or(1).max(1);
    for project in projects {
        let bar = "#".repeat((project.count * 30).div_ceil(widest));
        writeln!(
            w,
            "{:<24} {:>5}  {bar}",
            truncate(&project.name, 24),
            project.count
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing;

    fn rendered(limit: usize, mode: OutputMode) -> String {
        let mut buf = Vec::new();
        write_projects(&testing::store(), limit, mode, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_lists_counts_largest_first() {
        assert_eq!(rendered(5, OutputMode::Text), "Apollo\t2\nHermes\t1\n");
    }

    #[test]
    fn limit_truncates() {
        let json: serde_json::Value = serde_json::from_str(&rendered(1, OutputMode::Json)).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "Apollo");
        assert_eq!(json[0]["count"], 2);
    }

    #[test]
    fn pretty_draws_bars_scaled_to_largest() {
        let text = rendered(5, OutputMode::Pretty);
        assert!(text.contains(&"#".repeat(30)));
        assert!(text.contains(&format!("  {}\n", "#".repeat(15))));
    }
}
