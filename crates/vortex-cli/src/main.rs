#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vortex_core::Source;
use vortex_core::config::resolve_config;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "vx: follow-up vortex tracker for meeting action items",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Output format: pretty, text or json.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Load tasks from a local CSV file instead of the configured URL.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Load tasks from this URL.
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Show the follow-up dashboard",
        long_about = "Load tasks and show totals, the status breakdown, follow-up rate, the busiest projects and a preview of ghosted tasks.",
        after_help = "EXAMPLES:\n    # Dashboard for the configured source\n    vx stats\n\n    # Dashboard for a local export\n    vx stats --file actions.csv\n\n    # Emit machine-readable output\n    vx stats --format json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tasks",
        long_about = "List every task with its ID, project, owner, status, last mention and follow-up flag.",
        after_help = "EXAMPLES:\n    # All tasks\n    vx list\n\n    # One project's open tasks\n    vx list --project Apollo --status Open"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "List ghosted tasks",
        long_about = "List open tasks without a follow-up that have not been mentioned for more than 14 days, least recently mentioned first.",
        after_help = "EXAMPLES:\n    # Every ghosted task\n    vx ghosted\n\n    # The ten most neglected\n    vx ghosted --limit 10"
    )]
    Ghosted(cmd::ghosted::GhostedArgs),

    #[command(
        next_help_heading = "Read",
        about = "Count tasks per project",
        long_about = "Count tasks per non-empty project, largest first.",
        after_help = "EXAMPLES:\n    # Top five projects\n    vx projects\n\n    # Top ten\n    vx projects --limit 10"
    )]
    Projects(cmd::projects::ProjectsArgs),

    #[command(
        name = "follow-up",
        next_help_heading = "Update",
        about = "Schedule a follow-up for a task",
        long_about = "Mark a task's follow-up as scheduled and set its last mention to today, then show the updated summary.",
        after_help = "EXAMPLES:\n    # Schedule by ID prefix\n    vx follow-up vx-2a1\n\n    # Schedule and export the result\n    vx follow-up vx-2a1b2c3 --write ./exports"
    )]
    FollowUp(cmd::follow_up::FollowUpArgs),

    #[command(
        next_help_heading = "Update",
        about = "Set a task's status",
        long_about = "Overwrite a task's Status value and show the updated summary. Values other than Open, Closed, Completed and Blocked are kept as written.",
        after_help = "EXAMPLES:\n    # Close a task\n    vx set-status vx-3f0 Closed\n\n    # Close and export\n    vx set-status vx-3f0 Closed --write ./exports"
    )]
    SetStatus(cmd::status::SetStatusArgs),

    #[command(
        next_help_heading = "Data",
        about = "Export tasks as CSV",
        long_about = "Write the loaded tasks to circlebackvortex-export-<date>.csv.",
        after_help = "EXAMPLES:\n    # Export into the configured directory\n    vx export\n\n    # Export somewhere else\n    vx export --output-dir /tmp\n\n    # Print the CSV instead\n    vx export --stdout"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Start an interactive session",
        long_about = "Load tasks once and read commands from stdin. Changes made with follow-up and status persist until the session ends; type `help` for the command list.",
        after_help = "EXAMPLES:\n    # Interactive\n    vx session --file actions.csv\n\n    # Scripted\n    printf 'follow-up vx-2a1\\nexport\\n' | vx session --file actions.csv"
    )]
    Session(cmd::session::SessionArgs),

    #[command(
        next_help_heading = "Utility",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    vx completions bash > ~/.local/share/bash-completion/completions/vx"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("VORTEX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "vortex=debug,vx=debug,info"
        } else {
            "vortex=info,warn"
        })
    });

    let format = env::var("VORTEX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        return cmd::completions::run_completions(args, &mut Cli::command());
    }

    let project_root = env::current_dir()?;
    let config = resolve_config(&project_root, cli.url.as_deref())?;
    let output = output::resolve_output_mode(cli.format, cli.json, config.user.output.as_deref());

    let source = match cli.file {
        Some(path) => Source::file(path)?,
        None => Source::Url(config.source_url),
    };
    debug!(source = %source, ?output, "resolved source");

    let app = cmd::App {
        output,
        source,
        export_dir: config.export_dir,
        now: cmd::wall_clock(),
    };

    match &cli.command {
        Commands::Stats(args) => cmd::stats::run_stats(args, &app),
        Commands::List(args) => cmd::list::run_list(args, &app),
        Commands::Ghosted(args) => cmd::ghosted::run_ghosted(args, &app),
        Commands::Projects(args) => cmd::projects::run_projects(args, &app),
        Commands::FollowUp(args) => cmd::follow_up::run_follow_up(args, &app),
        Commands::SetStatus(args) => cmd::status::run_set_status(args, &app),
        Commands::Export(args) => cmd::export::run_export(args, &app),
        Commands::Session(args) => cmd::session::run_session(args, &app),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Errors raised before the user config is read still honour flags and env.
    let output = output::resolve_output_mode(cli.format, cli.json, None);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if output::render_error(output, &CliError::from_anyhow(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
