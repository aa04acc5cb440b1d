//! `vx session`: one long-lived [`TaskStore`] driven by line commands.
//!
//! Each command re-reads the clock, so ghosting and delays move as the
//! session ages. Command errors are reported inline and the loop keeps
//! going; only I/O failures on the session streams end it.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use tracing::{debug, warn};
use vortex_core::aggregate::TOP_PROJECTS;
use vortex_core::store::LoadState;
use vortex_core::{Source, TaskStore};

use super::export::write_export_report;
use super::ghosted::write_ghosted;
use super::list::{ListArgs, write_list};
use super::projects::write_projects;
use super::stats::write_stats;
use super::{App, finish_mutation, wall_clock};
use crate::output::{CliError, OutputMode, write_error};

/// Arguments for `vx session`.
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Do not print the `vx>` prompt.
    #[arg(long)]
    pub no_prompt: bool,
}

const HELP: &str = "\
commands:
  stats                 dashboard summary
  list                  every task
  ghosted [N]           ghosted tasks, oldest first
  projects [N]          tasks per project
  follow-up ID          schedule a follow-up for a task
  status ID VALUE       set a task's Status
  refresh               reload from the source
  export [DIR]          write the collection as CSV
  help                  this text
  quit                  leave the session
";

/// One parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Stats,
    List,
    Ghosted(Option<usize>),
    Projects(usize),
    FollowUp(String),
    Status { id: String, value: String },
    Refresh,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl SessionCommand {
    /// `Ok(None)` for blank lines.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

        let command = match verb {
            "" => return Ok(None),
            "stats" => Self::Stats,
            "list" | "ls" => Self::List,
            "ghosted" => Self::Ghosted(parse_count(rest)?),
            "projects" => Self::Projects(parse_count(rest)?.unwrap_or(TOP_PROJECTS)),
            "follow-up" | "followup" => {
                if rest.is_empty() {
                    return Err("usage: follow-up ID".to_string());
                }
                Self::FollowUp(rest.to_string())
            }
            "status" => match rest.split_once(char::is_whitespace) {
                Some((id, value)) if !value.trim().is_empty() => Self::Status {
                    id: id.to_string(),
                    value: value.trim().to_string(),
                },
                _ => return Err("usage: status ID VALUE".to_string()),
            },
            "refresh" => Self::Refresh,
            "export" => Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn parse_count(raw: &str) -> Result<Option<usize>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("expected a number, got '{raw}'"))
}

/// State owned by a running session.
pub struct Session {
    store: TaskStore,
    source: Source,
    export_dir: PathBuf,
    mode: OutputMode,
    clock: fn() -> DateTime<Utc>,
}

impl Session {
    pub fn new(
        store: TaskStore,
        source: Source,
        export_dir: PathBuf,
        mode: OutputMode,
        clock: fn() -> DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            source,
            export_dir,
            mode,
            clock,
        }
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn drive(
        &mut self,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
        prompt: bool,
    ) -> io::Result<()> {
        let mut line = String::new();
        loop {
            if prompt {
                write!(out, "vx> ")?;
                out.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }

            let command = match SessionCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    self.report(out, &anyhow::anyhow!(message))?;
                    continue;
                }
            };

            debug!(?command, "session command");
            if command == SessionCommand::Quit {
                return Ok(());
            }
            if let Err(err) = self.execute(command, out) {
                self.report(out, &err)?;
            }
        }
    }

    fn execute(&mut self, command: SessionCommand, out: &mut dyn Write) -> anyhow::Result<()> {
        let now = (self.clock)();
        let mode = self.mode;

        match command {
            SessionCommand::Stats => {
                write_stats(&self.store, &self.source.location(), now, mode, out)
            }
            SessionCommand::List => write_list(&self.store, &ListArgs::default(), now, mode, out),
            SessionCommand::Ghosted(limit) => write_ghosted(&self.store, limit, now, mode, out),
            SessionCommand::Projects(limit) => write_projects(&self.store, limit, mode, out),
            SessionCommand::FollowUp(query) => {
                let id = self.store.resolve(&query)?;
                self.store.schedule_follow_up(&id, now)?;
                finish_mutation(&self.store, &id, "follow-up scheduled", None, now, mode, out)
            }
            SessionCommand::Status { id, value } => {
                let id = self.store.resolve(&id)?;
                self.store.update_status(&id, &value, now)?;
                finish_mutation(&self.store, &id, "status updated", None, now, mode, out)
            }
            SessionCommand::Refresh => {
                let state = self.store.refresh(&self.source, now)?;
                if state == LoadState::Failed {
                    warn!(source = %self.source, "refresh failed, keeping previous tasks");
                }
                write_stats(&self.store, &self.source.location(), now, mode, out)
            }
            SessionCommand::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                write_export_report(&self.store, &dir, now, mode, out)
            }
            SessionCommand::Help => Ok(out.write_all(HELP.as_bytes())?),
            SessionCommand::Quit => Ok(()),
        }
    }

    fn report(&self, out: &mut dyn Write, err: &anyhow::Error) -> io::Result<()> {
        write_error(out, self.mode, &CliError::from_anyhow(err)).map_err(io::Error::other)
    }

    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }
}

/// Execute `vx session` on stdin/stdout.
pub fn run_session(args: &SessionArgs, app: &App) -> anyhow::Result<()> {
    let store = app.load()?;
    let mut session = Session::new(
        store,
        app.source.clone(),
        app.export_dir.clone(),
        app.output,
        wall_clock,
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let prompt = !args.no_prompt && app.output == OutputMode::Pretty;
    session.drive(&mut input, &mut out, prompt)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing;
    use std::io::Cursor;

    fn session(mode: OutputMode, export_dir: PathBuf) -> Session {
        Session::new(
            testing::store(),
            Source::File("tasks.csv".into()),
            export_dir,
            mode,
            testing::now,
        )
    }

    fn drive(session: &mut Session, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes());
        let mut out = Vec::new();
        session.drive(&mut input, &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(SessionCommand::parse("  "), Ok(None));
        assert_eq!(SessionCommand::parse("stats"), Ok(Some(SessionCommand::Stats)));
        assert_eq!(
            SessionCommand::parse("ghosted 3"),
            Ok(Some(SessionCommand::Ghosted(Some(3))))
        );
        assert_eq!(
            SessionCommand::parse("projects"),
            Ok(Some(SessionCommand::Projects(TOP_PROJECTS)))
        );
        assert_eq!(
            SessionCommand::parse("status vx-1a  In review "),
            Ok(Some(SessionCommand::Status {
                id: "vx-1a".into(),
                value: "In review".into(),
            }))
        );
        assert_eq!(
            SessionCommand::parse("export /tmp/out"),
            Ok(Some(SessionCommand::Export(Some("/tmp/out".into()))))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(SessionCommand::parse("follow-up").is_err());
        assert!(SessionCommand::parse("status vx-1a").is_err());
        assert!(SessionCommand::parse("ghosted lots").is_err());
        assert!(SessionCommand::parse("dance").is_err());
    }

    #[test]
    fn mutations_persist_across_commands() {
        let mut session = session(OutputMode::Text, PathBuf::from("."));
        let id = session.store().records()[0].id().to_string();

        let out = drive(&mut session, &format!("follow-up {id}\nstats\nquit\nstats\n"));

        assert_eq!(session.store().summary().ghosted, 0);
        assert_eq!(session.store().summary().followed_up, 2);
        assert!(out.contains("ghosted\t0\n"));
        // Nothing after `quit` runs.
        assert_eq!(out.matches("total\t3").count(), 1);
    }

    #[test]
    fn errors_are_reported_and_the_loop_continues() {
        let mut session = session(OutputMode::Text, PathBuf::from("."));
        let out = drive(&mut session, "follow-up zzzz\nbogus\nprojects 1\n");

        assert!(out.contains("error: task not found: zzzz"));
        assert!(out.contains("error: unknown command 'bogus'"));
        assert!(out.ends_with("Apollo\t2\n"));
    }

    #[test]
    fn status_then_export_writes_the_mutated_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(OutputMode::Json, dir.path().to_path_buf());
        let id = session.store().records()[2].id().to_string();

        drive(&mut session, &format!("status {id} Blocked\nexport\n"));

        let written =
            std::fs::read_to_string(dir.path().join("circlebackvortex-export-2024-06-15.csv")).unwrap();
        assert!(written.contains("Hermes,Fix onboarding,Ana,Blocked,"));
    }

    #[test]
    fn failed_refresh_keeps_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(
            testing::store(),
            Source::File(dir.path().join("gone.csv")),
            dir.path().to_path_buf(),
            OutputMode::Text,
            testing::now,
        );

        let out = drive(&mut session, "refresh\n");
        assert_eq!(session.store().len(), 3);
        assert!(out.starts_with("total\t3\n"));
    }

    #[test]
    fn help_lists_commands() {
        let mut session = session(OutputMode::Pretty, PathBuf::from("."));
        let out = drive(&mut session, "help\n");
        assert!(out.contains("follow-up ID"));
        assert!(out.contains("quit"));
    }
}
