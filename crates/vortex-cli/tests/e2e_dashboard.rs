//! E2E tests for `vx` against local CSV files.
//!
//! Covers: dashboard JSON, listing, mutations with export, the interactive
//! session, config-driven export directories, and error rendering.

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn vx_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vx"));
    cmd.current_dir(dir);
    cmd.env("VORTEX_LOG", "error");
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("FORMAT");
    cmd.env_remove("VORTEX_SOURCE_URL");
    cmd
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Two ghosted tasks, one followed up, one closed, one blocked.
fn write_tasks(dir: &Path) -> PathBuf {
    let csv = format!(
        "Project,Task_Description,Owner,Status,Mentioned_in_Meeting,Original_Due_Date,Last_Mentioned,Follow_Up_Scheduled,Final_Resolution\n\
         Apollo,Draft launch plan,Dana,Open,Weekly sync,{},{},No,\n\
         Apollo,Review budget,Eli,Open,Weekly sync,{},{},Yes,\n\
         Hermes,Fix onboarding,Ana,Closed,Retro,{},{},No,Shipped\n\
         Hermes,Audit logs,Kai,Open,Retro,{},{},No,\n\
         Zeus,Hire designer,Mo,Blocked,Planning,{},{},No,\n",
        days_ago(40),
        days_ago(30),
        days_ago(10),
        days_ago(3),
        days_ago(12),
        days_ago(10),
        days_ago(60),
        days_ago(50),
        days_ago(5),
        days_ago(1),
    );
    let path = dir.join("tasks.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("vx should not crash");
    assert!(
        output.status.success(),
        "vx failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn task_id(dir: &Path, file: &Path, description: &str) -> String {
    let rows = json_output(vx_cmd(dir).args(["list", "--format", "json", "--file"]).arg(file));
    rows.as_array()
        .unwrap()
        .iter()
        .find(|row| row["fields"]["Task_Description"] == description)
        .and_then(|row| row["id"].as_str())
        .expect("task should be listed")
        .to_string()
}

// ---------------------------------------------------------------------------
// vx stats / list / ghosted / projects
// ---------------------------------------------------------------------------

#[test]
fn stats_json_reports_dashboard() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    let stats = json_output(vx_cmd(dir.path()).args(["stats", "--format", "json", "--file"]).arg(&file));

    assert_eq!(stats["load_state"], "loaded");
    assert_eq!(stats["summary"]["total"], 5);
    assert_eq!(stats["summary"]["ghosted"], 2);
    assert_eq!(stats["summary"]["followed_up"], 1);
    assert_eq!(stats["summary"]["completed"], 1);
    // delays 10, 7, 2, 10, 4 -> 6.6
    assert_eq!(stats["summary"]["average_delay"], 7);
    assert_eq!(stats["follow_up_rate"], 20);
    assert_eq!(stats["ghosted_share"], 40);
    assert_eq!(stats["top_projects"][0]["name"], "Apollo");
    assert_eq!(stats["top_projects"][1]["name"], "Hermes");
    assert_eq!(stats["ghosted_preview"][0]["description"], "Audit logs");
}

#[test]
fn hidden_json_flag_matches_format_json() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    let stats = json_output(vx_cmd(dir.path()).args(["stats", "--json", "--file"]).arg(&file));
    assert_eq!(stats["summary"]["total"], 5);
}

#[test]
fn list_text_has_header_and_one_row_per_task() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    vx_cmd(dir.path())
        .args(["list", "--format", "text", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID\tPROJECT\tOWNER"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 6));
}

#[test]
fn ghosted_lists_oldest_first() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    let report = json_output(vx_cmd(dir.path()).args(["ghosted", "--format", "json", "--file"]).arg(&file));
    assert_eq!(report["total"], 2);
    assert_eq!(report["tasks"][0]["owner"], "Kai");
    assert_eq!(report["tasks"][1]["owner"], "Dana");
    // Midnight 30 days ago, rounded up to whole days.
    let days = report["tasks"][1]["days_since_mentioned"].as_i64().unwrap();
    assert!((30..=31).contains(&days), "unexpected day count {days}");
}

#[test]
fn projects_limit_applies() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    vx_cmd(dir.path())
        .args(["projects", "--limit", "2", "--format", "text", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout("Apollo\t2\nHermes\t2\n");
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[test]
fn follow_up_clears_ghosting_and_exports() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());
    let id = task_id(dir.path(), &file, "Draft launch plan");
    let out_dir = dir.path().join("exports");
    std::fs::create_dir(&out_dir).unwrap();

    let report = json_output(
        vx_cmd(dir.path())
            .args(["follow-up", &id[..9], "--format", "json", "--write"])
            .arg(&out_dir)
            .arg("--file")
            .arg(&file),
    );

    assert_eq!(report["task"]["id"], id.as_str());
    assert_eq!(report["task"]["fields"]["Follow_Up_Scheduled"], "Yes");
    assert_eq!(report["task"]["fields"]["Last_Mentioned"], today().as_str());
    assert_eq!(report["summary"]["ghosted"], 1);
    assert_eq!(report["summary"]["followed_up"], 2);

    let exported = out_dir.join(format!("circlebackvortex-export-{}.csv", today()));
    let written = std::fs::read_to_string(exported).unwrap();
    assert!(written.contains(&format!("Apollo,Draft launch plan,Dana,Open,Weekly sync,{},{},Yes,", days_ago(40), today())));

    // The source file itself is never modified.
    assert!(std::fs::read_to_string(&file).unwrap().contains(",No,\n"));
}

#[test]
fn set_status_accepts_any_value() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());
    let id = task_id(dir.path(), &file, "Audit logs");

    let report = json_output(
        vx_cmd(dir.path())
            .args(["set-status", &id, "Completed", "--format", "json", "--file"])
            .arg(&file),
    );
    assert_eq!(report["summary"]["completed"], 2);
    assert_eq!(report["summary"]["ghosted"], 1);
    assert_eq!(report["task"]["derived"], "completed");

    let report = json_output(
        vx_cmd(dir.path())
            .args(["set-status", &id, "Waiting on legal", "--format", "json", "--file"])
            .arg(&file),
    );
    assert_eq!(report["task"]["fields"]["Status"], "Waiting on legal");
    assert_eq!(report["task"]["derived"], "other");
}

#[test]
fn unknown_task_is_a_structured_error() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    let output = vx_cmd(dir.path())
        .args(["follow-up", "vx-zzzzzzzz", "--format", "json", "--file"])
        .arg(&file)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error on stderr");
    assert_eq!(err["error"]["error_code"], "E2001");
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

#[test]
fn non_csv_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "A,B\n1,2\n").unwrap();

    vx_cmd(dir.path())
        .args(["stats", "--format", "text", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a .csv file"))
        .stderr(predicate::str::contains("Please upload a CSV file."));
}

#[test]
fn missing_file_shows_an_empty_dashboard() {
    let dir = TempDir::new().unwrap();

    let stats = json_output(
        vx_cmd(dir.path())
            .args(["stats", "--format", "json", "--file"])
            .arg(dir.path().join("gone.csv")),
    );
    assert_eq!(stats["load_state"], "failed");
    assert_eq!(stats["summary"]["total"], 0);
    assert_eq!(stats["follow_up_rate"], 0);
    assert_eq!(stats["top_projects"], Value::Array(Vec::new()));
}

// ---------------------------------------------------------------------------
// Export and config
// ---------------------------------------------------------------------------

#[test]
fn export_uses_configured_directory() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());
    std::fs::create_dir_all(dir.path().join(".vortex")).unwrap();
    std::fs::create_dir_all(dir.path().join("out")).unwrap();
    std::fs::write(dir.path().join(".vortex/config.toml"), "[export]\ndir = \"out\"\n").unwrap();

    let report = json_output(vx_cmd(dir.path()).args(["export", "--format", "json", "--file"]).arg(&file));
    assert_eq!(report["tasks"], 5);

    let expected = dir.path().join("out").join(format!("circlebackvortex-export-{}.csv", today()));
    assert!(expected.exists());
}

#[test]
fn export_stdout_prints_csv() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());

    vx_cmd(dir.path())
        .args(["export", "--stdout", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Project,Task_Description,Owner,Status,Mentioned_in_Meeting",
        ))
        .stdout(predicate::str::contains("Zeus,Hire designer,Mo,Blocked"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());
    std::fs::create_dir_all(dir.path().join(".vortex")).unwrap();
    std::fs::write(dir.path().join(".vortex/config.toml"), "[export\n").unwrap();

    let output = vx_cmd(dir.path())
        .args(["stats", "--format", "json", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["error_code"], "E1002");
}

// ---------------------------------------------------------------------------
// vx session
// ---------------------------------------------------------------------------

#[test]
fn session_keeps_mutations_between_commands() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path());
    let dana = task_id(dir.path(), &file, "Draft launch plan");
    let kai = task_id(dir.path(), &file, "Audit logs");

    let script = format!("follow-up {dana}\nstatus {kai} Closed\nstats\nexport\nquit\n");
    vx_cmd(dir.path())
        .args(["session", "--format", "text", "--file"])
        .arg(&file)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("total\t5\nghosted\t0\nfollowed_up\t2\ncompleted\t2\n"));

    let exported = dir.path().join(format!("circlebackvortex-export-{}.csv", today()));
    let written = std::fs::read_to_string(exported).unwrap();
    assert!(written.contains("Hermes,Audit logs,Kai,Closed,"));
}

#[test]
fn completions_do_not_need_a_source() {
    let dir = TempDir::new().unwrap();
    vx_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vx"));
}
