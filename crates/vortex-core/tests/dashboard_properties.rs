//! Behavioral properties of the decode -> classify -> aggregate -> mutate
//! pipeline, exercised through the public API only.

use chrono::{DateTime, Duration, TimeZone, Utc};
use vortex_core::aggregate::{self, TOP_PROJECTS};
use vortex_core::classify;
use vortex_core::csv;
use vortex_core::model::field;
use vortex_core::{Record, TaskId, TaskStore};

const HEADER: &str = "Project,Task_Description,Owner,Status,Mentioned_in_Meeting,Original_Due_Date,Last_Mentioned,Follow_Up_Scheduled,Final_Resolution";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 30, 15, 30, 0).unwrap()
}

fn days_ago(days: i64) -> String {
    (now() - Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn row(project: &str, status: &str, due: &str, last: &str, follow_up: &str) -> String {
    format!("{project},Task for {project},Owner,{status},Standup,{due},{last},{follow_up},")
}

fn document(rows: &[String]) -> String {
    let mut text = String::from(HEADER);
    for r in rows {
        text.push('\n');
        text.push_str(r);
    }
    text.push('\n');
    text
}

#[test]
fn single_row_decodes_to_one_record() {
    let plain = csv::decode("A,B\n1,2");
    let trailing = csv::decode("A,B\n1,2\n\n");

    for records in [&plain, &trailing] {
        assert_eq!(records.len(), 1);
        let names: Vec<_> = records[0].field_names().collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(records[0].get("A"), Some("1"));
        assert_eq!(records[0].get("B"), Some("2"));
    }
}

#[test]
fn ghosting_flips_with_last_mention_age() {
    let stale = csv::decode(&document(&[row("Apollo", "Open", "", &days_ago(20), "No")]));
    assert!(classify::is_ghosted(&stale[0], now()));

    let fresh = csv::decode(&document(&[row("Apollo", "Open", "", &days_ago(10), "No")]));
    assert!(!classify::is_ghosted(&fresh[0], now()));
}

#[test]
fn follow_up_counts_regardless_of_status() {
    let rows: Vec<_> = ["Open", "Closed", "Completed", "Blocked", "Someday"]
        .iter()
        .map(|status| row("Apollo", status, "", &days_ago(40), "Yes"))
        .collect();
    let records = csv::decode(&document(&rows));

    let summary = aggregate::summarize(&records, now());
    assert_eq!(summary.followed_up, 5);
    assert_eq!(summary.ghosted, 0);
}

#[test]
fn delay_is_whole_days_clamped_at_zero() {
    let records = csv::decode(&document(&[
        row("Apollo", "Open", "2024-01-01", "2024-01-10", "No"),
        row("Apollo", "Open", "2024-01-10", "2024-01-01", "No"),
    ]));
    assert_eq!(classify::delay_days(&records[0]), Some(9));
    assert_eq!(classify::delay_days(&records[1]), Some(0));
}

#[test]
fn average_delay_rounds_half_up_and_defaults_to_zero() {
    let records = csv::decode(&document(&[
        row("Apollo", "Open", "2024-01-01", "2024-01-10", "No"),
        row("Apollo", "Open", "2024-01-10", "2024-01-01", "No"),
    ]));
    assert_eq!(aggregate::summarize(&records, now()).average_delay, 5);

    let undated = csv::decode(&document(&[row("Apollo", "Open", "", "", "No")]));
    assert_eq!(aggregate::summarize(&undated, now()).average_delay, 0);
}

#[test]
fn scheduling_follow_up_removes_at_most_one_ghost() {
    let rows = vec![
        row("Apollo", "Open", "", &days_ago(30), "No"),
        row("Hermes", "Open", "", &days_ago(25), "No"),
        row("Hermes", "Open", "", &days_ago(2), "No"),
    ];
    let mut store = TaskStore::from_records(csv::decode(&document(&rows)), now());

    for index in 0..store.len() {
        let before = store.summary().ghosted;
        let id = store.records()[index].id().clone();

        let record = store.schedule_follow_up(&id, now()).unwrap();
        assert_eq!(record.get(field::FOLLOW_UP_SCHEDULED), Some("Yes"));

        let after = store.summary().ghosted;
        assert!(after <= before && before - after <= 1);
        assert!(!classify::is_ghosted(store.get(&id).unwrap(), now()));
    }
    assert_eq!(store.summary().ghosted, 0);
}

#[test]
fn project_ties_keep_first_seen_order() {
    let records = csv::decode(&document(&[
        row("Hermes", "Open", "", "", "No"),
        row("Apollo", "Open", "", "", "No"),
        row("Apollo", "Open", "", "", "No"),
        row("Hermes", "Open", "", "", "No"),
    ]));

    let top = aggregate::top_projects(&records, TOP_PROJECTS);
    let names: Vec<_> = top.iter().map(|bucket| bucket.name.as_str()).collect();
    assert_eq!(names, ["Hermes", "Apollo"]);

    // Same input twice gives the same order.
    assert_eq!(top, aggregate::top_projects(&records, TOP_PROJECTS));
}

#[test]
fn projectless_tasks_count_in_totals_only() {
    let records = csv::decode(&document(&[
        row("", "Open", "", "", "No"),
        row("Apollo", "Open", "", "", "No"),
    ]));
    assert_eq!(aggregate::summarize(&records, now()).total, 2);
    assert_eq!(aggregate::top_projects(&records, TOP_PROJECTS).len(), 1);
}

#[test]
fn ghosted_view_surfaces_oldest_first() {
    let records = csv::decode(&document(&[
        row("A", "Open", "", &days_ago(15), "No"),
        row("B", "Open", "", &days_ago(60), "No"),
        row("C", "Open", "", &days_ago(31), "No"),
    ]));
    let projects: Vec<_> = aggregate::ghosted_tasks(&records, now())
        .iter()
        .map(|r| r.project().unwrap_or_default())
        .collect();
    assert_eq!(projects, ["B", "C", "A"]);
}

#[test]
fn export_round_trips_through_decoder() {
    let original = csv::decode(&document(&[
        row("Apollo", "Open", "2024-01-01", "2024-01-10", "No"),
        row("Hermes", "Closed", "2024-02-01", "2024-02-03", "Yes"),
    ]));
    let reloaded = csv::decode(&csv::encode(&original));

    assert_eq!(reloaded.len(), original.len());
    for (a, b) in original.iter().zip(&reloaded) {
        assert!(a.field_names().eq(b.field_names()));
        assert!(a.values().eq(b.values()));
    }
    assert_eq!(
        aggregate::summarize(&original, now()),
        aggregate::summarize(&reloaded, now())
    );
}

#[test]
fn hand_built_records_classify_like_decoded_ones() {
    let record = Record::new(TaskId::from("vx-handmade"))
        .with_field(field::STATUS, "Open")
        .with_field(field::FOLLOW_UP_SCHEDULED, "No")
        .with_field(field::LAST_MENTIONED, &days_ago(20));
    assert!(classify::is_ghosted(&record, now()));
}
