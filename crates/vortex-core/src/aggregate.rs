//! Summary statistics and chart buckets over a whole collection.
//!
//! Every function rescans the full slice. Nothing is cached between calls.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::classify::{self, DerivedStatus};
use crate::model::{Record, TaskId};

/// Number of project buckets shown on the dashboard chart.
pub const TOP_PROJECTS: usize = 5;

/// Number of ghosted tasks previewed on the dashboard.
pub const GHOSTED_PREVIEW: usize = 6;

/// Headline counters for a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub ghosted: usize,
    pub followed_up: usize,
    pub completed: usize,
    /// Mean delay in whole days, rounded half-up; 0 with no eligible records.
    pub average_delay: i64,
}

impl Summary {
    /// `total - ghosted - followed_up - completed`.
    ///
    /// Overlapping predicates can push this below zero; the value is
    /// reported as computed.
    #[must_use]
    pub fn other(&self) -> i64 {
        to_i64(self.total) - to_i64(self.ghosted) - to_i64(self.followed_up) - to_i64(self.completed)
    }
}

/// Recompute all counters with a full scan.
#[must_use]
pub fn summarize(records: &[Record], now: DateTime<Utc>) -> Summary {
    let mut summary = Summary {
        total: records.len(),
        ..Summary::default()
    };
    let mut delays = Vec::new();

    for record in records {
        if classify::is_ghosted(record, now) {
            summary.ghosted += 1;
        }
        if classify::is_followed_up(record) {
            summary.followed_up += 1;
        }
        if classify::is_completed(record) {
            summary.completed += 1;
        }
        if let Some(delay) = classify::delay_days(record) {
            delays.push(delay);
        }
    }

    summary.average_delay = average_delay(&delays);
    debug!(
        total = summary.total,
        ghosted = summary.ghosted,
        followed_up = summary.followed_up,
        completed = summary.completed,
        delay_population = delays.len(),
        "summarized tasks"
    );
    summary
}

/// Arithmetic mean rounded half-up (`4.5 -> 5`); 0 for an empty slice.
#[must_use]
pub fn average_delay(delays: &[i64]) -> i64 {
    if delays.is_empty() {
        return 0;
    }
    let count = to_i64(delays.len());
    let sum: i64 = delays.iter().sum();
    // floor(sum / count + 1/2) in integer arithmetic.
    (2 * sum + count).div_euclid(2 * count)
}

/// `round(part / total * 100)`, 0 when `total` is 0.
#[must_use]
pub fn percent(part: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    let part = part as u64;
    let total = total as u64;
    (200 * part + total) / (2 * total)
}

/// One slice of the status chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
    pub status: DerivedStatus,
    pub value: i64,
}

/// Ghosted, followed-up, completed and the arithmetic remainder.
#[must_use]
pub fn status_breakdown(summary: &Summary) -> [StatusSlice; 4] {
    [
        StatusSlice {
            status: DerivedStatus::Ghosted,
            value: to_i64(summary.ghosted),
        },
        StatusSlice {
            status: DerivedStatus::FollowedUp,
            value: to_i64(summary.followed_up),
        },
        StatusSlice {
            status: DerivedStatus::Completed,
            value: to_i64(summary.completed),
        },
        StatusSlice {
            status: DerivedStatus::Other,
            value: summary.other(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCount {
    pub name: String,
    pub count: usize,
}

/// Tasks per non-empty project, largest first, truncated to `limit`.
///
/// Projects with equal counts keep the order in which they first appear.
#[must_use]
pub fn top_projects(records: &[Record], limit: usize) -> Vec<ProjectCount> {
    let mut buckets: Vec<ProjectCount> = Vec::new();

    for project in records.iter().filter_map(Record::project) {
        if project.is_empty() {
            continue;
        }
        match buckets.iter_mut().find(|bucket| bucket.name == project) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(ProjectCount {
                name: project.to_string(),
                count: 1,
            }),
        }
    }

    // Stable sort keeps first-seen order among ties.
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets.truncate(limit);
    buckets
}

/// Ghosted records, least recently mentioned first.
#[must_use]
pub fn ghosted_tasks(records: &[Record], now: DateTime<Utc>) -> Vec<&Record> {
    let mut ghosted: Vec<(&Record, DateTime<Utc>)> = records
        .iter()
        .filter(|record| classify::is_ghosted(record, now))
        .filter_map(|record| {
            record
                .last_mentioned()
                .and_then(classify::parse_date)
                .map(|mentioned| (record, mentioned))
        })
        .collect();

    ghosted.sort_by_key(|(_, mentioned)| *mentioned);
    ghosted.into_iter().map(|(record, _)| record).collect()
}

/// Card-sized view of one ghosted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GhostedTask {
    pub id: TaskId,
    pub project: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub original_due_date: Option<String>,
    pub last_mentioned: Option<String>,
    pub days_since_mentioned: Option<i64>,
}

impl GhostedTask {
    #[must_use]
    pub fn from_record(record: &Record, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id().clone(),
            project: record.project().map(str::to_string),
            description: record.description().map(str::to_string),
            owner: record.owner().map(str::to_string),
            original_due_date: record.original_due_date().map(str::to_string),
            last_mentioned: record.last_mentioned().map(str::to_string),
            days_since_mentioned: classify::days_since_mentioned(record, now),
        }
    }
}

/// Everything the dashboard renders, derived in one pass per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub status: [StatusSlice; 4],
    /// Percent of all tasks with a follow-up scheduled.
    pub follow_up_rate: u64,
    /// Percent of all tasks that are ghosted.
    pub ghosted_share: u64,
    pub top_projects: Vec<ProjectCount>,
    pub ghosted_total: usize,
    pub ghosted_preview: Vec<GhostedTask>,
}

impl Dashboard {
    #[must_use]
    pub fn build(records: &[Record], now: DateTime<Utc>) -> Self {
        let summary = summarize(records, now);
        let ghosted = ghosted_tasks(records, now);

        Self {
            status: status_breakdown(&summary),
            follow_up_rate: percent(summary.followed_up, summary.total),
            ghosted_share: percent(summary.ghosted, summary.total),
            top_projects: top_projects(records, TOP_PROJECTS),
            ghosted_total: ghosted.len(),
            ghosted_preview: ghosted
                .iter()
                .take(GHOSTED_PREVIEW)
                .map(|record| GhostedTask::from_record(record, now))
                .collect(),
            summary,
        }
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
