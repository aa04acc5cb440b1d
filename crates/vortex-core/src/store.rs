//! The in-memory task collection and the mutations applied to it.
//!
//! A [`TaskStore`] is owned by whoever drives a session (one CLI command,
//! or the interactive loop) and lives exactly as long as that owner. Every
//! load or mutation swaps in a new collection and recomputes the summary
//! from scratch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::aggregate::{self, Dashboard, Summary};
use crate::csv;
use crate::error::VortexError;
use crate::model::{Record, TaskId, field, follow_up};
use crate::source::Source;

/// Outcome of the most recent load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing has been loaded yet.
    #[default]
    Empty,
    /// A fetch is in flight. Only held inside [`TaskStore::refresh`], which
    /// always settles on `Loaded` or `Failed` before returning, so callers
    /// of the synchronous API never observe it.
    Loading,
    Loaded,
    /// The last fetch failed; the previous collection is still in place.
    Failed,
}

#[derive(Debug, Default)]
pub struct TaskStore {
    records: Vec<Record>,
    summary: Summary,
    computed_at: Option<DateTime<Utc>>,
    state: LoadState,
}

impl TaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loaded store around already-decoded records.
    #[must_use]
    pub fn from_records(records: Vec<Record>, now: DateTime<Utc>) -> Self {
        let mut store = Self::new();
        store.replace(records, now);
        store
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Summary as of the last load, mutation or [`recompute`](Self::recompute).
    #[must_use]
    pub const fn summary(&self) -> Summary {
        self.summary
    }

    /// Reference instant the current summary was computed for.
    #[must_use]
    pub const fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.computed_at
    }

    #[must_use]
    pub const fn load_state(&self) -> LoadState {
        self.state
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the whole collection and re-aggregate.
    pub fn replace(&mut self, records: Vec<Record>, now: DateTime<Utc>) {
        self.records = records;
        self.state = LoadState::Loaded;
        self.recompute(now);
    }

    /// Fetch and decode `source`, replacing the collection on success.
    ///
    /// The store is [`LoadState::Loading`] for the duration of the fetch. A
    /// failed fetch is logged and leaves the previous collection (empty
    /// on first load) in place; the returned state is then
    /// [`LoadState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::InvalidFileType`] when `source` is a non-CSV
    /// file. The store is untouched in that case.
    pub fn refresh(&mut self, source: &Source, now: DateTime<Utc>) -> Result<LoadState, VortexError> {
        source.validate()?;
        self.state = LoadState::Loading;

        match source.fetch() {
            Ok(text) => {
                let records = csv::decode(&text);
                info!(source = %source, tasks = records.len(), "loaded tasks");
                self.replace(records, now);
            }
            Err(err) => {
                error!(source = %source, error = %err, "error fetching data");
                self.state = LoadState::Failed;
            }
        }

        Ok(self.state)
    }

    /// Re-aggregate against a new reference instant.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> Summary {
        self.summary = aggregate::summarize(&self.records, now);
        self.computed_at = Some(now);
        self.summary
    }

    #[must_use]
    pub fn dashboard(&self, now: DateTime<Utc>) -> Dashboard {
        Dashboard::build(&self.records, now)
    }

    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Resolve a full ID or unique prefix to a loaded task's ID.
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::TaskNotFound`] when nothing matches and
    /// [`VortexError::AmbiguousId`] when a prefix matches several tasks.
    pub fn resolve(&self, query: &str) -> Result<TaskId, VortexError> {
        let query = query.trim();
        if let Some(record) = self.records.iter().find(|record| record.id().as_str() == query) {
            return Ok(record.id().clone());
        }

        let mut matches: Vec<&TaskId> = self
            .records
            .iter()
            .map(Record::id)
            .filter(|id| id.matches_prefix(query))
            .collect();

        match matches.len() {
            0 => Err(VortexError::TaskNotFound {
                id: query.to_string(),
            }),
            1 => Ok(matches.remove(0).clone()),
            _ => Err(VortexError::AmbiguousId {
                prefix: query.to_string(),
                matches: matches.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// Mark a follow-up as scheduled and stamp the last mention with today.
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::TaskNotFound`] for an unknown ID.
    pub fn schedule_follow_up(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<&Record, VortexError> {
        let today = now.date_naive().format("%Y-%m-%d").to_string();
        info!(task = %id, last_mentioned = %today, "scheduling follow-up");
        self.apply(id, now, |record| {
            record.set(field::FOLLOW_UP_SCHEDULED, follow_up::YES);
            record.set(field::LAST_MENTIONED, today);
        })
    }

    /// Overwrite `Status`. The value is not checked against known statuses.
    ///
    /// # Errors
    ///
    /// Returns [`VortexError::TaskNotFound`] for an unknown ID.
    pub fn update_status(
        &mut self,
        id: &TaskId,
        new_status: &str,
        now: DateTime<Utc>,
    ) -> Result<&Record, VortexError> {
        info!(task = %id, status = new_status, "updating status");
        self.apply(id, now, |record| record.set(field::STATUS, new_status))
    }

    fn apply(
        &mut self,
        id: &TaskId,
        now: DateTime<Utc>,
        mutate: impl FnOnce(&mut Record),
    ) -> Result<&Record, VortexError> {
        let index = self.position(id).ok_or_else(|| VortexError::TaskNotFound {
            id: id.to_string(),
        })?;

        let mut next = self.records.clone();
        mutate(&mut next[index]);
        self.records = next;
        self.recompute(now);

        Ok(&self.records[index])
    }
}
