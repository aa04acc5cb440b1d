//! Task records and their stable identifiers.
//!
//! A [`Record`] is a flat, ordered mapping of column name to string value,
//! exactly as decoded from the source CSV. Nothing is validated: unknown
//! status values and extra columns pass through untouched.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Prefix carried by every generated task ID.
pub const ID_PREFIX: &str = "vx-";

/// Hex digits of the digest appended after the line number.
const ID_HEX_LEN: usize = 6;

/// Column names the classifier and aggregator read.
pub mod field {
    pub const PROJECT: &str = "Project";
    pub const TASK_DESCRIPTION: &str = "Task_Description";
    pub const OWNER: &str = "Owner";
    pub const STATUS: &str = "Status";
    pub const MENTIONED_IN_MEETING: &str = "Mentioned_in_Meeting";
    pub const ORIGINAL_DUE_DATE: &str = "Original_Due_Date";
    pub const LAST_MENTIONED: &str = "Last_Mentioned";
    pub const FOLLOW_UP_SCHEDULED: &str = "Follow_Up_Scheduled";
    pub const FINAL_RESOLUTION: &str = "Final_Resolution";
}

/// Well-known `Status` values. Others are accepted as-is.
pub mod status {
    pub const OPEN: &str = "Open";
    pub const CLOSED: &str = "Closed";
    pub const COMPLETED: &str = "Completed";
    pub const BLOCKED: &str = "Blocked";
}

/// `Follow_Up_Scheduled` values.
pub mod follow_up {
    pub const YES: &str = "Yes";
    pub const NO: &str = "No";
}

/// Stable synthetic identifier assigned to a record when it is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Derive an ID from the record's source line number and raw text:
    /// `vx-{line_no}{hex6}`.
    ///
    /// The line number is spelled out in the ID, so two rows of one payload
    /// never share an ID however many rows there are. Decoding the same
    /// payload twice yields the same IDs.
    #[must_use]
    pub fn derive(line_no: usize, raw_line: &str) -> Self {
        let seed = format!("{line_no}:{raw_line}");
        let digest = blake3::hash(seed.as_bytes()).to_hex();
        Self(format!("{ID_PREFIX}{line_no}{}", &digest[..ID_HEX_LEN]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `prefix` (with or without the `vx-` prefix) starts this ID.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return false;
        }
        let bare = self.0.strip_prefix(ID_PREFIX).unwrap_or(&self.0);
        self.0.starts_with(prefix) || bare.starts_with(prefix)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// One decoded action item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: TaskId,
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    #[must_use]
    pub const fn new(id: TaskId) -> Self {
        Self {
            id,
            fields: Vec::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Value of `name`, or `None` when the column is absent or unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// True when the column exists, even if its value is unset.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == name)
    }

    /// Overwrite `name`, appending the column if the record lacks it.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.insert(name, Some(value.into()));
    }

    pub(crate) fn insert(&mut self, name: &str, value: Option<String>) {
        if let Some(slot) = self.fields.iter_mut().find(|(key, _)| key == name) {
            slot.1 = value;
        } else {
            self.fields.push((name.to_string(), value));
        }
    }

    /// Column names in record order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Column values in record order; unset values are `None`.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.fields.iter().map(|(_, value)| value.as_deref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.get(field::PROJECT)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get(field::TASK_DESCRIPTION)
    }

    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.get(field::OWNER)
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get(field::STATUS)
    }

    #[must_use]
    pub fn original_due_date(&self) -> Option<&str> {
        self.get(field::ORIGINAL_DUE_DATE)
    }

    #[must_use]
    pub fn last_mentioned(&self) -> Option<&str> {
        self.get(field::LAST_MENTIONED)
    }

    #[must_use]
    pub fn follow_up_scheduled(&self) -> Option<&str> {
        self.get(field::FOLLOW_UP_SCHEDULED)
    }
}

struct OrderedFields<'a>(&'a [(String, Option<String>)]);

impl Serialize for OrderedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            id: &'a TaskId,
            fields: OrderedFields<'a>,
        }

        View {
            id: &self.id,
            fields: OrderedFields(&self.fields),
        }
        .serialize(serializer)
    }
}
