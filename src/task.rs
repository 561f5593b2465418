use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys owned by [`Task`] itself. A payload entry with one of these names is
/// never written, since it would collide with the real field on reload.
pub const RESERVED_KEYS: [&str; 2] = ["id", "status"];

/// Bucket a task lives in. Declaration order is the search order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "progress", alias = "inProgress")]
    InProgress,
    #[serde(rename = "unfinished")]
    Unfinished,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Unfinished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "progress",
            TaskStatus::Unfinished => "unfinished",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN PROGRESS",
            TaskStatus::Unfinished => "UNFINISHED",
        }
    }

    /// Next bucket, wrapping from the last back to the first.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Unfinished,
            TaskStatus::Unfinished => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown status '{}' (expected pending, progress or unfinished)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "progress" | "inProgress" | "in-progress" => Ok(TaskStatus::InProgress),
            "unfinished" => Ok(TaskStatus::Unfinished),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A tracked task. Any fields beyond `id` and `status` are kept in `payload`
/// and written back next to them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub status: TaskStatus,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Task {
    pub fn new(id: i64, status: TaskStatus) -> Self {
        Self {
            id,
            status,
            payload: Map::new(),
        }
    }

    /// Adds a payload field. `id` and `status` are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.payload.insert(key, value.into());
        }
        self
    }

    /// The `title` payload field, when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.payload.get("title").and_then(Value::as_str)
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = self
            .payload
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()));
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("status", &self.status)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
