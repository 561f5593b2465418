use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{Reducer, TaggedAction};
use crate::task::{Task, TaskStatus};

/// Tasks grouped by status. A task id is in exactly one bucket.
///
/// Decoding files each task under its own `status`, whatever bucket it was
/// stored in.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(from = "StoredBuckets")]
pub struct TaskBuckets {
    pub pending: Vec<Task>,
    pub progress: Vec<Task>,
    pub unfinished: Vec<Task>,
}

#[derive(Deserialize)]
struct StoredBuckets {
    #[serde(default)]
    pending: Vec<Task>,
    #[serde(default, alias = "inProgress")]
    progress: Vec<Task>,
    #[serde(default)]
    unfinished: Vec<Task>,
}

impl From<StoredBuckets> for TaskBuckets {
    fn from(stored: StoredBuckets) -> Self {
        let mut buckets = TaskBuckets::new();
        let tasks = stored
            .pending
            .into_iter()
            .chain(stored.progress)
            .chain(stored.unfinished);
        for task in tasks {
            buckets.bucket_mut(task.status).push(task);
        }
        buckets
    }
}

impl TaskBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.progress,
            TaskStatus::Unfinished => &self.unfinished,
        }
    }

    fn bucket_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.progress,
            TaskStatus::Unfinished => &mut self.unfinished,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.progress.len() + self.unfinished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tasks, bucket by bucket, in search order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.pending
            .iter()
            .chain(self.progress.iter())
            .chain(self.unfinished.iter())
    }

    pub fn find(&self, id: i64) -> Option<&Task> {
        self.iter().find(|t| t.id == id)
    }

    /// Bucket and index of the first task with `id`.
    fn locate(&self, id: i64) -> Option<(TaskStatus, usize)> {
        TaskStatus::ALL.iter().find_map(|status| {
            self.bucket(*status)
                .iter()
                .position(|t| t.id == id)
                .map(|index| (*status, index))
        })
    }
}

/// Transitions over [`TaskBuckets`].
///
/// JSON form: `{"type": "updateStatus", "payload": {"id": 1, "newStatus": "progress"}}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    try_from = "TaggedAction"
)]
pub enum TaskAction {
    Add(Task),
    #[serde(rename_all = "camelCase")]
    UpdateStatus {
        id: i64,
        new_status: TaskStatus,
    },
    Unknown,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusChange {
    id: i64,
    new_status: TaskStatus,
}

impl TryFrom<TaggedAction> for TaskAction {
    type Error = serde_json::Error;

    fn try_from(raw: TaggedAction) -> Result<Self, Self::Error> {
        Ok(match raw.kind.as_str() {
            "add" => TaskAction::Add(serde_json::from_value(raw.payload)?),
            "updateStatus" => {
                let change: StatusChange = serde_json::from_value(raw.payload)?;
                TaskAction::UpdateStatus {
                    id: change.id,
                    new_status: change.new_status,
                }
            }
            _ => TaskAction::Unknown,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardReducer;

impl Reducer for BoardReducer {
    type State = TaskBuckets;
    type Action = TaskAction;

    fn reduce(state: &Rc<Self::State>, action: &Self::Action) -> Rc<Self::State> {
        reduce(state, action)
    }
}

/// Applies `action` to `state`, returning the same `Rc` on a no-op.
pub fn reduce(state: &Rc<TaskBuckets>, action: &TaskAction) -> Rc<TaskBuckets> {
    match action {
        TaskAction::Add(task) => {
            debug!(id = task.id, status = %task.status, "task add");
            let mut next = TaskBuckets::clone(state);
            next.bucket_mut(task.status).push(task.clone());
            Rc::new(next)
        }
        TaskAction::UpdateStatus { id, new_status } => {
            let Some((from, index)) = state.locate(*id) else {
                debug!(id, "task update for unknown id ignored");
                return Rc::clone(state);
            };
            debug!(id, %from, to = %new_status, "task status update");
            let mut next = TaskBuckets::clone(state);
            let mut task = next.bucket_mut(from).remove(index);
            task.status = *new_status;
            next.bucket_mut(*new_status).push(task);
            Rc::new(next)
        }
        TaskAction::Unknown => Rc::clone(state),
    }
}
