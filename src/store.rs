use std::rc::Rc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::board::{BoardReducer, TaskAction, TaskBuckets};
use crate::error::StorageError;
use crate::storage::{SlotStore, Snapshot};
use crate::task::{Task, TaskStatus};
use crate::todo::{TodoAction, TodoItem, TodoReducer};

/// A pure state transition. `reduce` must not touch its input and returns
/// the input `Rc` itself when the action changes nothing.
pub trait Reducer {
    type State: Serialize + DeserializeOwned + Default;
    type Action;

    fn reduce(state: &Rc<Self::State>, action: &Self::Action) -> Rc<Self::State>;
}

/// Wire shape shared by every action enum: a `type` tag and an optional
/// `payload`.
#[derive(Debug, Deserialize)]
pub struct TaggedAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

/// Owns one reducer's state and writes a snapshot after every change.
pub struct Store<R: Reducer, S: SlotStore> {
    slots: S,
    key: String,
    state: Rc<R::State>,
}

pub type TodoStore<S> = Store<TodoReducer, S>;
pub type BoardStore<S> = Store<BoardReducer, S>;

impl<R: Reducer, S: SlotStore> Store<R, S> {
    /// Loads the snapshot under `key`, or starts from the empty state.
    pub fn open(slots: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = Rc::new(Snapshot::<R::State>::load(&slots, &key));
        Self { slots, key, state }
    }

    pub fn state(&self) -> Rc<R::State> {
        Rc::clone(&self.state)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Runs one transition. Returns false when the action was a no-op, in
    /// which case nothing is written. A failed write is only logged.
    pub fn dispatch(&mut self, action: R::Action) -> bool {
        match self.try_dispatch(action) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to save snapshot");
                true
            }
        }
    }

    /// Like [`Store::dispatch`], but returns the snapshot write error. The
    /// new state is kept in memory either way.
    pub fn try_dispatch(&mut self, action: R::Action) -> Result<bool, StorageError> {
        let next = R::reduce(&self.state, &action);
        if Rc::ptr_eq(&next, &self.state) {
            debug!(key = %self.key, "no-op transition");
            return Ok(false);
        }
        self.state = next;
        self.flush()?;
        Ok(true)
    }

    /// Writes the current state to its slot.
    pub fn flush(&self) -> Result<(), StorageError> {
        Snapshot::save(&self.slots, &self.key, &*self.state)
    }
}

impl<S: SlotStore> Store<TodoReducer, S> {
    pub fn add(&mut self, item: TodoItem) -> bool {
        self.dispatch(TodoAction::Add(item))
    }

    pub fn remove(&mut self, id: i64) -> bool {
        self.dispatch(TodoAction::Remove(id))
    }

    pub fn toggle(&mut self, id: i64) -> bool {
        self.dispatch(TodoAction::Toggle(id))
    }

    pub fn todos(&self) -> Rc<Vec<TodoItem>> {
        self.state()
    }
}

impl<S: SlotStore> Store<BoardReducer, S> {
    pub fn add(&mut self, task: Task) -> bool {
        self.dispatch(TaskAction::Add(task))
    }

    pub fn update_status(&mut self, id: i64, new_status: TaskStatus) -> bool {
        self.dispatch(TaskAction::UpdateStatus { id, new_status })
    }

    pub fn buckets(&self) -> Rc<TaskBuckets> {
        self.state()
    }
}
