use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{Reducer, TaggedAction};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            done: false,
        }
    }
}

/// Transitions over a to-do list.
///
/// The JSON form is `{"type": "add", "payload": {...}}`. A `type` this
/// crate does not know decodes to [`TodoAction::Unknown`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    try_from = "TaggedAction"
)]
pub enum TodoAction {
    Add(TodoItem),
    Remove(i64),
    Toggle(i64),
    Unknown,
}

impl TryFrom<TaggedAction> for TodoAction {
    type Error = serde_json::Error;

    fn try_from(raw: TaggedAction) -> Result<Self, Self::Error> {
        Ok(match raw.kind.as_str() {
            "add" => TodoAction::Add(serde_json::from_value(raw.payload)?),
            "remove" => TodoAction::Remove(serde_json::from_value(raw.payload)?),
            "toggle" => TodoAction::Toggle(serde_json::from_value(raw.payload)?),
            _ => TodoAction::Unknown,
        })
    }
}

/// Reducer for a flat to-do list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoReducer;

impl Reducer for TodoReducer {
    type State = Vec<TodoItem>;
    type Action = TodoAction;

    fn reduce(state: &Rc<Self::State>, action: &Self::Action) -> Rc<Self::State> {
        reduce(state, action)
    }
}

/// Applies `action` to `state`.
///
/// Returns the same `Rc` when nothing changed.
pub fn reduce(state: &Rc<Vec<TodoItem>>, action: &TodoAction) -> Rc<Vec<TodoItem>> {
    match action {
        TodoAction::Add(item) => {
            debug!(id = item.id, "todo add");
            let mut next = Vec::with_capacity(state.len() + 1);
            next.extend(state.iter().cloned());
            next.push(item.clone());
            Rc::new(next)
        }
        TodoAction::Remove(id) => {
            if !state.iter().any(|t| t.id == *id) {
                return Rc::clone(state);
            }
            debug!(id, "todo remove");
            Rc::new(state.iter().filter(|t| t.id != *id).cloned().collect())
        }
        TodoAction::Toggle(id) => {
            if !state.iter().any(|t| t.id == *id) {
                return Rc::clone(state);
            }
            debug!(id, "todo toggle");
            Rc::new(
                state
                    .iter()
                    .map(|t| {
                        if t.id == *id {
                            TodoItem {
                                done: !t.done,
                                ..t.clone()
                            }
                        } else {
                            t.clone()
                        }
                    })
                    .collect(),
            )
        }
        TodoAction::Unknown => Rc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[(i64, &str, bool)]) -> Rc<Vec<TodoItem>> {
        Rc::new(
            items
                .iter()
                .map(|(id, d, done)| TodoItem {
                    id: *id,
                    description: d.to_string(),
                    done: *done,
                })
                .collect(),
        )
    }

    #[test]
    fn add_appends_at_end() {
        let state = list(&[(1, "a", false)]);
        let next = reduce(&state, &TodoAction::Add(TodoItem::new(2, "b")));
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].id, 2);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn add_does_not_reject_duplicate_ids() {
        let state = list(&[(1, "a", false)]);
        let next = reduce(&state, &TodoAction::Add(TodoItem::new(1, "again")));
        assert_eq!(next.iter().filter(|t| t.id == 1).count(), 2);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let state = list(&[(1, "a", false), (2, "b", true), (3, "c", false)]);
        let next = reduce(&state, &TodoAction::Remove(2));
        let ids: Vec<i64> = next.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn remove_missing_id_returns_same_reference() {
        let state = list(&[(1, "a", false)]);
        let next = reduce(&state, &TodoAction::Remove(42));
        assert!(Rc::ptr_eq(&state, &next));
    }

    #[test]
    fn toggle_flips_only_the_match() {
        let state = list(&[(1, "a", false), (2, "b", false)]);
        let next = reduce(&state, &TodoAction::Toggle(2));
        assert!(!next[0].done);
        assert!(next[1].done);
        assert_eq!(next[1].description, "b");
        assert!(!state[1].done);
    }

    #[test]
    fn toggle_twice_restores_content() {
        let state = list(&[(1, "a", false), (2, "b", true)]);
        let once = reduce(&state, &TodoAction::Toggle(2));
        let twice = reduce(&once, &TodoAction::Toggle(2));
        assert_eq!(*twice, *state);
    }

    #[test]
    fn toggle_missing_id_returns_same_reference() {
        let state = list(&[(1, "a", false)]);
        assert!(Rc::ptr_eq(&state, &reduce(&state, &TodoAction::Toggle(9))));
    }

    #[test]
    fn unknown_action_is_identity() {
        let state = list(&[(1, "a", false)]);
        assert!(Rc::ptr_eq(&state, &reduce(&state, &TodoAction::Unknown)));
    }

    #[test]
    fn unrecognized_tag_decodes_to_unknown() {
        let action: TodoAction =
            serde_json::from_str(r#"{"type":"archive","payload":7}"#).unwrap();
        assert_eq!(action, TodoAction::Unknown);

        let action: TodoAction = serde_json::from_str(
            r#"{"type":"add","payload":{"id":5,"description":"x"}}"#,
        )
        .unwrap();
        assert_eq!(action, TodoAction::Add(TodoItem::new(5, "x")));
    }
}
