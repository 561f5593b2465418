use std::rc::Rc;

use taskstate::{
    board, todo, BoardStore, FileStore, SlotStore, Task, TaskAction, TaskBuckets, TaskStatus,
    TodoAction, TodoItem, TodoStore,
};

#[test]
fn todo_session_persists_each_step() {
    let dir = tempfile::tempdir().unwrap();
    let slots = FileStore::new(dir.path());

    let mut store = TodoStore::open(slots.clone(), "todos");
    assert!(store.todos().is_empty());

    store.add(TodoItem::new(1, "Demo Todo"));
    assert_eq!(*store.todos(), vec![TodoItem::new(1, "Demo Todo")]);

    store.add(TodoItem::new(2, "Nuevo todo #2"));
    assert_eq!(store.todos().len(), 2);
    assert!(store.todos().iter().any(|t| t.id == 2));

    store.remove(1);
    assert_eq!(store.todos().len(), 1);
    assert!(store.todos().iter().all(|t| t.id != 1));

    store.toggle(2);
    assert!(store.todos()[0].done);
    store.toggle(2);
    assert!(!store.todos()[0].done);

    let reopened = TodoStore::open(slots, "todos");
    assert_eq!(*reopened.todos(), vec![TodoItem::new(2, "Nuevo todo #2")]);
}

#[test]
fn add_then_remove_restores_content() {
    let state = Rc::new(vec![TodoItem::new(1, "a"), TodoItem::new(2, "b")]);
    let added = todo::reduce(&state, &TodoAction::Add(TodoItem::new(3, "c")));
    let removed = todo::reduce(&added, &TodoAction::Remove(3));
    assert_eq!(*removed, *state);
}

#[test]
fn unknown_actions_leave_both_states_alone() {
    let todos = Rc::new(vec![TodoItem::new(1, "a")]);
    let action: TodoAction = serde_json::from_str(r#"{"type":"clearAll"}"#).unwrap();
    assert!(Rc::ptr_eq(&todos, &todo::reduce(&todos, &action)));

    let buckets = Rc::new(TaskBuckets::default());
    let action: TaskAction = serde_json::from_str(r#"{"type":"archive"}"#).unwrap();
    assert!(Rc::ptr_eq(&buckets, &board::reduce(&buckets, &action)));
}

#[test]
fn pending_task_moves_to_progress() {
    let state: TaskBuckets = serde_json::from_str(
        r#"{"pending":[{"id":1,"status":"pending"}],"progress":[],"unfinished":[]}"#,
    )
    .unwrap();
    let state = Rc::new(state);
    let action: TaskAction = serde_json::from_str(
        r#"{"type":"updateStatus","payload":{"id":1,"newStatus":"progress"}}"#,
    )
    .unwrap();

    let next = board::reduce(&state, &action);
    assert!(next.pending.is_empty());
    assert_eq!(next.progress.len(), 1);
    assert_eq!(next.progress[0].id, 1);
    assert_eq!(next.progress[0].status, TaskStatus::InProgress);
}

#[test]
fn board_snapshot_keeps_payload_fields() {
    let dir = tempfile::tempdir().unwrap();
    let slots = FileStore::new(dir.path());
    {
        let mut store = BoardStore::open(slots.clone(), "tasks");
        store.add(
            Task::new(10, TaskStatus::Pending)
                .with_field("title", "call client")
                .with_field("priority", 2),
        );
        store.add(Task::new(11, TaskStatus::Pending).with_field("title", "send notes"));
        store.update_status(10, TaskStatus::Unfinished);
    }

    let store = BoardStore::open(slots, "tasks");
    let buckets = store.buckets();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets.pending[0].title(), Some("send notes"));
    let moved = buckets.find(10).unwrap();
    assert_eq!(moved.status, TaskStatus::Unfinished);
    assert_eq!(moved.payload["priority"], 2);
}

#[test]
fn corrupt_snapshot_opens_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let slots = FileStore::new(dir.path());
    slots.save("todos", "[{\"id\": 1, \"desc").unwrap();

    let mut store = TodoStore::open(slots.clone(), "todos");
    assert!(store.todos().is_empty());

    store.add(TodoItem::new(5, "fresh"));
    let raw = slots.load("todos").unwrap().unwrap();
    let saved: Vec<TodoItem> = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved, vec![TodoItem::new(5, "fresh")]);
}

#[test]
fn unwritable_directory_does_not_fail_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let mut store = TodoStore::open(FileStore::new(&blocker), "todos");
    assert!(store.add(TodoItem::new(1, "kept in memory")));
    assert_eq!(store.todos().len(), 1);
    assert!(store.flush().is_err());
}

#[test]
fn reserved_payload_key_does_not_wipe_the_board() {
    let dir = tempfile::tempdir().unwrap();
    let slots = FileStore::new(dir.path());
    {
        let mut store = BoardStore::open(slots.clone(), "tasks");
        store.add(Task::new(1, TaskStatus::Pending).with_field("title", "keep me"));
        store.add(Task::new(2, TaskStatus::Pending).with_field("status", "archived"));
    }

    let reopened = BoardStore::open(slots, "tasks");
    let buckets = reopened.buckets();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets.find(1).and_then(Task::title), Some("keep me"));
    assert_eq!(buckets.find(2).map(|t| t.status), Some(TaskStatus::Pending));
}

#[test]
fn try_dispatch_surfaces_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let mut todos = TodoStore::open(FileStore::new(&blocker), "todos");
    assert!(todos
        .try_dispatch(TodoAction::Add(TodoItem::new(1, "unsaved")))
        .is_err());
    assert_eq!(todos.todos().len(), 1);

    let mut board = BoardStore::open(FileStore::new(&blocker), "tasks");
    assert!(board
        .try_dispatch(TaskAction::Add(Task::new(1, TaskStatus::Pending)))
        .is_err());
    assert!(!board
        .try_dispatch(TaskAction::UpdateStatus {
            id: 9,
            new_status: TaskStatus::Unfinished
        })
        .unwrap());
}
