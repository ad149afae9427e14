//! End-to-end flows: engine + memory backend, driven through messages
//!
//! Demo data ids: projects 1-2, developers 3-4, tasks 5-7.

use std::time::Duration;

use taskdeck_app::config::{load_settings_file, ConfirmPolicy, Settings};
use taskdeck_app::confirm::from_policy;
use taskdeck_app::{AppSnapshot, AutoConfirm, Engine, Message, Route};
use taskdeck_client::{Gateway, MemoryGateway, MemoryStore, Operation, Query, QueryData};
use taskdeck_core::{ApiError, EntityKind};

use taskdeck::headless::command::parse_command;

async fn console(confirm_deletes: bool) -> (Engine<MemoryGateway>, MemoryStore) {
    let store = MemoryStore::new();
    store.seed_demo().await;
    let engine = Engine::new(
        store.gateway(),
        Settings::default(),
        Box::new(AutoConfirm(confirm_deletes)),
    );
    (engine, store)
}

/// Process messages until `done` holds for the published snapshot
async fn run_until<F>(engine: &mut Engine<MemoryGateway>, done: F) -> AppSnapshot
where
    F: Fn(&AppSnapshot) -> bool,
{
    loop {
        let snapshot = engine.snapshot();
        if done(&snapshot) {
            return snapshot;
        }
        let stepped = tokio::time::timeout(Duration::from_secs(2), engine.step())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting; last snapshot: {:?}", snapshot));
        assert!(stepped, "message channel closed");
    }
}

fn send(engine: &mut Engine<MemoryGateway>, line: &str) {
    let message = parse_command(line)
        .unwrap_or_else(|e| panic!("{:?} did not parse: {}", line, e))
        .unwrap_or_else(|| panic!("{:?} is not a command", line));
    engine.process_message(message);
}

fn list_len(snapshot: &AppSnapshot) -> Option<usize> {
    let list = snapshot.list()?;
    if list.content.is_loading() || list.deleting {
        return None;
    }
    list.content.data()?.as_array().map(Vec::len)
}

fn form_loaded(snapshot: &AppSnapshot) -> bool {
    snapshot.form().is_some_and(|form| {
        form.options.values().all(|o| !o.is_loading())
            && form.prefetch.as_ref().map_or(true, |p| !p.is_loading())
    })
}

#[tokio::test]
async fn test_list_delete_refetches_from_backend() {
    let (mut engine, store) = console(true).await;
    send(&mut engine, "open /projects");
    run_until(&mut engine, |s| list_len(s) == Some(2)).await;

    send(&mut engine, "delete 2");
    let snapshot = run_until(&mut engine, |s| list_len(s) == Some(1)).await;

    let rows = snapshot.list().unwrap().content.data().unwrap();
    assert_eq!(rows[0]["name"], "Apollo");
    assert_eq!(store.call_count(EntityKind::Project, Operation::Delete).await, 1);
    assert_eq!(store.call_count(EntityKind::Project, Operation::GetAll).await, 2);
}

#[tokio::test]
async fn test_declined_delete_makes_no_call() {
    let (mut engine, store) = console(false).await;
    send(&mut engine, "open /tasks");
    run_until(&mut engine, |s| list_len(s) == Some(3)).await;

    send(&mut engine, "delete 5");
    assert!(!engine.snapshot().list().unwrap().deleting);
    assert_eq!(store.call_count(EntityKind::Task, Operation::Delete).await, 0);
}

#[tokio::test]
async fn test_create_task_then_navigate_to_list() {
    let (mut engine, store) = console(true).await;
    send(&mut engine, "open /tasks/new");
    run_until(&mut engine, form_loaded).await;

    for line in ["set title Fix bug", "set status TODO", "set projectId 1", "submit"] {
        send(&mut engine, line);
    }
    let snapshot = run_until(&mut engine, |s| list_len(s) == Some(4)).await;

    assert_eq!(snapshot.route.as_deref(), Some("/tasks"));
    assert_eq!(store.call_count(EntityKind::Task, Operation::Create).await, 1);
    // Only the list opened after navigation fetched tasks
    assert_eq!(store.call_count(EntityKind::Task, Operation::GetAll).await, 1);

    let rows = snapshot.list().unwrap().content.data().unwrap().clone();
    let created = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["title"] == "Fix bug")
        .unwrap();
    assert_eq!(created["status"], "TODO");
    assert!(created.get("developerId").is_none());
}

#[tokio::test]
async fn test_create_failure_stays_on_form() {
    let (mut engine, store) = console(true).await;
    send(&mut engine, "open /tasks/new");
    run_until(&mut engine, form_loaded).await;

    for line in ["set title Fix bug", "set projectId 1"] {
        send(&mut engine, line);
    }
    store.fail_next(ApiError::network("connection refused")).await;
    send(&mut engine, "submit");

    let snapshot = run_until(&mut engine, |s| {
        s.form().is_some_and(|f| !f.submitting && f.submit_error.is_some())
    })
    .await;
    let form = snapshot.form().unwrap();
    assert_eq!(
        form.submit_error.as_deref(),
        Some("Failed to create task. Please try again.")
    );
    assert_eq!(form.field("title").unwrap().value, "Fix bug");
    assert_eq!(snapshot.route.as_deref(), Some("/tasks/new"));
}

#[tokio::test]
async fn test_edit_task_updates_backend() {
    let (mut engine, store) = console(true).await;
    send(&mut engine, "open /tasks/6/edit");
    let snapshot = run_until(&mut engine, form_loaded).await;
    let form = snapshot.form().unwrap();
    assert_eq!(form.page_title, "Edit Task");
    assert_eq!(form.field("title").unwrap().value, "Design login page");
    assert_eq!(form.field("status").unwrap().value, "IN_PROGRESS");

    send(&mut engine, "set title Design signup page");
    send(&mut engine, "submit");
    run_until(&mut engine, |s| s.route.as_deref() == Some("/tasks")).await;

    let gateway = store.gateway();
    match gateway.fetch(Query::ById(EntityKind::Task, 6)).await {
        Ok(QueryData::Task(task)) => assert_eq!(task.title, "Design signup page"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_detail_delete_returns_to_list() {
    let (mut engine, store) = console(true).await;
    send(&mut engine, "open /tasks/7");
    run_until(&mut engine, |s| {
        s.detail().is_some_and(|d| d.content.data().is_some())
    })
    .await;

    send(&mut engine, "delete");
    let snapshot = run_until(&mut engine, |s| list_len(s) == Some(2)).await;
    assert_eq!(snapshot.route.as_deref(), Some("/tasks"));
    assert_eq!(store.call_count(EntityKind::Task, Operation::Delete).await, 1);
}

#[tokio::test]
async fn test_detail_switch_keeps_latest_entity() {
    let store = MemoryStore::new().with_latency(Duration::from_millis(20));
    store.seed_demo().await;
    let mut engine = Engine::new(
        store.gateway(),
        Settings::default(),
        Box::new(AutoConfirm(true)),
    );

    send(&mut engine, "open /projects/1");
    send(&mut engine, "open /projects/2");
    let snapshot = run_until(&mut engine, |s| {
        s.detail()
            .and_then(|d| d.content.data())
            .is_some_and(|data| data["id"] == 2)
    })
    .await;

    // Let the abandoned load for project 1 arrive too
    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.drain_pending_messages();

    let detail = engine.snapshot();
    assert_eq!(detail, snapshot);
    assert_eq!(detail.detail().unwrap().content.data().unwrap()["name"], "Hermes");
}

#[tokio::test]
async fn test_rejected_command_sets_notice() {
    let (mut engine, _) = console(true).await;
    send(&mut engine, "open /developers");
    send(&mut engine, "new");
    assert_eq!(
        engine.snapshot().notice.as_deref(),
        Some("'new' is not available on /developers")
    );
}

#[tokio::test]
async fn test_settings_file_drives_start_and_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[behavior]\nstart_route = \"/projects\"\nconfirm_deletes = \"never\"\n",
    )
    .unwrap();

    let settings = tokio_test::assert_ok!(load_settings_file(&path));
    assert_eq!(settings.behavior.confirm_deletes, ConfirmPolicy::Never);

    let store = MemoryStore::new();
    store.seed_demo().await;
    let confirm = from_policy(settings.behavior.confirm_deletes);
    let mut engine = Engine::new(store.gateway(), settings, confirm);

    let route = engine.start_route().unwrap();
    assert_eq!(route, Route::List(EntityKind::Project));
    engine.start(route);
    run_until(&mut engine, |s| list_len(s) == Some(2)).await;

    send(&mut engine, "delete 1");
    assert_eq!(store.call_count(EntityKind::Project, Operation::Delete).await, 0);

    engine.process_message(Message::Quit);
    assert!(engine.should_quit());
}
