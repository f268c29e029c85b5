mod common;

use common::{MockBackend, portal, signed_in_portal};
use hrms_portal::PortalError;
use hrms_portal::domains::TaskQuery;
use hrms_portal::domains::task::TaskActivity;
use hrms_portal::normalized::TaskStatus;
use serde_json::json;

fn task_list() -> serde_json::Value {
    json!({
        "data": {
            "items": [
                { "id": 1, "title": "Prepare payroll", "status": "In Progress", "priority": "HIGH" },
                { "task_id": 2, "task_name": "Update handbook", "task_status": "open" }
            ],
            "pagination": { "page": 1, "page_size": 20, "total": 2, "total_pages": 1 }
        }
    })
}

#[tokio::test]
async fn test_every_operation_requires_a_token() {
    let mock = MockBackend::new();
    let base = mock.start().await;
    let (portal, _) = portal(&base);

    let results = [
        portal.tasks().get_tasks(TaskQuery::default()).await.err(),
        portal.tasks().get_task("1").await.err(),
        portal.tasks().update_task_status("1", TaskStatus::Closed).await.err(),
    ];
    for err in results {
        assert!(matches!(err, Some(PortalError::NotAuthenticated)));
    }
    assert!(matches!(
        portal.dashboard().get_dashboard().await,
        Err(PortalError::NotAuthenticated)
    ));
    assert!(matches!(
        portal.attendance().punch_in().await,
        Err(PortalError::NotAuthenticated)
    ));
    assert!(matches!(
        portal.ai_chat().ask("hello").await,
        Err(PortalError::NotAuthenticated)
    ));

    assert!(mock.hits().is_empty());
    let state = portal.tasks().store().state();
    assert!(!state.activity.any_loading());
    assert_eq!(state.activity.error(TaskActivity::List), Some("Not authenticated"));
}

#[tokio::test]
async fn test_list_normalizes_status_and_reads_pagination() {
    let mock = MockBackend::new();
    mock.respond("GET", "/tasks/my-tasks", 200, task_list());
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;

    let page = portal
        .tasks()
        .get_tasks(TaskQuery {
            status: Some(TaskStatus::InProgress),
            ..TaskQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].status, TaskStatus::InProgress);
    assert_eq!(page.items[0].priority.as_deref(), Some("high"));
    assert_eq!(page.items[1].id, "2");
    assert_eq!(page.items[1].title, "Update handbook");
    assert_eq!(page.pagination.as_ref().unwrap().total, Some(2));

    let hit = mock.last_hit("GET", "/tasks/my-tasks").unwrap();
    assert_eq!(hit.query.as_deref(), Some("page=1&page_size=20&status=in_progress"));
}

#[tokio::test]
async fn test_status_update_patches_cached_list() {
    let mock = MockBackend::new();
    mock.respond("GET", "/tasks/my-tasks", 200, task_list());
    mock.respond("PUT", "/tasks/2", 200, json!({ "message": "Status updated" }));
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;
    let tasks = portal.tasks();

    tasks.get_tasks(TaskQuery::default()).await.unwrap();
    let updated = tasks.update_task_status("2", TaskStatus::Closed).await.unwrap();
    assert_eq!(updated.title, "Update handbook");
    assert_eq!(updated.status, TaskStatus::Closed);

    let hit = mock.last_hit("PUT", "/tasks/2").unwrap();
    assert_eq!(hit.body, json!({ "status": "closed" }));

    let state = tasks.store().state();
    let items = &state.tasks.as_ref().unwrap().items;
    assert_eq!(items[1].status, TaskStatus::Closed);
    assert_eq!(items[0].status, TaskStatus::InProgress);
    assert_eq!(state.detail.as_ref().unwrap().id, "2");
}

#[tokio::test]
async fn test_detail_error_leaves_list_untouched() {
    let mock = MockBackend::new();
    mock.respond("GET", "/tasks/my-tasks", 200, task_list());
    mock.respond("GET", "/tasks/1", 200, json!({ "data": { "id": 1, "title": "Prepare payroll", "status": "closed" } }));
    mock.respond("GET", "/tasks/99", 404, json!({ "detail": "Task not found" }));
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;
    let tasks = portal.tasks();

    tasks.get_tasks(TaskQuery::default()).await.unwrap();
    let detail = tasks.get_task("1").await.unwrap();
    assert_eq!(detail.status, TaskStatus::Closed);

    let err = tasks.get_task("99").await.unwrap_err();
    assert_eq!(err.to_string(), "Task not found");

    let state = tasks.store().state();
    assert!(state.detail.is_none());
    assert_eq!(state.activity.error(TaskActivity::Detail), Some("Task not found"));
    assert_eq!(state.activity.error(TaskActivity::List), None);
    assert_eq!(state.tasks.as_ref().unwrap().items.len(), 2);

    tasks.clear_task_detail();
    let state = tasks.store().state();
    assert_eq!(state.activity.error(TaskActivity::Detail), None);
    assert!(state.tasks.is_some());
}

#[tokio::test]
async fn test_server_error_without_message_uses_status_text() {
    let mock = MockBackend::new();
    mock.respond("GET", "/tasks/my-tasks", 500, serde_json::Value::Null);
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;

    let err = portal.tasks().get_tasks(TaskQuery::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 500");

    let state = portal.tasks().store().state();
    assert!(!state.activity.is_loading(TaskActivity::List));
    assert_eq!(
        state.activity.error(TaskActivity::List),
        Some("Request failed with status code 500")
    );
}
