mod common;

use common::{MockBackend, signed_in_portal};
use hrms_portal::domains::LeaveForm;
use hrms_portal::domains::leave::LeaveActivity;
use hrms_portal::{Outcome, PortalError};
use serde_json::json;

fn form(start: &str, end: &str) -> LeaveForm {
    LeaveForm {
        leave_type_id: Some(2),
        start_date: start.to_string(),
        end_date: end.to_string(),
        reason: Some("Family event".to_string()),
    }
}

#[tokio::test]
async fn test_apply_validation_sends_nothing() {
    let mock = MockBackend::new();
    mock.respond("POST", "/leaves/apply", 201, json!({ "message": "Applied" }));
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;

    for (start, end) in [("", "2024-10-02"), ("2024-10-01", ""), ("2024-10-05", "2024-10-01")] {
        let outcome: Outcome<_> = portal.leave().apply_for_leave(&form(start, end)).await.into();
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    assert_eq!(mock.hit_count("POST", "/leaves/apply"), 0);
    let state = portal.leave().store().state();
    assert!(!state.activity.is_loading(LeaveActivity::Apply));
    assert_eq!(portal.leave().store().version(), 0);
}

#[tokio::test]
async fn test_apply_sends_defaults_for_missing_fields() {
    let mock = MockBackend::new();
    mock.respond(
        "POST",
        "/leaves/apply",
        201,
        json!({ "message": "Leave applied", "data": { "id": 31, "status": "PENDING", "start_date": "2024-10-01" } }),
    );
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;

    let receipt = portal
        .leave()
        .apply_for_leave(&LeaveForm {
            leave_type_id: None,
            start_date: "2024-10-01".to_string(),
            end_date: "2024-10-01".to_string(),
            reason: None,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(receipt.id.as_deref(), Some("31"));
    assert_eq!(receipt.status, "pending");

    let hit = mock.last_hit("POST", "/leaves/apply").unwrap();
    assert_eq!(
        hit.body,
        json!({ "leave_type_id": 0, "start_date": "2024-10-01", "end_date": "2024-10-01", "reason": "" })
    );
    assert_eq!(hit.authorization.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn test_balance_types_and_requests() {
    let mock = MockBackend::new();
    mock.respond(
        "GET",
        "/leaves/balance",
        200,
        json!({ "data": { "balances": [
            { "leave_type": "Casual", "used": 2, "total": 12 },
            { "leaveTypeName": "Sick", "used_days": 1, "totalDays": 6, "available": 5 }
        ] } }),
    );
    mock.respond(
        "GET",
        "/leaves/types",
        200,
        json!([{ "id": 1, "name": "Casual", "max_days": 12 }, { "leave_type_id": "2", "leave_type_name": "Sick" }]),
    );
    mock.respond(
        "GET",
        "/leaves/requests",
        200,
        json!({ "data": { "requests": [{ "id": 9, "leave_type": "Casual", "status": "Approved", "days": 1 }] } }),
    );
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;
    let leave = portal.leave();

    let balance = leave.get_leave_balance().await.unwrap();
    assert_eq!(balance.entries.len(), 2);
    assert!((balance.entries[0].available - 10.0).abs() < f64::EPSILON);
    assert!((balance.total_available_days - 15.0).abs() < f64::EPSILON);

    let types = leave.get_leave_types().await.unwrap();
    assert_eq!(types[1].id, Some(2));
    assert_eq!(types[1].name, "Sick");

    let requests = leave.get_leave_requests().await.unwrap();
    assert_eq!(requests[0].status, "approved");

    let state = leave.store().state();
    assert_eq!(state.types.len(), 2);
    assert_eq!(state.requests.len(), 1);
    assert!(state.balance.is_some());
    assert!(!state.activity.any_loading());
}

#[tokio::test]
async fn test_failed_apply_does_not_touch_balance() {
    let mock = MockBackend::new();
    mock.respond("GET", "/leaves/balance", 200, json!({ "total_available_days": 4 }));
    mock.respond("POST", "/leaves/apply", 409, json!({ "message": "Overlapping leave" }));
    let base = mock.start().await;
    let (portal, _) = signed_in_portal(&base, "tok").await;

    portal.leave().get_leave_balance().await.unwrap();
    let err = portal
        .leave()
        .apply_for_leave(&form("2024-10-01", "2024-10-02"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Transport { status: Some(409), .. }));

    let state = portal.leave().store().state();
    assert_eq!(state.activity.error(LeaveActivity::Apply), Some("Overlapping leave"));
    assert_eq!(state.activity.error(LeaveActivity::Balance), None);
    assert!(state.balance.is_some());
}
