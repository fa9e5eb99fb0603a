use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;
use wheel_console::{
    ActivationPolicy, ApiCall, ApiError, ConsoleError, InMemorySpinWheelApi, SpinWheelService,
};
use wheel_core::{EditorAction, RecordFilter, SubmissionStatus};

use crate::helpers::{diwali_actions, setup_static_logger, wheel};

fn service_over(api: &InMemorySpinWheelApi, policy: ActivationPolicy) -> SpinWheelService {
    SpinWheelService::new(Arc::new(api.clone()), policy)
}

fn position(calls: &[ApiCall], wanted: impl Fn(&ApiCall) -> bool) -> usize {
    calls
        .iter()
        .position(wanted)
        .expect("call should have been made")
}

#[tokio::test]
async fn test_new_wheel_submission_closes_session() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::new();
    let service = service_over(&api, ActivationPolicy::Abort);

    let session = service.open_new_editor().await;
    for action in diwali_actions() {
        service.apply(&session, action).await.expect("session open");
    }
    let created = service.submit(&session).await.expect("submitted");

    assert_eq!(created.map(|w| w.name), Some(String::from("Diwali")));
    assert!(service.sessions().is_empty().await);
    assert_eq!(service.search_wheels("diwali").await.len(), 1);

    let creates = api
        .calls()
        .into_iter()
        .filter(|call| matches!(call, ApiCall::CreateWheel(_)))
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn test_invalid_submission_keeps_session_and_makes_no_calls() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::new();
    let service = service_over(&api, ActivationPolicy::Abort);

    let session = service.open_new_editor().await;
    service
        .apply(&session, EditorAction::RemoveSection(0))
        .await
        .expect("session open");

    let result = service.submit(&session).await;

    assert!(matches!(result, Err(ConsoleError::Rejected(_))));
    assert!(api.calls().is_empty());
    let editor = service.editor(&session).await.expect("session kept");
    assert_eq!(editor.status(), &SubmissionStatus::Invalid);
    assert!(editor.draft().sections.is_empty());
}

#[tokio::test]
async fn test_activation_switches_previous_wheel_off_first() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    let service = service_over(&api, ActivationPolicy::Abort);

    let session = service.open_editor_for("wheel-b").await.expect("wheel exists");
    service
        .apply(&session, EditorAction::SetActive(true))
        .await
        .expect("session open");
    service.submit(&session).await.expect("submitted");

    assert_eq!(api.active_count(), 1);
    let calls = api.calls();
    let off = position(&calls, |call| {
        matches!(call, ApiCall::UpdateWheel(id, update) if id == "wheel-a" && update.is_active == Some(false))
    });
    let on = position(&calls, |call| {
        matches!(call, ApiCall::UpdateWheel(id, update) if id == "wheel-b" && update.is_active == Some(true))
    });
    assert!(off < on);

    let board = service.search_wheels("").await;
    let active: Vec<_> = board.iter().filter(|w| w.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "wheel-b");
}

#[tokio::test]
async fn test_abort_policy_keeps_session_on_failed_deactivation() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    api.fail_updates_of("wheel-a");
    let service = service_over(&api, ActivationPolicy::Abort);

    let session = service.open_editor_for("wheel-b").await.expect("wheel exists");
    service
        .apply(&session, EditorAction::SetActive(true))
        .await
        .expect("session open");

    let result = service.submit(&session).await;

    assert!(matches!(result, Err(ConsoleError::Deactivation { .. })));
    let editor = service.editor(&session).await.expect("session kept");
    assert!(matches!(editor.status(), SubmissionStatus::Failed(_)));
    assert!(editor.draft().is_active);

    let stored = api.wheels();
    assert!(stored.iter().any(|w| w.id == "wheel-a" && w.is_active));
    assert!(stored.iter().any(|w| w.id == "wheel-b" && !w.is_active));
}

#[tokio::test]
async fn test_best_effort_policy_may_leave_two_active() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    api.fail_updates_of("wheel-a");
    let service = service_over(&api, ActivationPolicy::BestEffort);

    let session = service.open_editor_for("wheel-b").await.expect("wheel exists");
    service
        .apply(&session, EditorAction::SetActive(true))
        .await
        .expect("session open");
    service.submit(&session).await.expect("submitted");

    assert_eq!(api.active_count(), 2);
}

#[tokio::test]
async fn test_delete_reconciles_board() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    let service = service_over(&api, ActivationPolicy::Abort);
    assert_eq!(service.overview().await.wheels.len(), 2);

    service.delete_wheel("wheel-a").await.expect("deleted");
    let board = service.search_wheels("").await;
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].id, "wheel-b");

    let missing = service.delete_wheel("wheel-a").await;
    assert!(matches!(
        missing,
        Err(ConsoleError::Backend(ApiError::NotFound(_)))
    ));
    assert_eq!(service.search_wheels("").await.len(), 1);
}

#[tokio::test]
async fn test_test_spin_shows_up_in_records() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![wheel("wheel-a", "Summer", true)]);
    let service = service_over(&api, ActivationPolicy::Abort);

    let won = service.test_spin("wheel-a", 3).await.expect("spun");
    assert!(["5 Tokens", "Better Luck"].contains(&won.title.as_str()));
    assert!(api.calls().contains(&ApiCall::Spin(String::from("wheel-a"), 3)));

    let now = OffsetDateTime::now_utc();
    let all = service
        .spin_records(&RecordFilter::default(), now)
        .await
        .expect("records");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].wheel_name(), "Summer");

    let other_wheel = RecordFilter {
        wheel: Some(String::from("wheel-z")),
        ..Default::default()
    };
    let none = service.spin_records(&other_wheel, now).await.expect("records");
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_overview_loads_wheels_and_records() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![wheel("wheel-a", "Summer", true)]);
    let service = service_over(&api, ActivationPolicy::Abort);

    let overview = service.overview().await;

    assert_eq!(overview.wheels.len(), 1);
    assert!(overview.records.is_empty());
    assert!(overview.warning.is_none());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    setup_static_logger();
    let service = service_over(&InMemorySpinWheelApi::new(), ActivationPolicy::Abort);

    let result = service.editor(&Uuid::now_v7()).await;

    assert!(matches!(result, Err(ConsoleError::NotFound(_))));
}

#[tokio::test]
async fn test_discard_closes_session() {
    setup_static_logger();
    let service = service_over(&InMemorySpinWheelApi::new(), ActivationPolicy::Abort);

    let session = service.open_new_editor().await;
    assert!(service.discard(&session).await);
    assert!(!service.discard(&session).await);
    assert!(service.sessions().is_empty().await);
}
