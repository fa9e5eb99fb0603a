use maplit::hashset;
use mockall::{predicate::eq, Sequence};
use std::{collections::HashSet, sync::Arc};
use wheel_console::{ActivationPolicy, ApiError, ConsoleError, SubmissionGate};
use wheel_core::{FieldKey, SubmissionStatus, SubmitRejection, WheelEditor, GENERIC_FAILURE};

use crate::helpers::{
    created_from, diwali_editor, diwali_payload, setup_static_logger, wheel,
    MockSpinWheelBackend,
};

fn gate(backend: MockSpinWheelBackend, policy: ActivationPolicy) -> SubmissionGate {
    SubmissionGate::new(Arc::new(backend), policy)
}

#[tokio::test]
async fn test_invalid_submission_never_reaches_backend() {
    setup_static_logger();
    // no expectations: any backend call panics
    let gate = gate(MockSpinWheelBackend::new(), ActivationPolicy::Abort);
    let mut editor = WheelEditor::new();

    let result = gate.submit(&mut editor).await;

    assert!(matches!(
        result,
        Err(ConsoleError::Rejected(SubmitRejection::Invalid(_)))
    ));
    assert_eq!(editor.status(), &SubmissionStatus::Invalid);
    assert!(editor.errors().contains(&FieldKey::WheelName));
}

#[tokio::test]
async fn test_diwali_wheel_is_created_exactly_once() {
    setup_static_logger();
    let expected = diwali_payload();
    let mut backend = MockSpinWheelBackend::new();
    backend
        .expect_list_wheels()
        .times(1)
        .returning(|| Ok(vec![]));
    backend
        .expect_create_wheel()
        .withf(move |payload| *payload == expected)
        .times(1)
        .returning(|payload| Ok(Some(created_from("64f0c0ffee0000000000d1a1", &payload))));

    let gate = gate(backend, ActivationPolicy::Abort);
    let mut editor = diwali_editor();
    let created = gate
        .submit(&mut editor)
        .await
        .expect("diwali wheel should be created");

    let created = created.expect("backend returned the wheel");
    assert_eq!(created.name, "Diwali");
    assert_eq!(created.sections.len(), 2);
    assert_eq!(editor.status(), &SubmissionStatus::Succeeded);
}

#[tokio::test]
async fn test_inactive_wheel_skips_exclusive_activation() {
    setup_static_logger();
    let mut expected = diwali_payload();
    expected.is_active = false;
    let mut backend = MockSpinWheelBackend::new();
    backend
        .expect_create_wheel()
        .with(eq(expected))
        .times(1)
        .returning(|_| Ok(None));

    let gate = gate(backend, ActivationPolicy::Abort);
    let mut editor = diwali_editor();
    editor.set_active(false);

    let created = gate.submit(&mut editor).await.expect("created");
    assert!(created.is_none());
    assert_eq!(editor.status(), &SubmissionStatus::Succeeded);
}

#[tokio::test]
async fn test_previous_wheel_deactivated_before_target_activated() {
    setup_static_logger();
    let a = wheel("wheel-a", "Summer", true);
    let b = wheel("wheel-b", "Winter", false);
    let listed = vec![a.clone(), b.clone()];

    let mut seq = Sequence::new();
    let mut backend = MockSpinWheelBackend::new();
    backend
        .expect_list_wheels()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move || Ok(listed.clone()));
    backend
        .expect_update_wheel()
        .withf(|id, update| id == "wheel-a" && update.is_active == Some(false))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(None));
    backend
        .expect_update_wheel()
        .withf(|id, update| id == "wheel-b" && update.is_active == Some(true))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(None));

    let gate = gate(backend, ActivationPolicy::Abort);
    let mut editor = WheelEditor::from_wheel(&b);
    editor.set_active(true);

    gate.submit(&mut editor).await.expect("activation succeeds");
    assert_eq!(editor.status(), &SubmissionStatus::Succeeded);
}

#[tokio::test]
async fn test_abort_policy_stops_when_deactivation_fails() {
    setup_static_logger();
    let a = wheel("wheel-a", "Summer", true);
    let b = wheel("wheel-b", "Winter", false);
    let listed = vec![a, b.clone()];

    let mut backend = MockSpinWheelBackend::new();
    backend
        .expect_list_wheels()
        .returning(move || Ok(listed.clone()));
    // only wheel-a may be updated, touching wheel-b would panic
    backend
        .expect_update_wheel()
        .withf(|id, _| id == "wheel-a")
        .times(1)
        .returning(|_, _| Err(ApiError::Rejected(String::from("Wheel is locked"))));

    let gate = gate(backend, ActivationPolicy::Abort);
    let mut editor = WheelEditor::from_wheel(&b);
    editor.set_active(true);

    let result = gate.submit(&mut editor).await;

    match result {
        Err(ConsoleError::Deactivation { name, .. }) => assert_eq!(name, "Summer"),
        other => panic!("expected deactivation failure, got {:?}", other),
    }
    match editor.status() {
        SubmissionStatus::Failed(message) => assert!(message.contains("Wheel is locked")),
        other => panic!("expected failed status, got {:?}", other),
    }
    assert_eq!(editor.draft().name, "Winter");
    assert!(editor.draft().is_active);
}

#[tokio::test]
async fn test_best_effort_deactivates_remaining_wheels() {
    setup_static_logger();
    let listed = vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-c", "Monsoon", true),
        wheel("wheel-b", "Winter", false),
    ];

    let mut backend = MockSpinWheelBackend::new();
    backend
        .expect_list_wheels()
        .returning(move || Ok(listed.clone()));
    backend
        .expect_update_wheel()
        .withf(|id, _| id == "wheel-a")
        .times(1)
        .returning(|_, _| Err(ApiError::Rejected(String::from("Wheel is locked"))));
    backend
        .expect_update_wheel()
        .withf(|id, update| id == "wheel-c" && update.is_active == Some(false))
        .times(1)
        .returning(|_, _| Ok(None));
    backend
        .expect_update_wheel()
        .withf(|id, _| id == "wheel-b")
        .never();

    let gate = gate(backend, ActivationPolicy::BestEffort);
    let deactivated: HashSet<String> = gate
        .activate_exclusively(Some("wheel-b"))
        .await
        .expect("best effort never fails")
        .into_iter()
        .collect();
    assert_eq!(deactivated, hashset! { String::from("wheel-c") });
}

#[tokio::test]
async fn test_best_effort_submission_still_writes_target() {
    setup_static_logger();
    let b = wheel("wheel-b", "Winter", false);
    let listed = vec![wheel("wheel-a", "Summer", true), b.clone()];

    let mut backend = MockSpinWheelBackend::new();
    backend
        .expect_list_wheels()
        .times(1)
        .returning(move || Ok(listed.clone()));
    backend
        .expect_update_wheel()
        .withf(|id, _| id == "wheel-a")
        .times(1)
        .returning(|_, _| Err(ApiError::Rejected(String::from("Wheel is locked"))));
    backend
        .expect_update_wheel()
        .withf(|id, update| id == "wheel-b" && update.is_active == Some(true))
        .times(1)
        .returning(|_, _| Ok(None));

    let gate = gate(backend, ActivationPolicy::BestEffort);
    let mut editor = WheelEditor::from_wheel(&b);
    editor.set_active(true);

    gate.submit(&mut editor).await.expect("target still written");
    assert_eq!(editor.status(), &SubmissionStatus::Succeeded);
}

#[tokio::test]
async fn test_failed_create_keeps_draft_with_generic_message() {
    setup_static_logger();
    let mut backend = MockSpinWheelBackend::new();
    backend.expect_list_wheels().returning(|| Ok(vec![]));
    backend
        .expect_create_wheel()
        .times(1)
        .returning(|_| Err(ApiError::Rejected(String::new())));

    let gate = gate(backend, ActivationPolicy::Abort);
    let mut editor = diwali_editor();
    let before = editor.draft().clone();

    assert!(gate.submit(&mut editor).await.is_err());
    assert_eq!(
        editor.status(),
        &SubmissionStatus::Failed(GENERIC_FAILURE.to_string())
    );
    assert_eq!(editor.draft(), &before);
    assert!(!editor.is_pending());
}
