use axum::{
    body::to_bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Form,
};
use std::sync::Arc;
use wheel_console::{
    admin_page_handler, delete_wheel_handler, health, new_editor_handler, records_fragment,
    rename_wheel_handler, submit_wheel_handler, test_spin_handler, update_section_field_handler,
    wheel_rows_fragment, ActivationPolicy, AppState, FieldForm, InMemorySpinWheelApi, NameForm,
    RecordsQuery, SearchQuery, SpinWheelService, TestSpinForm,
};

use crate::helpers::{diwali_actions, setup_static_logger, wheel};

fn state_over(api: &InMemorySpinWheelApi) -> Arc<AppState> {
    let service = SpinWheelService::new(Arc::new(api.clone()), ActivationPolicy::Abort);
    Arc::new(AppState::new("Spin Wheel Admin", Arc::new(service)))
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn test_dashboard_lists_wheels() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    let state = state_over(&api);

    let page = admin_page_handler(State(state)).await.0;

    assert!(page.contains("Spin Wheel Admin"));
    assert!(page.contains("Summer"));
    assert!(page.contains("Winter"));
    assert!(page.contains("No spin records found"));
}

#[tokio::test]
async fn test_wheel_search_narrows_rows() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    let state = state_over(&api);
    state.service.refresh_wheels().await.expect("wheels listed");

    let rows = wheel_rows_fragment(
        State(state),
        Query(SearchQuery {
            search: String::from("win"),
        }),
    )
    .await
    .0;

    assert!(rows.contains("Winter"));
    assert!(!rows.contains("Summer"));
}

#[tokio::test]
async fn test_new_editor_renders_blank_form() {
    setup_static_logger();
    let state = state_over(&InMemorySpinWheelApi::new());

    let panel = new_editor_handler(State(state.clone())).await.0;

    assert!(panel.contains("Create New Wheel"));
    assert!(panel.contains("wheel-editor"));
    assert_eq!(state.service.sessions().len().await, 1);
}

#[tokio::test]
async fn test_rename_re_renders_editor() {
    setup_static_logger();
    let state = state_over(&InMemorySpinWheelApi::new());
    let session = state.service.open_new_editor().await;

    let panel = rename_wheel_handler(
        State(state),
        Path(session),
        Form(NameForm {
            name: String::from("Diwali"),
        }),
    )
    .await
    .0;

    assert!(panel.contains(r#"value="Diwali""#));
}

#[tokio::test]
async fn test_unknown_section_field_is_reported() {
    setup_static_logger();
    let state = state_over(&InMemorySpinWheelApi::new());
    let session = state.service.open_new_editor().await;

    let panel = update_section_field_handler(
        State(state),
        Path((session, 0, String::from("weight"))),
        Form(FieldForm {
            value: String::from("10"),
        }),
    )
    .await
    .0;

    assert!(panel.contains("wheel-editor"));
    assert!(panel.contains("is-danger"));
    assert!(panel.contains("weight"));
}

#[tokio::test]
async fn test_invalid_submit_stays_on_editor() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::new();
    let state = state_over(&api);
    let session = state.service.open_new_editor().await;

    let response = submit_wheel_handler(State(state), Path(session)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("HX-Redirect").is_none());
    let body = body_text(response).await;
    assert!(body.contains("Please fix the errors in the form."));
    assert!(body.contains("Wheel Name is required."));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_valid_submit_redirects_to_dashboard() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::new();
    let state = state_over(&api);
    let session = state.service.open_new_editor().await;
    for action in diwali_actions() {
        state
            .service
            .apply(&session, action)
            .await
            .expect("session open");
    }

    let response = submit_wheel_handler(State(state), Path(session)).await;

    assert_eq!(
        response
            .headers()
            .get("HX-Redirect")
            .and_then(|v| v.to_str().ok()),
        Some("/admin")
    );
    assert_eq!(api.wheels().len(), 1);
}

#[tokio::test]
async fn test_delete_returns_refreshed_panel() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![
        wheel("wheel-a", "Summer", true),
        wheel("wheel-b", "Winter", false),
    ]);
    let state = state_over(&api);

    let panel = delete_wheel_handler(State(state), Path(String::from("wheel-a")))
        .await
        .0;

    assert!(panel.contains("wheels-panel"));
    assert!(!panel.contains("Summer"));
    assert!(panel.contains("Spin wheel deleted successfully"));
}

#[tokio::test]
async fn test_spin_rejects_non_numeric_stake() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![wheel("wheel-a", "Summer", true)]);
    let state = state_over(&api);

    let result = test_spin_handler(
        State(state),
        Path(String::from("wheel-a")),
        Form(TestSpinForm {
            tokens_to_use: String::from("lots"),
        }),
    )
    .await
    .0;

    assert!(result.contains("whole number"));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_records_fragment_filters_by_range() {
    setup_static_logger();
    let api = InMemorySpinWheelApi::with_wheels(vec![wheel("wheel-a", "Summer", true)]);
    let state = state_over(&api);
    state.service.test_spin("wheel-a", 1).await.expect("spun");

    let rows = records_fragment(
        State(state),
        Query(RecordsQuery {
            search: String::from("summer"),
            wheel: String::new(),
            range: String::from("7days"),
        }),
    )
    .await
    .0;

    assert!(rows.contains("Summer"));
    assert!(rows.contains("Admin test spin"));
}

#[tokio::test]
async fn test_health_check_without_background_threads() {
    setup_static_logger();
    let state = state_over(&InMemorySpinWheelApi::new());

    let status = health(State(state)).await.expect("healthy");

    assert_eq!(status, StatusCode::OK);
}
