use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use log::{error, info, warn};
use maud::{html, Markup};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;
use wheel_core::{DateRange, EditorAction, RecordFilter, SectionField, SectionUpdate, Wheel, WheelEditor};

use crate::{
    domain::Error,
    startup::AppState,
    templates::{
        admin::{
            admin_dashboard, editor_panel, record_rows, spin_error, spin_result, wheel_detail,
            wheel_rows, wheels_panel, WheelRow,
        },
        fragments::{notification, notification_oob, NotificationKind},
        layouts::admin::{admin_base, AdminPageConfig},
    },
};

const HX_REDIRECT: &str = "HX-Redirect";

/// Tokens staked by a test spin when the form leaves it blank
const DEFAULT_TEST_STAKE: u32 = 1;

async fn wheel_rows_for(state: &AppState, wheels: Vec<Wheel>) -> Vec<WheelRow> {
    let mut rows = Vec::with_capacity(wheels.len());
    for wheel in wheels {
        let projected = state.service.is_projected(&wheel.id).await;
        rows.push(WheelRow { wheel, projected });
    }
    rows
}

fn redirect_to_dashboard() -> Response {
    (StatusCode::OK, [(HX_REDIRECT, "/admin")]).into_response()
}

fn error_notice(context: &str, e: &Error) -> Markup {
    error!("{}: {}", context, e);
    notification(NotificationKind::Danger, &e.user_message())
}

/// Admin dashboard page
pub async fn admin_page_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let config = AdminPageConfig {
        title: &state.title,
    };

    let overview = state.service.overview().await;
    let filter = RecordFilter::default();
    let records: Vec<_> = filter
        .apply(&overview.records, OffsetDateTime::now_utc())
        .into_iter()
        .cloned()
        .collect();
    let rows = wheel_rows_for(&state, overview.wheels).await;

    let content = admin_dashboard(&rows, &records, &filter, overview.warning.as_deref());
    Html(admin_base(&config, content).into_string())
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

/// Wheel table rows matching the search box
pub async fn wheel_rows_fragment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Html<String> {
    let wheels = state.service.search_wheels(&query.search).await;
    let rows = wheel_rows_for(&state, wheels).await;
    Html(wheel_rows(&rows).into_string())
}

pub async fn wheel_detail_fragment(
    State(state): State<Arc<AppState>>,
    Path(wheel_id): Path<String>,
) -> Html<String> {
    let markup = match state.service.get_wheel(&wheel_id).await {
        Ok(wheel) => wheel_detail(&wheel),
        Err(e) => error_notice("failed to load spin wheel", &e),
    };
    Html(markup.into_string())
}

#[derive(Debug, Deserialize)]
pub struct TestSpinForm {
    #[serde(default)]
    pub tokens_to_use: String,
}

pub async fn test_spin_handler(
    State(state): State<Arc<AppState>>,
    Path(wheel_id): Path<String>,
    Form(form): Form<TestSpinForm>,
) -> Html<String> {
    let raw = form.tokens_to_use.trim();
    let tokens = if raw.is_empty() {
        DEFAULT_TEST_STAKE
    } else {
        match raw.parse::<u32>() {
            Ok(tokens) => tokens,
            Err(_) => {
                return Html(spin_error("tokens to use must be a whole number").into_string());
            }
        }
    };

    let markup = match state.service.test_spin(&wheel_id, tokens).await {
        Ok(won) => {
            info!("test spin of {} won {}", wheel_id, won.title);
            spin_result(&won)
        }
        Err(e) => {
            error!("test spin of {} failed: {}", wheel_id, e);
            spin_error(&e.user_message())
        }
    };
    Html(markup.into_string())
}

/// Delete a wheel and answer with the refreshed wheel table
pub async fn delete_wheel_handler(
    State(state): State<Arc<AppState>>,
    Path(wheel_id): Path<String>,
) -> Html<String> {
    let notice = match state.service.delete_wheel(&wheel_id).await {
        Ok(()) => notification_oob(NotificationKind::Success, "Spin wheel deleted successfully"),
        Err(e) => {
            error!("failed to delete spin wheel {}: {}", wheel_id, e);
            notification_oob(NotificationKind::Danger, &e.user_message())
        }
    };

    let wheels = state.service.search_wheels("").await;
    let rows = wheel_rows_for(&state, wheels).await;
    Html(
        html! {
            (wheels_panel(&rows, ""))
            (notice)
        }
        .into_string(),
    )
}

pub async fn new_editor_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let session = state.service.open_new_editor().await;
    render_editor(&state, &session).await
}

pub async fn edit_wheel_handler(
    State(state): State<Arc<AppState>>,
    Path(wheel_id): Path<String>,
) -> Html<String> {
    match state.service.open_editor_for(&wheel_id).await {
        Ok(session) => render_editor(&state, &session).await,
        Err(e) => Html(error_notice("failed to open spin wheel for editing", &e).into_string()),
    }
}

async fn render_editor(state: &AppState, session: &Uuid) -> Html<String> {
    editor_response(session, state.service.editor(session).await)
}

fn editor_response(session: &Uuid, editor: Result<WheelEditor, Error>) -> Html<String> {
    let markup = match editor {
        Ok(editor) => editor_panel(session, &editor),
        Err(e) => {
            warn!("editor session {}: {}", session, e);
            notification(NotificationKind::Danger, &e.user_message())
        }
    };
    Html(markup.into_string())
}

async fn apply_action(state: &AppState, session: Uuid, action: EditorAction) -> Html<String> {
    editor_response(&session, state.service.apply(&session, action).await)
}

#[derive(Debug, Deserialize)]
pub struct NameForm {
    #[serde(default)]
    pub name: String,
}

pub async fn rename_wheel_handler(
    State(state): State<Arc<AppState>>,
    Path(session): Path<Uuid>,
    Form(form): Form<NameForm>,
) -> Html<String> {
    apply_action(&state, session, EditorAction::Rename(form.name)).await
}

#[derive(Debug, Deserialize)]
pub struct ActiveForm {
    /// Present only when the checkbox is ticked
    pub is_active: Option<String>,
}

pub async fn set_active_handler(
    State(state): State<Arc<AppState>>,
    Path(session): Path<Uuid>,
    Form(form): Form<ActiveForm>,
) -> Html<String> {
    apply_action(&state, session, EditorAction::SetActive(form.is_active.is_some())).await
}

pub async fn add_section_handler(
    State(state): State<Arc<AppState>>,
    Path(session): Path<Uuid>,
) -> Html<String> {
    apply_action(&state, session, EditorAction::AddSection).await
}

pub async fn remove_section_handler(
    State(state): State<Arc<AppState>>,
    Path((session, index)): Path<(Uuid, usize)>,
) -> Html<String> {
    apply_action(&state, session, EditorAction::RemoveSection(index)).await
}

#[derive(Debug, Deserialize)]
pub struct FieldForm {
    #[serde(default)]
    pub value: String,
}

pub async fn update_section_field_handler(
    State(state): State<Arc<AppState>>,
    Path((session, index, field)): Path<(Uuid, usize, String)>,
    Form(form): Form<FieldForm>,
) -> Html<String> {
    let field = match SectionField::from_str(&field) {
        Ok(field) => field,
        Err(e) => {
            let mut page = render_editor(&state, &session).await.0;
            page.push_str(&notification_oob(NotificationKind::Danger, &e.to_string()).into_string());
            return Html(page);
        }
    };

    let update = SectionUpdate::parse(field, &form.value);
    apply_action(&state, session, EditorAction::UpdateField(index, update)).await
}

/// Submit the draft; a saved wheel sends the browser back to the dashboard
pub async fn submit_wheel_handler(
    State(state): State<Arc<AppState>>,
    Path(session): Path<Uuid>,
) -> Response {
    match state.service.submit(&session).await {
        Ok(wheel) => {
            info!(
                "spin wheel saved: {}",
                wheel.map(|w| w.id).unwrap_or_else(|| String::from("(no body)"))
            );
            redirect_to_dashboard()
        }
        Err(e @ Error::Rejected(_)) => {
            info!("spin wheel submission refused: {}", e);
            render_editor(&state, &session).await.into_response()
        }
        Err(e) => {
            error!("spin wheel submission failed: {}", e);
            render_editor(&state, &session).await.into_response()
        }
    }
}

pub async fn discard_editor_handler(
    State(state): State<Arc<AppState>>,
    Path(session): Path<Uuid>,
) -> Response {
    state.service.discard(&session).await;
    redirect_to_dashboard()
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub wheel: String,
    #[serde(default)]
    pub range: String,
}

impl From<RecordsQuery> for RecordFilter {
    fn from(query: RecordsQuery) -> Self {
        RecordFilter {
            search: query.search,
            wheel: Some(query.wheel).filter(|w| !w.is_empty()),
            range: DateRange::parse(&query.range),
        }
    }
}

/// Spin record rows matching the filters
pub async fn records_fragment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
) -> Html<String> {
    let filter = RecordFilter::from(query);
    let markup = match state
        .service
        .spin_records(&filter, OffsetDateTime::now_utc())
        .await
    {
        Ok(records) => record_rows(&records),
        Err(e) => html! {
            tr {
                td colspan="6" { (error_notice("failed to load spin records", &e)) }
            }
        },
    };
    Html(markup.into_string())
}
