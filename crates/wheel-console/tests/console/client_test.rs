use axum::{
    extract::{Path, Query},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use reqwest_middleware::reqwest::Url;
use serde_json::{json, Value};
use std::{collections::HashMap, time::Duration};
use tokio::net::TcpListener;
use wheel_console::{build_reqwest_client, ApiError, SpinWheelApi, SpinWheelClient};
use wheel_core::{RewardKind, WheelPayload, GENERIC_FAILURE};

use crate::helpers::setup_static_logger;

const TOKEN: &str = "test-token";

async fn list_wheels(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": false, "message": "Unauthorized"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "status": true,
            "data": [{"_id": "w1", "name": "Summer", "sections": [], "isActive": true}]
        })),
    )
}

async fn get_or_spin(
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if let Some(tokens) = query.get("tokensToUse") {
        return (
            StatusCode::OK,
            Json(json!({
                "status": true,
                "data": {"segment": {
                    "title": format!("{} staked on {}", tokens, id),
                    "type": "token",
                    "value": 5,
                    "color": "#FF5733"
                }}
            })),
        );
    }
    match id.as_str() {
        "missing" => (StatusCode::NOT_FOUND, Json(Value::Null)),
        "archived" => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": false, "message": "Spin wheel was archived"})),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({"status": true, "data": {"_id": id, "name": "Summer"}})),
        ),
    }
}

async fn create_wheel() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": false, "message": "Wheel name already exists", "data": {}})),
    )
}

async fn delete_wheel() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

/// Local stand-in for the commerce backend, answering under `/api/admin`
async fn spawn_backend() -> Url {
    let router = Router::new()
        .route("/api/admin/spin-wheel", get(list_wheels).post(create_wheel))
        .route(
            "/api/admin/spin-wheel/{id}",
            get(get_or_spin).delete(delete_wheel),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{}/api/admin", address)).unwrap()
}

fn client(base_url: &Url, token: Option<&str>) -> SpinWheelClient {
    let http = build_reqwest_client(Duration::from_secs(5)).unwrap();
    SpinWheelClient::new(http, base_url, token.map(String::from))
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    setup_static_logger();
    let base_url = spawn_backend().await;

    let wheels = client(&base_url, Some(TOKEN)).list_wheels().await.unwrap();
    assert_eq!(wheels.len(), 1);
    assert_eq!(wheels[0].name, "Summer");

    let err = client(&base_url, None).list_wheels().await.unwrap_err();
    assert_eq!(err.user_message(), "Unauthorized");
}

#[tokio::test]
async fn test_error_status_keeps_server_message() {
    setup_static_logger();
    let base_url = spawn_backend().await;
    let payload = WheelPayload {
        name: String::from("Summer"),
        sections: vec![],
        is_active: false,
    };

    let err = client(&base_url, Some(TOKEN))
        .create_wheel(payload)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Rejected(_)));
    assert_eq!(err.user_message(), "Wheel name already exists");
}

#[tokio::test]
async fn test_not_found_without_message() {
    setup_static_logger();
    let base_url = spawn_backend().await;
    let api = client(&base_url, Some(TOKEN));

    let missing = api.get_wheel("missing").await.unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));

    let archived = api.get_wheel("archived").await.unwrap_err();
    assert!(matches!(archived, ApiError::Rejected(_)));
    assert_eq!(archived.user_message(), "Spin wheel was archived");

    let found = api.get_wheel("w7").await.unwrap();
    assert_eq!(found.id, "w7");
}

#[tokio::test]
async fn test_plain_text_failure_uses_generic_message() {
    setup_static_logger();
    let base_url = spawn_backend().await;

    let err = client(&base_url, Some(TOKEN))
        .delete_wheel("w1")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Request(_)));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[tokio::test]
async fn test_spin_sends_stake_as_query() {
    setup_static_logger();
    let base_url = spawn_backend().await;

    let won = client(&base_url, Some(TOKEN)).spin("w1", 7).await.unwrap();

    assert_eq!(won.title, "7 staked on w1");
    assert_eq!(won.kind, Some(RewardKind::Token));
    assert_eq!(won.value, Some(5.0));
}
