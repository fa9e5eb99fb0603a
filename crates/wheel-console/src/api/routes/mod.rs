mod pages;
mod system;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub use pages::*;
pub use system::*;

use crate::domain::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::BadRequest(_) | Error::Rejected(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::Backend(_) | Error::Deactivation { .. } => {
                (StatusCode::BAD_GATEWAY, self.user_message())
            }
            Error::Thread(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("internal server error"),
            ),
        };
        let body = Json(json!({
            "error": error_message,
        }));
        (status, body).into_response()
    }
}
