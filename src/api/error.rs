use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors a handler can answer with. Every variant renders as
/// `{"message": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Plan not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    /// Store or other unexpected failure. Carries only the client-facing
    /// message; the cause is logged where the error is created.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

/// Log an internal error and return a sanitized error for the client.
///
/// The full cause chain is logged server-side; clients only see `message`.
pub fn internal_error(message: &'static str) -> impl Fn(anyhow::Error) -> ApiError {
    move |e| {
        tracing::error!("{}: {:#}", message, e);
        ApiError::Internal(message)
    }
}
