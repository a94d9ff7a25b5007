use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::dal::DalError;

pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing client input. Never touches storage.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Dal(#[from] DalError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Dal(DalError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Dal(DalError::Duplicate { .. }) => StatusCode::CONFLICT,
            Self::Dal(DalError::Internal(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        let message = if code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "request failed");
            INTERNAL_MESSAGE.to_owned()
        } else {
            self.to_string()
        };

        tracing::info!(code = code.as_u16(), err = %message, "sent response to client");
        (code, Json(json!({ "error": message }))).into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::Validation(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Validation(err.to_owned())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(error = %err.body_text(), "rejected request body");
        Self::Validation("Invalid JSON body".to_owned())
    }
}

/// A JSON payload with its status code, logged on the way out.
pub struct Reply<T>(pub StatusCode, pub T);

impl<T> Reply<T> {
    pub fn ok(payload: T) -> Self {
        Self(StatusCode::OK, payload)
    }

    pub fn created(payload: T) -> Self {
        Self(StatusCode::CREATED, payload)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let Reply(code, payload) = self;
        match serde_json::to_value(&payload) {
            Ok(body) => {
                tracing::info!(code = code.as_u16(), payload = %body, "sent response to caller");
                (code, Json(body)).into_response()
            }
            Err(e) => AppError::Internal(anyhow::Error::new(e).context("serializing response"))
                .into_response(),
        }
    }
}
