use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qabot::BotError;
use qabot::template::TemplateError;
use thiserror::Error;
use tracing::error;

use crate::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Bind { .. } | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        }
        ApiResponse::error(self.error_code(), self.to_string(), vec![])
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Maps orchestrator failures onto status codes: configuration and template
/// problems are ours (500), collaborator failures are upstream (502).
impl From<BotError> for AppError {
    fn from(err: BotError) -> Self {
        let (status, code) = match &err {
            BotError::Retrieval(_) => (StatusCode::BAD_GATEWAY, "RETRIEVAL_ERROR"),
            BotError::Llm(e) if !e.is_config() => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            BotError::Template(TemplateError::Exec(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR")
            }
            BotError::Config(_) | BotError::Template(TemplateError::Parse(_)) | BotError::Llm(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
        };
        AppError::Http {
            status,
            code,
            message: err.to_string(),
        }
    }
}
