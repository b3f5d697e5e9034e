use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::render::compiler::CompileError;
use crate::render::template::TemplateError;

const COMPILE_FAILURE_HINT: &str =
    "Unable to compile LaTeX to PDF. Please check your LaTeX installation.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No JSON data provided")]
    NoJsonData,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("PDF generation failed: {0}")]
    Compilation(#[from] CompileError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NoJsonData => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No JSON data provided" }),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
            AppError::Compilation(e) => {
                tracing::error!("PDF generation failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "PDF generation failed",
                        "details": e.to_string(),
                        "message": COMPILE_FAILURE_HINT
                    }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Unexpected error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
