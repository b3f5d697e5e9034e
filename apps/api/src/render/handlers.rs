//! Axum route handlers for the Render API.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde_json::Value;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::render::pipeline::{compose_document, render_pdf};
use crate::state::AppState;

/// Decodes a request body into `ResumeData`.
///
/// An absent body, `null`, or any other falsy JSON value (`{}`, `[]`, `""`, `0`,
/// `false`) counts as "no data".
pub fn parse_resume_payload(body: &[u8]) -> Result<ResumeData, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::NoJsonData);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON: {e}")))?;

    let is_falsy = match &value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    };
    if is_falsy {
        return Err(AppError::NoJsonData);
    }
    if !value.is_object() {
        return Err(AppError::Validation(
            "Resume data must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid resume data: {e}")))
}

/// POST /api/generate-resume
///
/// Compiles the resume and returns the PDF inline.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let data = parse_resume_payload(&body)?;

    let span = info_span!("render", render_id = %Uuid::new_v4());
    let pdf = async {
        info!("Generating resume PDF...");
        render_pdf(
            &state.config.template_path,
            &data,
            state.compiler.as_ref(),
            &state.config.scratch_root,
        )
        .await
    }
    .instrument(span)
    .await?;

    info!("Successfully generated PDF ({} bytes)", pdf.len());

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("inline; filename=resume.pdf"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(pdf.len())),
    ];
    Ok((headers, pdf).into_response())
}

/// POST /api/preview-latex
///
/// Returns the composed LaTeX source as plain text. Never runs a compiler.
pub async fn handle_preview_latex(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<String, AppError> {
    let data = parse_resume_payload(&body)?;
    let latex = compose_document(&state.config.template_path, &data).await?;
    Ok(latex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_no_data() {
        assert!(matches!(parse_resume_payload(b""), Err(AppError::NoJsonData)));
        assert!(matches!(parse_resume_payload(b"  \n"), Err(AppError::NoJsonData)));
    }

    #[test]
    fn test_falsy_json_is_no_data() {
        let bodies: [&[u8]; 6] = [b"null", b"{}", b"[]", b"\"\"", b"0", b"false"];
        for body in bodies {
            assert!(
                matches!(parse_resume_payload(body), Err(AppError::NoJsonData)),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        match parse_resume_payload(b"{\"profile\": ") {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("Invalid JSON")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_is_validation_error() {
        assert!(matches!(
            parse_resume_payload(b"[1, 2]"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_wrongly_typed_field_is_validation_error() {
        match parse_resume_payload(br#"{"experience": "lots"}"#) {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("Invalid resume data")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_valid_payload_decodes() {
        let data = parse_resume_payload(br#"{"profile": {"name": "Ada"}}"#).unwrap();
        assert_eq!(data.profile.name, "Ada");
    }
}
