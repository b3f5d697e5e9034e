//! Render pipeline — template → LaTeX → PDF bytes.
//!
//! The scratch directory is a `TempDir` owned by `render_pdf`; it is removed when
//! the function returns, whichever path it returns by.

use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::render::compiler::DocumentCompiler;
use crate::render::template::{compose, load_template, TemplateError};

const SCRATCH_PREFIX: &str = "resume-";

/// Loads the template and composes the LaTeX document. No compiler involved.
pub async fn compose_document(
    template_path: &Path,
    data: &ResumeData,
) -> Result<String, TemplateError> {
    let template = load_template(template_path).await?;
    compose(&template, data)
}

/// Composes the document, compiles it in a fresh scratch directory under
/// `scratch_root`, and returns the PDF bytes.
pub async fn render_pdf(
    template_path: &Path,
    data: &ResumeData,
    compiler: &dyn DocumentCompiler,
    scratch_root: &Path,
) -> Result<Bytes, AppError> {
    let latex = compose_document(template_path, data).await?;
    info!("Generated LaTeX content ({} characters)", latex.len());

    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(scratch_root)
        .with_context(|| {
            format!(
                "Failed to create scratch directory under {}",
                scratch_root.display()
            )
        })?;
    info!("Using temporary directory: {}", scratch.path().display());

    let artifact = compiler.compile(&latex, scratch.path()).await?;

    let pdf = tokio::fs::read(&artifact)
        .await
        .with_context(|| format!("Failed to read compiled PDF at {}", artifact.display()))?;

    Ok(Bytes::from(pdf))
}
