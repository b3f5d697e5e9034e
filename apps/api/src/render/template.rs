//! Template Compositor — fills the LaTeX template's `{{TOKEN}}` placeholders.
//!
//! The template is scanned once. Each recognised token is replaced by its value
//! and the value is written straight to the output, never rescanned, so user text
//! that happens to look like a placeholder stays literal.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::ResumeData;
use crate::render::escape::escape_latex;
use crate::render::sections::{
    render_achievements, render_education, render_experience, render_leadership, render_projects,
};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Resume template not found at {path}: {source}")]
    Missing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template left unresolved placeholders: {}", format_tokens(.0))]
    Unresolved(Vec<String>),
}

fn format_tokens(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("{{{{{n}}}}}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every placeholder the compositor knows how to fill.
pub const PLACEHOLDERS: [&str; 15] = [
    "NAME",
    "PHONE",
    "EMAIL",
    "LINKEDIN",
    "GITHUB",
    "WEBSITE",
    "SUMMARY",
    "LANGUAGES",
    "TECHNOLOGIES",
    "PROFESSIONAL",
    "EDUCATION",
    "EXPERIENCE",
    "PROJECTS",
    "LEADERSHIP",
    "ACHIEVEMENTS",
];

/// Reads the template from disk. A missing template is fatal for the request.
pub async fn load_template(path: &Path) -> Result<String, TemplateError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TemplateError::Missing {
            path: path.display().to_string(),
            source,
        })
}

/// Builds the token → replacement table. Scalars are escaped, sections rendered.
fn substitutions(data: &ResumeData) -> HashMap<&'static str, String> {
    let profile = &data.profile;
    let skills = &data.skills;

    HashMap::from([
        ("NAME", escape_latex(&profile.name)),
        ("PHONE", escape_latex(&profile.phone)),
        ("EMAIL", escape_latex(&profile.email)),
        ("LINKEDIN", escape_latex(&profile.linkedin)),
        ("GITHUB", escape_latex(&profile.github)),
        ("WEBSITE", escape_latex(&profile.website)),
        ("SUMMARY", escape_latex(&profile.summary)),
        ("LANGUAGES", escape_latex(&skills.languages)),
        ("TECHNOLOGIES", escape_latex(&skills.technologies)),
        ("PROFESSIONAL", escape_latex(&skills.professional)),
        ("EDUCATION", render_education(&data.education)),
        ("EXPERIENCE", render_experience(&data.experience)),
        ("PROJECTS", render_projects(&data.projects)),
        ("LEADERSHIP", render_leadership(&data.leadership)),
        ("ACHIEVEMENTS", render_achievements(&data.achievements)),
    ])
}

/// Returns the token name if `rest` starts with `{{NAME}}`, plus the token's byte length.
fn match_token(rest: &str) -> Option<(&str, usize)> {
    let body = rest.strip_prefix("{{")?;
    let end = body.find("}}")?;
    let name = &body[..end];
    let is_token = !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    is_token.then_some((name, end + 4))
}

/// Composes the final LaTeX source from `template` and `data`.
///
/// Fails with `TemplateError::Unresolved` if the template contains tokens the
/// compositor does not know. Known tokens missing from the template, or present
/// more than once, are logged but not fatal.
pub fn compose(template: &str, data: &ResumeData) -> Result<String, TemplateError> {
    let values = substitutions(data);
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut out = String::with_capacity(template.len() * 2);

    let mut rest = template;
    while let Some(idx) = rest.find("{{") {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        match match_token(rest) {
            Some((name, len)) => {
                match values.get(name) {
                    Some(value) => {
                        *seen.entry(name).or_default() += 1;
                        out.push_str(value);
                    }
                    None => out.push_str(&rest[..len]),
                }
                rest = &rest[len..];
            }
            None => {
                // Plain LaTeX brace, e.g. `{{{EMAIL}}}`: emit one and rescan.
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    for name in PLACEHOLDERS {
        match seen.get(name).copied().unwrap_or(0) {
            0 => warn!("Template has no {{{{{name}}}}} placeholder"),
            1 => {}
            n => warn!("Template placeholder {{{{{name}}}}} appears {n} times"),
        }
    }

    let unresolved = residual_placeholders(&out);
    if !unresolved.is_empty() {
        return Err(TemplateError::Unresolved(unresolved));
    }

    debug!("Composed LaTeX document ({} characters)", out.len());
    Ok(out)
}

/// Lists the names of any `{{TOKEN}}` placeholders still present in `text`.
pub fn residual_placeholders(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find("{{") {
        rest = &rest[idx..];
        match match_token(rest) {
            Some((name, len)) => {
                found.push(name.to_string());
                rest = &rest[len..];
            }
            None => rest = &rest[1..],
        }
    }
    found
}
