use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::render::compiler::{default_candidates, CompilerCandidate};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded from environment variables.
/// Every variable is optional; bad values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub template_path: PathBuf,
    /// Compilers tried in order for each render.
    pub compilers: Vec<CompilerCandidate>,
    pub compile_timeout: Duration,
    pub probe_timeout: Duration,
    /// Parent directory for per-request scratch directories.
    pub scratch_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let compilers = match std::env::var("LATEX_COMPILERS") {
            Ok(list) => parse_compiler_list(&list)?,
            Err(_) => default_candidates(),
        };

        Ok(Config {
            port: env_or("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            template_path: std::env::var("RESUME_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_template_path()),
            compilers,
            compile_timeout: Duration::from_secs(env_or(
                "COMPILE_TIMEOUT_SECS",
                DEFAULT_COMPILE_TIMEOUT_SECS,
            )?),
            probe_timeout: Duration::from_secs(env_or(
                "HEALTH_PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?),
            scratch_root: std::env::var("SCRATCH_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
        })
    }
}

/// The template shipped with the crate.
pub fn default_template_path() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/templates/resume_template.tex"
    ))
}

/// Parses `pdflatex, xelatex` into TeX engine candidates, keeping order.
fn parse_compiler_list(list: &str) -> Result<Vec<CompilerCandidate>> {
    let candidates: Vec<_> = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(CompilerCandidate::tex_engine)
        .collect();

    if candidates.is_empty() {
        bail!("LATEX_COMPILERS must name at least one compiler");
    }
    Ok(candidates)
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
