use std::sync::Arc;

use crate::config::Config;
use crate::render::compiler::DocumentCompiler;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable compiler backend. Default: `LatexCompiler` over `config.compilers`.
    pub compiler: Arc<dyn DocumentCompiler>,
}
