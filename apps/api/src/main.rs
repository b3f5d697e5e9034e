mod config;
mod errors;
mod models;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::{DocumentCompiler, LatexCompiler};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LaTeX compiler chain
    let compiler = LatexCompiler::new(
        config.compilers.clone(),
        config.compile_timeout,
        config.probe_timeout,
    );
    info!(
        "Compiler chain: {} (timeout {:?})",
        compiler
            .candidates()
            .iter()
            .map(|c| c.program.as_str())
            .collect::<Vec<_>>()
            .join(" -> "),
        config.compile_timeout
    );
    info!("Resume template: {}", config.template_path.display());

    if compiler.probe().await.available {
        info!("LaTeX is available - PDF generation ready");
    } else {
        warn!("LaTeX not found - PDF generation will fail");
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        compiler: Arc::new(compiler),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
