use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Reports whether the designated LaTeX compiler can be launched.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let probe = state.compiler.probe().await;

    let message = if probe.available {
        "LaTeX is available"
    } else {
        "LaTeX not found - PDF generation may fail"
    };

    Json(json!({
        "status": "ok",
        "latex_available": probe.available,
        "message": message,
        "compiler": probe.compiler,
        "version": probe.version,
        "checked_at": Utc::now().to_rfc3339(),
        "service": env!("CARGO_PKG_NAME"),
    }))
}
