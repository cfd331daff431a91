//! API endpoints
//!
//! Este módulo contém os endpoints da API.

pub mod inutilizacao;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::state::AppState;

/// Criar o router principal da API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", inutilizacao::create_inutilizacao_router())
}

/// GET /health - Health check do serviço
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "sefaz-inutilizacao",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
