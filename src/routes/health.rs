//! Service banner and health check.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Banner returned at the API root.
#[derive(Debug, Serialize)]
pub struct Banner {
    pub status: &'static str,
    pub message: &'static str,
}

/// Health check detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub api: String,
    pub database: String,
}

/// GET /: service banner.
pub async fn root() -> Json<Banner> {
    Json(Banner {
        status: "online",
        message: "DomainRecon API",
    })
}

/// GET /health: reports database connectivity inline, never fails.
pub async fn check(State(state): State<AppState>) -> Json<HealthStatus> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            format!("error: {e}")
        }
    };

    Json(HealthStatus {
        api: "healthy".to_string(),
        database: db_status,
    })
}
