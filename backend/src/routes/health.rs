//! Health check endpoints
//!
//! - /health - process is up
//! - /health/live - liveness check
//! - /health/ready - database reachable and upload directory usable

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const SERVICE_NAME: &str = "bookshelf";

#[derive(Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<ReadinessChecks>,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub database: CheckStatus,
    pub uploads: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                healthy: true,
                message: None,
            },
            Err(e) => Self {
                healthy: false,
                message: Some(e.to_string()),
            },
        }
    }
}

fn response(status: &'static str, checks: Option<ReadinessChecks>) -> HealthResponse {
    HealthResponse {
        service: SERVICE_NAME,
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks,
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(response("healthy", None))
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(response("alive", None))
}

/// Returns 503 when a dependency is unavailable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = CheckStatus::from_result(db::health_check(state.db()).await);
    let uploads =
        CheckStatus::from_result(tokio::fs::create_dir_all(&state.config().uploads.dir).await);

    if database.healthy && uploads.healthy {
        Ok(Json(response(
            "ready",
            Some(ReadinessChecks { database, uploads }),
        )))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(response(
                "not_ready",
                Some(ReadinessChecks { database, uploads }),
            )),
        ))
    }
}
