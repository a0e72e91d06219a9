//! Liveness check for load balancers and orchestrators.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// `GET /health`
///
/// Public and unauthenticated. Answers `200` when the database responds to
/// `SELECT 1`, `503` otherwise. The body has the same shape either way:
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": { "database": { "status": "ok", "latency_ms": 1 } }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state).await;
    let healthy = database.is_ok();

    let body = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks { database },
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(body))
}

async fn check_database(state: &AppState) -> CheckStatus {
    let started = Instant::now();
    let result = sqlx::query("SELECT 1").execute(state.pool.as_ref()).await;
    let elapsed = started.elapsed().as_millis();

    match result {
        Ok(_) => CheckStatus::ok(elapsed),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unreachable");
            CheckStatus::failed(elapsed, "Database unreachable")
        }
    }
}
