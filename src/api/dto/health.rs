//! Response body of `GET /health`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every check passed, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

/// Outcome of one dependency check.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: &'static str,
    pub latency_ms: u128,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl CheckStatus {
    pub fn ok(latency_ms: u128) -> Self {
        Self {
            status: "ok",
            latency_ms,
            message: None,
        }
    }

    pub fn failed(latency_ms: u128, message: &'static str) -> Self {
        Self {
            status: "error",
            latency_ms,
            message: Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
