use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use leavewise_core::PolicyStore;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    policy: Arc<PolicyStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub policy_document: HealthCheck,
    pub checked_at: String,
}

pub fn router(policy: Arc<PolicyStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { policy })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let policy_document = policy_check(&state.policy);
    let ready = policy_document.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "leavewise-server runtime initialized".to_string(),
        },
        policy_document,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn policy_check(policy: &PolicyStore) -> HealthCheck {
    match policy.locate() {
        Ok(path) => HealthCheck {
            status: "ready",
            detail: format!("policy document found at `{}`", path.display()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("policy document check failed: {error}") }
        }
    }
}
