//! Web surface for the leave assistant.
//!
//! HTML Endpoints:
//! - `GET  /`                        - assistant page (HTML)
//!
//! JSON API Endpoints:
//! - `POST /api/v1/leave/search`     - resolve a query to candidate employees
//! - `POST /api/v1/leave/resolve`    - run the full resolution for one chosen id

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::{error, info};
use uuid::Uuid;

use leavewise_agent::directory::{resolve_employee_match, Directory};
use leavewise_agent::extract::NameExtractor;
use leavewise_agent::runtime::AgentRuntime;
use leavewise_core::{EmployeeId, ResolutionError, ResolutionRequest};

#[derive(Clone)]
pub struct PortalState {
    runtime: Arc<AgentRuntime>,
    directory: Arc<dyn Directory>,
    names: Arc<NameExtractor>,
    templates: Arc<Tera>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub employee_name: String,
    pub employee_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub employee_id: i64,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub answer: String,
    pub iterations: usize,
    pub gave_up: bool,
}

#[derive(Debug, Serialize)]
pub struct PortalError {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn init_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    if let Err(template_error) = tera.add_raw_template(
        "assistant.html.tera",
        include_str!("../../../templates/portal/assistant.html.tera"),
    ) {
        error!(error = %template_error, "failed to load embedded portal template");
    }
    Arc::new(tera)
}

pub fn router(
    runtime: Arc<AgentRuntime>,
    directory: Arc<dyn Directory>,
    names: Arc<NameExtractor>,
) -> Router {
    let state = PortalState { runtime, directory, names, templates: init_templates() };

    Router::new()
        .route("/", get(index))
        .route("/api/v1/leave/search", post(search))
        .route("/api/v1/leave/resolve", post(resolve))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<PortalState>) -> Html<String> {
    let mut context = Context::new();
    context.insert("title", "Leavewise");
    match state.templates.render("assistant.html.tera", &context) {
        Ok(html) => Html(html),
        Err(template_error) => {
            error!(error = %template_error, "portal template render failed");
            Html("<h1>Leavewise</h1><p>The assistant page is temporarily unavailable.</p>".to_string())
        }
    }
}

pub async fn search(
    State(state): State<PortalState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<PortalError>)> {
    let correlation_id = Uuid::new_v4().simple().to_string();

    if payload.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(PortalError { error: "Enter a leave request first.".to_string() }),
        ));
    }

    match resolve_employee_match(&state.names, state.directory.as_ref(), &payload.query).await {
        Ok(found) => {
            info!(
                event_name = "portal.search.matched",
                correlation_id = %correlation_id,
                employee_name = %found.name,
                candidates = found.candidate_ids.len(),
                "directory search matched"
            );
            Ok(Json(SearchResponse {
                employee_name: found.name,
                employee_ids: found.candidate_ids.iter().map(|id| id.0).collect(),
            }))
        }
        Err(resolution_error) => Err(error_response(resolution_error, &correlation_id, "search")),
    }
}

pub async fn resolve(
    State(state): State<PortalState>,
    Json(payload): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, (StatusCode, Json<PortalError>)> {
    let correlation_id = Uuid::new_v4().simple().to_string();

    if payload.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(PortalError { error: "Enter a leave request first.".to_string() }),
        ));
    }

    let request = ResolutionRequest::new(EmployeeId(payload.employee_id), payload.query);
    match state.runtime.resolve(&request).await {
        Ok(resolution) => {
            info!(
                event_name = "portal.resolve.answered",
                correlation_id = %correlation_id,
                employee_id = %request.employee_id,
                iterations = resolution.iterations,
                gave_up = resolution.gave_up,
                "resolution answered"
            );
            Ok(Json(ResolveResponse {
                answer: resolution.answer,
                iterations: resolution.iterations,
                gave_up: resolution.gave_up,
            }))
        }
        Err(resolution_error) => Err(error_response(resolution_error, &correlation_id, "resolve")),
    }
}

fn error_response(
    resolution_error: ResolutionError,
    correlation_id: &str,
    operation: &'static str,
) -> (StatusCode, Json<PortalError>) {
    error!(
        event_name = "portal.request.failed",
        correlation_id = %correlation_id,
        operation,
        error = %resolution_error,
        "portal request failed"
    );

    let status = match resolution_error {
        ResolutionError::NotFound { .. } => StatusCode::NOT_FOUND,
        ResolutionError::Transport { .. } => StatusCode::BAD_GATEWAY,
        ResolutionError::Parse { .. } | ResolutionError::Reasoning { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };

    (status, Json(PortalError { error: resolution_error.user_message().to_string() }))
}
