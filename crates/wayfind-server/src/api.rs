//! HTTP surface: one orchestration endpoint plus health.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use wayfind_agent::{Orchestrator, OrchestratorRequest, OrchestratorResponse};
use wayfind_core::{ConversationTurn, Location};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Wire shape of a query request.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub query: String,
    pub user_id: String,
    #[serde(default)]
    pub user_location: Option<Location>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    #[serde(default = "default_memory_enabled")]
    pub memory_enabled: bool,
}

fn default_memory_enabled() -> bool {
    true
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/healthz", get(health))
        .route("/api/query", post(handle_query))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id))
                .layer(cors),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// The single orchestration call. Failures inside the pipeline come back as
/// a structured `{success: false}` payload with HTTP 200 — HTTP errors are
/// reserved for malformed requests.
async fn handle_query(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<QueryBody>,
) -> Result<Json<ApiResponse<OrchestratorResponse>>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ApiError {
            error: ErrorBody {
                code: "EMPTY_QUERY".to_string(),
                message: "query must be non-empty".to_string(),
            },
            meta: ResponseMeta::new(req_id.0),
        });
    }

    tracing::info!(user = %body.user_id, query = %body.query, "handling query");

    let response = state
        .orchestrator
        .handle(OrchestratorRequest {
            query: body.query,
            user_id: body.user_id,
            user_location: body.user_location,
            conversation_history: body.conversation_history,
            memory_enabled: body.memory_enabled,
        })
        .await;

    Ok(Json(ApiResponse {
        data: response,
        meta: ResponseMeta::new(req_id.0),
    }))
}
