use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use sbar_model::{ModuleId, TaskInfo};

use crate::{error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /ping - Liveness check
    /// - GET /rest/v1/endpoints - List endpoints
    /// - GET /rest/v1/routines - List all routines
    /// - GET /rest/v1/routines/{id} - Get routine status
    /// - PUT /rest/v1/routines - Refresh all routines
    /// - PUT /rest/v1/routines/{id} - Refresh routine
    /// - PATCH /rest/v1/routines/{id} - Change routine interval
    /// - DELETE /rest/v1/routines - Stop all routines
    /// - DELETE /rest/v1/routines/{id} - Stop routine
    pub fn router(self) -> Router {
        Router::new()
            .route("/ping", get(ping))
            .route("/rest/v1/endpoints", get(list_endpoints))
            .route(
                "/rest/v1/routines",
                get(list_routines::<H>)
                    .put(refresh_all::<H>)
                    .delete(stop_all::<H>),
            )
            .route(
                "/rest/v1/routines/{id}",
                get(get_routine::<H>)
                    .put(refresh_routine::<H>)
                    .patch(patch_routine::<H>)
                    .delete(stop_routine::<H>),
            )
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct Endpoint {
    method: &'static str,
    url: &'static str,
    description: &'static str,
}

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "GET",
        url: "/ping",
        description: "Check that the API is up",
    },
    Endpoint {
        method: "GET",
        url: "/rest/v1/endpoints",
        description: "List all endpoints",
    },
    Endpoint {
        method: "GET",
        url: "/rest/v1/routines",
        description: "Get information about all routines",
    },
    Endpoint {
        method: "GET",
        url: "/rest/v1/routines/{id}",
        description: "Get information about one routine",
    },
    Endpoint {
        method: "PUT",
        url: "/rest/v1/routines",
        description: "Refresh all active routines",
    },
    Endpoint {
        method: "PUT",
        url: "/rest/v1/routines/{id}",
        description: "Refresh one routine",
    },
    Endpoint {
        method: "PATCH",
        url: "/rest/v1/routines/{id}",
        description: "Change a routine's interval",
    },
    Endpoint {
        method: "DELETE",
        url: "/rest/v1/routines",
        description: "Stop all routines and the statusbar",
    },
    Endpoint {
        method: "DELETE",
        url: "/rest/v1/routines/{id}",
        description: "Stop one routine",
    },
];

#[derive(Debug, Serialize)]
struct ListEndpointsResponse {
    endpoints: &'static [Endpoint],
}

#[derive(Debug, Serialize, Deserialize)]
struct ListRoutinesResponse {
    routines: BTreeMap<ModuleId, TaskInfo>,
}

#[derive(Debug, Deserialize)]
struct PatchRoutineRequest {
    /// New interval in seconds
    interval: Option<i64>,
    /// Refresh right away (default: true)
    refresh: Option<bool>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /ping
async fn ping() -> &'static str {
    "pong"
}

/// GET /rest/v1/endpoints
async fn list_endpoints() -> Json<ListEndpointsResponse> {
    Json(ListEndpointsResponse {
        endpoints: ENDPOINTS,
    })
}

/// GET /rest/v1/routines
async fn list_routines<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let routines = handler.list_routines().await?;
    Ok(Json(ListRoutinesResponse { routines }))
}

/// GET /rest/v1/routines/{id}
///
/// Response: `{"<id>": {name, uptime, interval, active}}`
async fn get_routine<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let info = handler.get_routine(&id).await?;
    Ok(Json(BTreeMap::from([(id, info)])))
}

/// PUT /rest/v1/routines
async fn refresh_all<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.refresh_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /rest/v1/routines/{id}
async fn refresh_routine<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.refresh(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /rest/v1/routines/{id}
///
/// Body: `{"interval": <seconds>, "refresh": <bool, optional>}`
async fn patch_routine<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
    body: Result<Json<PatchRoutineRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let Json(req) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let interval = req
        .interval
        .ok_or_else(|| ApiError::InvalidRequest("missing interval".into()))?;
    let refresh = req.refresh.unwrap_or(true);

    debug!(routine = %id, interval, refresh, "patch requested");
    handler.patch_interval(&id, interval, refresh).await?;
    Ok(StatusCode::ACCEPTED)
}

/// DELETE /rest/v1/routines
async fn stop_all<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.stop_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /rest/v1/routines/{id}
async fn stop_routine<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.stop(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
