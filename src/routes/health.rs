use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok", or "degraded" when the trail catalog is empty)
    pub status: String,
    /// API version
    pub version: String,
    /// Number of trails loaded
    pub trails: usize,
}

/// Health check endpoint.
///
/// Returns status "degraded" (still 200) when no trails were loaded, so a
/// broken catalog file shows up without taking the service down.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let trails = state.recommender.catalog().len();
    Json(HealthResponse {
        status: if trails > 0 { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        trails,
    })
}
