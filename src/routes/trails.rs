//! Trail catalog and recommendation endpoints.
//!
//! - GET /api/v1/trails
//! - GET /api/v1/trails/:id
//! - GET /api/v1/recommendations?<preferences>

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::preferences::PreferenceQuery;
use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::models::{PreferenceProfile, Trail};

/// Response type for GET /api/v1/recommendations.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationsResponse {
    /// The profile the trails were matched against, defaults filled in
    pub profile: PreferenceProfile,
    /// Number of matching trails
    pub count: usize,
    /// Matching trails in catalog order, one per trail name
    pub trails: Vec<Trail>,
}

/// List every trail in the catalog.
#[utoipa::path(
    get,
    path = "/api/v1/trails",
    tag = "Trails",
    responses(
        (status = 200, description = "All trails in catalog order", body = Vec<Trail>),
    )
)]
pub async fn list_trails(State(state): State<AppState>) -> Json<Vec<Trail>> {
    Json(state.recommender.catalog().trails().to_vec())
}

/// Get a single trail.
#[utoipa::path(
    get,
    path = "/api/v1/trails/{id}",
    tag = "Trails",
    params(
        ("id" = u32, Path, description = "Trail id"),
    ),
    responses(
        (status = 200, description = "The trail", body = Trail),
        (status = 404, description = "Trail not found", body = ErrorResponse),
    )
)]
pub async fn get_trail(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Trail>, AppError> {
    state
        .recommender
        .trail(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Trail {} not found", id)))
}

/// Trails matching the given preferences.
///
/// Hard constraints only: difficulty, length, rating, estimated walking time
/// and city. Weather does not affect which trails are returned.
#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    tag = "Trails",
    params(PreferenceQuery),
    responses(
        (status = 200, description = "Matching trails", body = RecommendationsResponse),
        (status = 400, description = "Invalid preference values", body = ErrorResponse),
    )
)]
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<PreferenceQuery>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let profile = params.into_profile()?;
    let trails: Vec<Trail> = state
        .recommender
        .recommend(&profile)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(RecommendationsResponse {
        count: trails.len(),
        profile,
        trails,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{sample_catalog, test_state};

    #[tokio::test]
    async fn test_list_trails() {
        let state = test_state(sample_catalog(), "http://127.0.0.1:9");
        let Json(trails) = list_trails(State(state)).await;
        assert_eq!(trails.len(), 3);
        assert_eq!(trails[0].id(), 1);
    }

    #[tokio::test]
    async fn test_get_trail_found_and_missing() {
        let state = test_state(sample_catalog(), "http://127.0.0.1:9");
        let Json(trail) = get_trail(State(state.clone()), Path(2)).await.unwrap();
        assert_eq!(trail.name(), "Klif Orłowski");

        let err = get_trail(State(state), Path(42)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommendations_filter_by_city() {
        let state = test_state(sample_catalog(), "http://127.0.0.1:9");
        let query = PreferenceQuery {
            city: Some("gdynia".to_string()),
            time_range: Some("any".to_string()),
            ..Default::default()
        };
        let Json(response) = get_recommendations(State(state), Query(query))
            .await
            .unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.trails[0].region(), "Gdynia");
    }

    #[tokio::test]
    async fn test_recommendations_reject_bad_profile() {
        let state = test_state(sample_catalog(), "http://127.0.0.1:9");
        let query = PreferenceQuery {
            cloud_cover: Some("foggy".to_string()),
            ..Default::default()
        };
        let result = get_recommendations(State(state), Query(query)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
