//! Daily walking comfort endpoints.
//!
//! - GET /api/v1/trails/:id/comfort?<preferences>
//! - GET /api/v1/comfort?ids=1,2,3&<preferences>

use axum::extract::{Path, Query, State};
use axum::Json;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::preferences::PreferenceQuery;
use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::models::{ComfortBand, DailyComfort, Trail};

/// Most trail ids accepted by one batch request.
const MAX_BATCH_IDS: usize = 20;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComfortIdsQuery {
    /// Comma-separated trail ids (e.g. "1,2,3")
    pub ids: String,
}

/// Comfort rating for one day.
#[derive(Debug, Serialize, ToSchema)]
pub struct DayComfort {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// Rounded average comfort, 0 to 100
    pub score: u8,
    pub band: ComfortBand,
    /// Display colour for the band (hex)
    pub color: String,
}

impl From<&DailyComfort> for DayComfort {
    fn from(day: &DailyComfort) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            score: day.score,
            band: day.band,
            color: day.band.hex().to_string(),
        }
    }
}

/// Response type for the comfort endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrailComfortResponse {
    pub trail_id: u32,
    pub trail_name: String,
    pub region: String,
    /// False when no forecast could be obtained for the trail's location
    pub available: bool,
    /// One entry per day, starting today; empty when unavailable
    pub days: Vec<DayComfort>,
}

fn comfort_response(trail: &Trail, days: &[DailyComfort]) -> TrailComfortResponse {
    TrailComfortResponse {
        trail_id: trail.id(),
        trail_name: trail.name().to_string(),
        region: trail.region().to_string(),
        available: !days.is_empty(),
        days: days.iter().map(DayComfort::from).collect(),
    }
}

/// Parse "1, 2,3" into ids. Rejects empty or oversized lists and non-numeric
/// entries.
fn parse_ids(raw: &str) -> Result<Vec<u32>, AppError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| AppError::BadRequest(format!("Invalid trail id '{}'", s)))
        })
        .collect::<Result<Vec<u32>, AppError>>()?;

    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "ids must list at least one trail id".to_string(),
        ));
    }
    if ids.len() > MAX_BATCH_IDS {
        return Err(AppError::BadRequest(format!(
            "ids may list at most {} trail ids, got {}",
            MAX_BATCH_IDS,
            ids.len()
        )));
    }
    Ok(ids)
}

/// Daily comfort for one trail over the forecast horizon.
///
/// Each day is scored from the hourly forecast at the trail's city: the
/// average comfort of the daytime hours (night hours too if
/// `allow_night_walks` is set), mapped to a colour band.
#[utoipa::path(
    get,
    path = "/api/v1/trails/{id}/comfort",
    tag = "Comfort",
    params(
        ("id" = u32, Path, description = "Trail id"),
        PreferenceQuery,
    ),
    responses(
        (status = 200, description = "Daily comfort for the trail", body = TrailComfortResponse),
        (status = 400, description = "Invalid preference values", body = ErrorResponse),
        (status = 404, description = "Trail not found", body = ErrorResponse),
    )
)]
pub async fn get_trail_comfort(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(params): Query<PreferenceQuery>,
) -> Result<Json<TrailComfortResponse>, AppError> {
    let profile = params.into_profile()?;
    let trail = state
        .recommender
        .trail(id)
        .ok_or_else(|| AppError::NotFound(format!("Trail {} not found", id)))?;

    let days = state.recommender.daily_comfort_for(trail, &profile).await;
    Ok(Json(comfort_response(trail, &days)))
}

/// Daily comfort for several trails, fetched concurrently.
#[utoipa::path(
    get,
    path = "/api/v1/comfort",
    tag = "Comfort",
    params(ComfortIdsQuery, PreferenceQuery),
    responses(
        (
            status = 200,
            description = "Daily comfort per trail, in request order",
            body = Vec<TrailComfortResponse>
        ),
        (status = 400, description = "Invalid ids or preference values", body = ErrorResponse),
        (status = 404, description = "A trail was not found", body = ErrorResponse),
    )
)]
pub async fn get_comfort_batch(
    State(state): State<AppState>,
    Query(ids_query): Query<ComfortIdsQuery>,
    Query(params): Query<PreferenceQuery>,
) -> Result<Json<Vec<TrailComfortResponse>>, AppError> {
    let ids = parse_ids(&ids_query.ids)?;
    let profile = params.into_profile()?;

    let trails = ids
        .iter()
        .map(|&id| {
            state
                .recommender
                .trail(id)
                .ok_or_else(|| AppError::NotFound(format!("Trail {} not found", id)))
        })
        .collect::<Result<Vec<&Trail>, AppError>>()?;

    let recommender = &state.recommender;
    let profile = &profile;
    let futures = trails
        .iter()
        .map(|trail| async move { recommender.daily_comfort_for(trail, profile).await });
    let results = join_all(futures).await;

    let responses = trails
        .iter()
        .zip(results.iter())
        .map(|(trail, days)| comfort_response(trail, days))
        .collect();
    Ok(Json(responses))
}
