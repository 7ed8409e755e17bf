pub mod comfort;
pub mod health;
pub mod preferences;
pub mod trails;

use std::sync::Arc;

use crate::services::open_meteo::OpenMeteoClient;
use crate::services::recommender::Recommender;
use crate::services::weather_cache::CachedWeatherSource;

pub(crate) type ApiRecommender = Recommender<CachedWeatherSource<OpenMeteoClient>>;

/// Shared application state for all endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) recommender: Arc<ApiRecommender>,
}
