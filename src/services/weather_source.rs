//! The weather lookup contract the comfort engine depends on.

use std::future::Future;

use crate::models::{Coordinates, WeatherObservation};

/// Number of days of forecast requested and rated.
pub const FORECAST_DAYS: u32 = 14;

/// Supplies hourly observations for a location.
///
/// Implementations return observations in chronological order, one per hour,
/// starting around "now". Any failure (network, bad payload, no results)
/// comes back as an empty vector; callers cannot and need not tell the
/// causes apart.
pub trait WeatherSource: Send + Sync {
    fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        days: u32,
    ) -> impl Future<Output = Vec<WeatherObservation>> + Send;
}
