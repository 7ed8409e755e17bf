//! Comfort scoring.
//!
//! Each forecast hour gets a comfort value in `0..=100`, the plain mean of
//! three components:
//!
//! - temperature: 100 inside the preferred band, minus 10 per °C outside it
//! - precipitation: 100 when dry; 0 when wet and rain is not wanted;
//!   otherwise minus 20 per mm
//! - cloud cover: 100 inside the preferred band, 50 outside
//!
//! Days are rated by averaging the hours that are not excluded as night hours.
//! A day with no usable hours scores 0.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::helpers::round_score;
use crate::models::{City, ComfortBand, DailyComfort, PreferenceProfile, Trail, WeatherObservation};
use crate::services::weather_source::WeatherSource;

/// Points lost per °C outside the preferred temperature band.
const TEMP_PENALTY_PER_DEG: f64 = 10.0;

/// Points lost per mm of precipitation when precipitation is allowed.
const PRECIP_PENALTY_PER_MM: f64 = 20.0;

/// Flat cloud score when the cover is outside the preferred band.
const CLOUD_MISMATCH_SCORE: f64 = 50.0;

const MAX_SCORE: f64 = 100.0;

/// Local hours skipped unless the user likes walking at night (22:00 to 04:59).
pub const NIGHT_HOURS: [u32; 7] = [22, 23, 0, 1, 2, 3, 4];

/// Per-component scores for one hour, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComfortBreakdown {
    pub temperature: f64,
    pub precipitation: f64,
    pub cloud_cover: f64,
}

impl ComfortBreakdown {
    /// Unweighted mean. The profile's `ScoringWeights` are not applied.
    pub fn mean(&self) -> f64 {
        (self.temperature + self.precipitation + self.cloud_cover) / 3.0
    }
}

pub fn temperature_score(temperature: f64, profile: &PreferenceProfile) -> f64 {
    let (min, max) = (profile.min_temp(), profile.max_temp());
    if (min..=max).contains(&temperature) {
        return MAX_SCORE;
    }
    let distance = (temperature - min).abs().min((temperature - max).abs());
    (MAX_SCORE - TEMP_PENALTY_PER_DEG * distance).max(0.0)
}

pub fn precipitation_score(amount_mm: f64, profile: &PreferenceProfile) -> f64 {
    if amount_mm <= 0.0 {
        return MAX_SCORE;
    }
    if !profile.allow_precipitation() {
        return 0.0;
    }
    (MAX_SCORE - PRECIP_PENALTY_PER_MM * amount_mm).max(0.0)
}

pub fn cloud_cover_score(cloud_cover_pct: u8, profile: &PreferenceProfile) -> f64 {
    if profile.preferred_cloud_cover().contains(cloud_cover_pct) {
        MAX_SCORE
    } else {
        CLOUD_MISMATCH_SCORE
    }
}

pub fn hourly_breakdown(obs: &WeatherObservation, profile: &PreferenceProfile) -> ComfortBreakdown {
    ComfortBreakdown {
        temperature: temperature_score(obs.temperature, profile),
        precipitation: precipitation_score(obs.precipitation_amount, profile),
        cloud_cover: cloud_cover_score(obs.cloud_cover, profile),
    }
}

/// Comfort of a single hour, unrounded.
pub fn hourly_comfort(obs: &WeatherObservation, profile: &PreferenceProfile) -> f64 {
    hourly_breakdown(obs, profile).mean()
}

fn is_night_hour(hour: u32) -> bool {
    NIGHT_HOURS.contains(&hour)
}

/// Rate `horizon_days` consecutive days starting at `today`.
///
/// Always returns exactly `horizon_days` entries; days without usable hours
/// score 0.
pub fn aggregate_daily(
    observations: &[WeatherObservation],
    profile: &PreferenceProfile,
    today: NaiveDate,
    horizon_days: u32,
) -> Vec<DailyComfort> {
    let mut by_date: HashMap<NaiveDate, Vec<&WeatherObservation>> = HashMap::new();
    for obs in observations {
        by_date.entry(obs.local_date()).or_default().push(obs);
    }

    (0..horizon_days)
        .map(|offset| {
            let date = today + Duration::days(i64::from(offset));
            let hourly: Vec<f64> = by_date
                .get(&date)
                .into_iter()
                .flatten()
                .filter(|obs| profile.allow_night_walks() || !is_night_hour(obs.local_hour()))
                .map(|obs| hourly_comfort(obs, profile))
                .collect();

            let average = if hourly.is_empty() {
                0.0
            } else {
                hourly.iter().sum::<f64>() / hourly.len() as f64
            };
            let score = round_score(average);

            DailyComfort {
                date,
                score,
                band: ComfortBand::from_score(score),
            }
        })
        .collect()
}

/// Fetch the forecast at the trail's location and rate each day.
///
/// Returns an empty vector when the weather source has nothing for the
/// location, so "comfort unknown" stays distinguishable from a 0-rated day.
pub async fn daily_comfort<W: WeatherSource>(
    trail: &Trail,
    profile: &PreferenceProfile,
    weather: &W,
    today: NaiveDate,
    horizon_days: u32,
) -> Vec<DailyComfort> {
    let coordinates = City::from_region(trail.region()).coordinates();
    let observations = weather.hourly_forecast(coordinates, horizon_days).await;

    if observations.is_empty() {
        tracing::warn!(
            "No forecast for trail {} '{}' at ({}, {})",
            trail.id(),
            trail.name(),
            coordinates.latitude,
            coordinates.longitude
        );
        return Vec::new();
    }

    tracing::debug!(
        "Rating {} hourly observations for trail {} '{}'",
        observations.len(),
        trail.id(),
        trail.name()
    );
    aggregate_daily(&observations, profile, today, horizon_days)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

    use crate::models::WeatherObservation;

    /// An hour with the given local date/hour at UTC+02:00.
    pub(crate) fn observation_at(
        date: NaiveDate,
        hour: u32,
        temperature: f64,
        precipitation_amount: f64,
        cloud_cover: u8,
    ) -> WeatherObservation {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let naive = date.and_hms_opt(hour, 0, 0).unwrap();
        let timestamp: DateTime<FixedOffset> = offset.from_local_datetime(&naive).unwrap();
        WeatherObservation {
            timestamp,
            temperature,
            precipitation_probability: 0,
            precipitation_amount,
            sunshine_duration: 0.0,
            cloud_cover,
        }
    }
}
