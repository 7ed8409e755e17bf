//! User preference profile.
//!
//! A [`PreferenceProfile`] is produced by [`PreferenceProfileBuilder::build`],
//! which validates every field at once. The profile has no setters, so a
//! built value is always within its declared domain and can be shared across
//! threads for the duration of a query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ValidationError;
use crate::models::city::City;
use crate::models::trail::{Difficulty, MAX_RATING};

/// Preferred cloud cover, each band an inclusive percentage range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CloudCoverBand {
    Clear,
    PartlyCloudy,
    Overcast,
}

impl CloudCoverBand {
    pub const ALL: [CloudCoverBand; 3] = [
        CloudCoverBand::Clear,
        CloudCoverBand::PartlyCloudy,
        CloudCoverBand::Overcast,
    ];

    /// Inclusive `(low, high)` cloud cover in percent.
    pub fn range(self) -> (u8, u8) {
        match self {
            CloudCoverBand::Clear => (0, 30),
            CloudCoverBand::PartlyCloudy => (30, 70),
            CloudCoverBand::Overcast => (70, 100),
        }
    }

    pub fn contains(self, cloud_cover_pct: u8) -> bool {
        let (low, high) = self.range();
        (low..=high).contains(&cloud_cover_pct)
    }

    pub fn identifier(self) -> &'static str {
        match self {
            CloudCoverBand::Clear => "clear",
            CloudCoverBand::PartlyCloudy => "partly_cloudy",
            CloudCoverBand::Overcast => "overcast",
        }
    }

    fn legacy_label(self) -> &'static str {
        match self {
            CloudCoverBand::Clear => "bezchmurnie",
            CloudCoverBand::PartlyCloudy => "troche_chmur",
            CloudCoverBand::Overcast => "pelne_zachmurzenie",
        }
    }
}

impl FromStr for CloudCoverBand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        CloudCoverBand::ALL
            .into_iter()
            .find(|b| b.identifier() == needle || b.legacy_label() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "cloud_cover",
                value: s.to_string(),
            })
    }
}

/// Preferred walking time band in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "up_to_2h")]
    UpTo2h,
    #[serde(rename = "2_4h")]
    From2To4h,
    #[serde(rename = "4_6h")]
    From4To6h,
    #[serde(rename = "6_8h")]
    From6To8h,
    #[serde(rename = "over_8h")]
    Over8h,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::Any,
        TimeRange::UpTo2h,
        TimeRange::From2To4h,
        TimeRange::From4To6h,
        TimeRange::From6To8h,
        TimeRange::Over8h,
    ];

    /// `(min_hours, max_hours)`; `None` means unbounded above.
    pub fn bounds(self) -> (f64, Option<f64>) {
        match self {
            TimeRange::Any => (0.0, None),
            TimeRange::UpTo2h => (0.0, Some(2.0)),
            TimeRange::From2To4h => (2.0, Some(4.0)),
            TimeRange::From4To6h => (4.0, Some(6.0)),
            TimeRange::From6To8h => (6.0, Some(8.0)),
            TimeRange::Over8h => (8.0, None),
        }
    }

    /// Inclusive at both ends.
    pub fn contains(self, hours: f64) -> bool {
        let (min, max) = self.bounds();
        hours >= min && max.map_or(true, |max| hours <= max)
    }

    pub fn identifier(self) -> &'static str {
        match self {
            TimeRange::Any => "any",
            TimeRange::UpTo2h => "up_to_2h",
            TimeRange::From2To4h => "2_4h",
            TimeRange::From4To6h => "4_6h",
            TimeRange::From6To8h => "6_8h",
            TimeRange::Over8h => "over_8h",
        }
    }

    /// Label shown in the trail list, e.g. "2-4 godziny".
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Any => "dowolny",
            TimeRange::UpTo2h => "do 2 godzin",
            TimeRange::From2To4h => "2-4 godziny",
            TimeRange::From4To6h => "4-6 godziny",
            TimeRange::From6To8h => "6-8 godziny",
            TimeRange::Over8h => "powyżej 8 godzin",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        TimeRange::ALL
            .into_iter()
            .find(|t| t.identifier() == needle || t.label() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "time_range",
                value: s.to_string(),
            })
    }
}

/// Per-factor weights, each in `0..=1`.
///
/// Stored with the profile and returned to clients, but the comfort scorer
/// takes an unweighted mean. See `ComfortBreakdown` for the per-component
/// scores a weighted mean would combine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ScoringWeights {
    pub weather: f64,
    pub difficulty: f64,
    pub length: f64,
    pub rating: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weather: 0.4,
            difficulty: 0.2,
            length: 0.2,
            rating: 0.2,
        }
    }
}

/// Validated, immutable set of user constraints.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PreferenceProfile {
    min_temp: f64,
    max_temp: f64,
    allow_precipitation: bool,
    preferred_difficulty: Difficulty,
    min_length: f64,
    max_length: f64,
    min_rating: f64,
    allow_night_walks: bool,
    preferred_cloud_cover: CloudCoverBand,
    preferred_city: City,
    preferred_time_range: TimeRange,
    weights: ScoringWeights,
}

impl PreferenceProfile {
    pub fn builder() -> PreferenceProfileBuilder {
        PreferenceProfileBuilder::default()
    }

    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn allow_precipitation(&self) -> bool {
        self.allow_precipitation
    }

    pub fn preferred_difficulty(&self) -> Difficulty {
        self.preferred_difficulty
    }

    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    pub fn allow_night_walks(&self) -> bool {
        self.allow_night_walks
    }

    pub fn preferred_cloud_cover(&self) -> CloudCoverBand {
        self.preferred_cloud_cover
    }

    pub fn preferred_city(&self) -> City {
        self.preferred_city
    }

    pub fn preferred_time_range(&self) -> TimeRange {
        self.preferred_time_range
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        let b = PreferenceProfileBuilder::default();
        Self {
            min_temp: b.min_temp,
            max_temp: b.max_temp,
            allow_precipitation: b.allow_precipitation,
            preferred_difficulty: b.preferred_difficulty,
            min_length: b.min_length,
            max_length: b.max_length,
            min_rating: b.min_rating,
            allow_night_walks: b.allow_night_walks,
            preferred_cloud_cover: b.preferred_cloud_cover,
            preferred_city: b.preferred_city,
            preferred_time_range: b.preferred_time_range,
            weights: b.weights,
        }
    }
}

/// Collects profile fields; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct PreferenceProfileBuilder {
    min_temp: f64,
    max_temp: f64,
    allow_precipitation: bool,
    preferred_difficulty: Difficulty,
    min_length: f64,
    max_length: f64,
    min_rating: f64,
    allow_night_walks: bool,
    preferred_cloud_cover: CloudCoverBand,
    preferred_city: City,
    preferred_time_range: TimeRange,
    weights: ScoringWeights,
}

impl Default for PreferenceProfileBuilder {
    fn default() -> Self {
        Self {
            min_temp: -10.0,
            max_temp: 30.0,
            allow_precipitation: true,
            preferred_difficulty: Difficulty::Moderate,
            min_length: 1.0,
            max_length: 20.0,
            min_rating: 3.0,
            allow_night_walks: false,
            preferred_cloud_cover: CloudCoverBand::PartlyCloudy,
            preferred_city: City::Tricity,
            preferred_time_range: TimeRange::From2To4h,
            weights: ScoringWeights::default(),
        }
    }
}

impl PreferenceProfileBuilder {
    /// Temperature band in °C. The bounds are stored as given.
    pub fn temperature(mut self, min_temp: f64, max_temp: f64) -> Self {
        self.min_temp = min_temp;
        self.max_temp = max_temp;
        self
    }

    pub fn allow_precipitation(mut self, allow: bool) -> Self {
        self.allow_precipitation = allow;
        self
    }

    pub fn preferred_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.preferred_difficulty = difficulty;
        self
    }

    pub fn length(mut self, min_length: f64, max_length: f64) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn allow_night_walks(mut self, allow: bool) -> Self {
        self.allow_night_walks = allow;
        self
    }

    pub fn preferred_cloud_cover(mut self, band: CloudCoverBand) -> Self {
        self.preferred_cloud_cover = band;
        self
    }

    pub fn preferred_city(mut self, city: City) -> Self {
        self.preferred_city = city;
        self
    }

    pub fn preferred_time_range(mut self, range: TimeRange) -> Self {
        self.preferred_time_range = range;
        self
    }

    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn build(self) -> Result<PreferenceProfile, ValidationError> {
        require_finite("min_temp", self.min_temp)?;
        require_finite("max_temp", self.max_temp)?;
        require_range("min_length", self.min_length, 0.0, f64::INFINITY)?;
        require_range("max_length", self.max_length, 0.0, f64::INFINITY)?;
        require_range("min_rating", self.min_rating, 0.0, MAX_RATING)?;
        require_range("weight_weather", self.weights.weather, 0.0, 1.0)?;
        require_range("weight_difficulty", self.weights.difficulty, 0.0, 1.0)?;
        require_range("weight_length", self.weights.length, 0.0, 1.0)?;
        require_range("weight_rating", self.weights.rating, 0.0, 1.0)?;

        Ok(PreferenceProfile {
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            allow_precipitation: self.allow_precipitation,
            preferred_difficulty: self.preferred_difficulty,
            min_length: self.min_length,
            max_length: self.max_length,
            min_rating: self.min_rating,
            allow_night_walks: self.allow_night_walks,
            preferred_cloud_cover: self.preferred_cloud_cover,
            preferred_city: self.preferred_city,
            preferred_time_range: self.preferred_time_range,
            weights: self.weights,
        })
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// Finite values only; `max` may be infinite to express "no upper bound".
fn require_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    require_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
