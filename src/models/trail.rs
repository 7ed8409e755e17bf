use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ValidationError;

/// Base walking speed used to estimate how long a trail takes (km/h).
pub const BASE_WALKING_SPEED_KMH: f64 = 4.7;

/// Highest rating a trail can carry.
pub const MAX_RATING: f64 = 5.0;

/// Trail difficulty. Variants are declared in ascending order, so the derived
/// `Ord` is the ordinal used by the filter (`Easy < Moderate < Hard`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Hard];

    /// Walking-time multiplier applied on top of the base speed.
    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Moderate => 1.3,
            Difficulty::Hard => 1.6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "difficulty",
                value: s.to_string(),
            })
    }
}

/// Raw fields for constructing a [`Trail`].
#[derive(Debug, Clone)]
pub struct TrailParams {
    pub id: u32,
    pub name: String,
    pub region: String,
    pub length_km: f64,
    pub difficulty: Difficulty,
    pub rating: f64,
    pub link: String,
    pub image_link: String,
}

/// A walking trail. Every instance has passed validation; the estimated
/// walking time is computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Trail {
    /// Catalog-unique identifier
    id: u32,
    /// Trail name (not unique across the catalog)
    name: String,
    /// Region the trail lies in, usually a city name
    region: String,
    /// Trail length in kilometres
    length_km: f64,
    difficulty: Difficulty,
    /// Average rating, 0 to 5
    rating: f64,
    /// Link to the trail description
    link: String,
    /// Link to a photo of the trail
    image_link: String,
    /// Estimated walking time in hours
    estimated_time_hours: f64,
}

impl Trail {
    pub fn new(params: TrailParams) -> Result<Self, ValidationError> {
        let TrailParams {
            id,
            name,
            region,
            length_km,
            difficulty,
            rating,
            link,
            image_link,
        } = params;

        require_non_empty("name", &name)?;
        require_non_empty("region", &region)?;
        if !length_km.is_finite() {
            return Err(ValidationError::NotFinite { field: "length_km" });
        }
        if length_km <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "length_km",
                value: length_km,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !(0.0..=MAX_RATING).contains(&rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                value: rating,
                min: 0.0,
                max: MAX_RATING,
            });
        }
        require_non_empty("link", &link)?;
        require_non_empty("image_link", &image_link)?;

        let estimated_time_hours = length_km * difficulty.multiplier() / BASE_WALKING_SPEED_KMH;

        Ok(Self {
            id,
            name,
            region,
            length_km,
            difficulty,
            rating,
            link,
            image_link,
            estimated_time_hours,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn estimated_time_hours(&self) -> f64 {
        self.estimated_time_hours
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_params() -> TrailParams {
    TrailParams {
        id: 1,
        name: "Dolina Radości".to_string(),
        region: "Gdańsk".to_string(),
        length_km: 5.0,
        difficulty: Difficulty::Easy,
        rating: 4.2,
        link: "https://example.com/trails/1".to_string(),
        image_link: "https://example.com/trails/1.jpg".to_string(),
    }
}
