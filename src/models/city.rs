use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ValidationError;
use crate::helpers::to_decimal_dp;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Coordinates rounded to 4 decimal places, used as a forecast cache key.
    /// Open-Meteo resolves to a model grid far coarser than that.
    pub fn grid_key(&self) -> (Decimal, Decimal) {
        (
            to_decimal_dp(self.latitude, 4),
            to_decimal_dp(self.longitude, 4),
        )
    }
}

/// Known cities. `Tricity` is the umbrella covering the whole area: as a
/// preference it means "no city filter", as a location it is the fallback
/// coordinate for regions that are not in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Tricity,
    Gdansk,
    Gdynia,
    Sopot,
}

impl City {
    pub const ALL: [City; 4] = [City::Tricity, City::Gdansk, City::Gdynia, City::Sopot];

    /// Display name, as it appears in trail regions.
    pub fn name(self) -> &'static str {
        match self {
            City::Tricity => "Trójmiasto",
            City::Gdansk => "Gdańsk",
            City::Gdynia => "Gdynia",
            City::Sopot => "Sopot",
        }
    }

    /// Lowercase identifier, matching the serde representation.
    pub fn identifier(self) -> &'static str {
        match self {
            City::Tricity => "tricity",
            City::Gdansk => "gdansk",
            City::Gdynia => "gdynia",
            City::Sopot => "sopot",
        }
    }

    pub fn coordinates(self) -> Coordinates {
        match self {
            City::Tricity => Coordinates::new(54.4452, 18.5603),
            City::Gdansk => Coordinates::new(54.372158, 18.646352),
            City::Gdynia => Coordinates::new(54.518882, 18.530514),
            City::Sopot => Coordinates::new(54.444760, 18.556272),
        }
    }

    pub fn is_umbrella(self) -> bool {
        self == City::Tricity
    }

    /// Whether `region` names this city (case-insensitive).
    pub fn matches_region(self, region: &str) -> bool {
        region.trim().to_lowercase() == self.name().to_lowercase()
    }

    /// Resolve a trail region to a city, falling back to the umbrella.
    pub fn from_region(region: &str) -> City {
        City::ALL
            .into_iter()
            .find(|c| c.matches_region(region))
            .unwrap_or(City::Tricity)
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the display name ("Gdańsk") or the identifier ("gdansk").
impl FromStr for City {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        City::ALL
            .into_iter()
            .find(|c| c.identifier() == needle || c.name().to_lowercase() == needle)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "city",
                value: s.to_string(),
            })
    }
}
