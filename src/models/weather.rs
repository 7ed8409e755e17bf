use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

/// One hour of forecast weather at a location.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeatherObservation {
    /// Start of the hour, in the location's own UTC offset
    #[schema(value_type = String)]
    pub timestamp: DateTime<FixedOffset>,
    /// Air temperature in °C (1 decimal place)
    pub temperature: f64,
    /// Precipitation probability in percent
    pub precipitation_probability: u8,
    /// Precipitation in mm (2 decimal places)
    pub precipitation_amount: f64,
    /// Seconds of sunshine within the hour
    pub sunshine_duration: f64,
    /// Cloud cover in percent
    pub cloud_cover: u8,
}

impl WeatherObservation {
    /// Calendar date of the observation in its own time zone.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn local_hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Colour band for a daily comfort score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComfortBand {
    Green,
    Yellow,
    Orange,
    Red,
}

impl ComfortBand {
    /// Lower score bounds, checked in order. `Red` catches everything else.
    const THRESHOLDS: [(u8, ComfortBand); 3] = [
        (80, ComfortBand::Green),
        (60, ComfortBand::Yellow),
        (40, ComfortBand::Orange),
    ];

    pub fn from_score(score: u8) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, band)| *band)
            .unwrap_or(ComfortBand::Red)
    }

    pub fn hex(self) -> &'static str {
        match self {
            ComfortBand::Green => "#2E8B57",
            ComfortBand::Yellow => "#FFD700",
            ComfortBand::Orange => "#FFA500",
            ComfortBand::Red => "#DC143C",
        }
    }
}

/// Comfort rating for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyComfort {
    pub date: NaiveDate,
    /// Rounded average comfort, 0 to 100
    pub score: u8,
    pub band: ComfortBand,
}
