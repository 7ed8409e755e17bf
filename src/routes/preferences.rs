//! Preference profile query parameters shared by the recommendation and
//! comfort endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::AppError;
use crate::models::{
    City, CloudCoverBand, Difficulty, PreferenceProfile, ScoringWeights, TimeRange,
};

/// Every field is optional; missing ones take the profile defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreferenceQuery {
    /// Lowest comfortable temperature in °C (default -10)
    pub min_temp: Option<f64>,
    /// Highest comfortable temperature in °C (default 30)
    pub max_temp: Option<f64>,
    /// Whether rain is acceptable (default true)
    pub allow_precipitation: Option<bool>,
    /// Hardest acceptable difficulty: easy, moderate or hard (default moderate)
    pub difficulty: Option<String>,
    /// Minimum trail length in km (default 1)
    pub min_length: Option<f64>,
    /// Maximum trail length in km (default 20)
    pub max_length: Option<f64>,
    /// Minimum rating, 0 to 5 (default 3)
    pub min_rating: Option<f64>,
    /// Whether hours between 22:00 and 04:59 count (default false)
    pub allow_night_walks: Option<bool>,
    /// clear, partly_cloudy or overcast (default partly_cloudy)
    pub cloud_cover: Option<String>,
    /// tricity, gdansk, gdynia or sopot (default tricity, meaning any)
    pub city: Option<String>,
    /// any, up_to_2h, 2_4h, 4_6h, 6_8h or over_8h (default 2_4h)
    pub time_range: Option<String>,
    pub weather_weight: Option<f64>,
    pub difficulty_weight: Option<f64>,
    pub length_weight: Option<f64>,
    pub rating_weight: Option<f64>,
}

impl PreferenceQuery {
    /// Build a validated profile. A reversed temperature band is swapped.
    pub fn into_profile(self) -> Result<PreferenceProfile, AppError> {
        let defaults = PreferenceProfile::default();

        let mut min_temp = self.min_temp.unwrap_or(defaults.min_temp());
        let mut max_temp = self.max_temp.unwrap_or(defaults.max_temp());
        if min_temp > max_temp {
            std::mem::swap(&mut min_temp, &mut max_temp);
        }

        let default_weights = defaults.weights();
        let weights = ScoringWeights {
            weather: self.weather_weight.unwrap_or(default_weights.weather),
            difficulty: self.difficulty_weight.unwrap_or(default_weights.difficulty),
            length: self.length_weight.unwrap_or(default_weights.length),
            rating: self.rating_weight.unwrap_or(default_weights.rating),
        };

        let allow_precipitation = self
            .allow_precipitation
            .unwrap_or(defaults.allow_precipitation());
        let allow_night_walks = self
            .allow_night_walks
            .unwrap_or(defaults.allow_night_walks());

        let mut builder = PreferenceProfile::builder()
            .temperature(min_temp, max_temp)
            .allow_precipitation(allow_precipitation)
            .length(
                self.min_length.unwrap_or(defaults.min_length()),
                self.max_length.unwrap_or(defaults.max_length()),
            )
            .min_rating(self.min_rating.unwrap_or(defaults.min_rating()))
            .allow_night_walks(allow_night_walks)
            .weights(weights);

        if let Some(difficulty) = self.difficulty.as_deref() {
            builder = builder.preferred_difficulty(difficulty.parse::<Difficulty>()?);
        }
        if let Some(cloud_cover) = self.cloud_cover.as_deref() {
            builder = builder.preferred_cloud_cover(cloud_cover.parse::<CloudCoverBand>()?);
        }
        if let Some(city) = self.city.as_deref() {
            builder = builder.preferred_city(city.parse::<City>()?);
        }
        if let Some(time_range) = self.time_range.as_deref() {
            builder = builder.preferred_time_range(time_range.parse::<TimeRange>()?);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_gives_default_profile() {
        let profile = PreferenceQuery::default().into_profile().unwrap();
        assert_eq!(profile, PreferenceProfile::default());
    }

    #[test]
    fn test_reversed_temperature_swapped() {
        let query = PreferenceQuery {
            min_temp: Some(25.0),
            max_temp: Some(5.0),
            ..Default::default()
        };
        let profile = query.into_profile().unwrap();
        assert_eq!(profile.min_temp(), 5.0);
        assert_eq!(profile.max_temp(), 25.0);
    }

    #[test]
    fn test_single_bound_above_default_max_swapped() {
        let query = PreferenceQuery {
            min_temp: Some(35.0),
            ..Default::default()
        };
        let profile = query.into_profile().unwrap();
        assert_eq!(profile.min_temp(), 30.0);
        assert_eq!(profile.max_temp(), 35.0);
    }

    #[test]
    fn test_enum_fields_parsed() {
        let query = PreferenceQuery {
            difficulty: Some("HARD".to_string()),
            cloud_cover: Some("clear".to_string()),
            city: Some("Gdańsk".to_string()),
            time_range: Some("do 2 godzin".to_string()),
            ..Default::default()
        };
        let profile = query.into_profile().unwrap();
        assert_eq!(profile.preferred_difficulty(), Difficulty::Hard);
        assert_eq!(profile.preferred_cloud_cover(), CloudCoverBand::Clear);
        assert_eq!(profile.preferred_city(), City::Gdansk);
        assert_eq!(profile.preferred_time_range(), TimeRange::UpTo2h);
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let query = PreferenceQuery {
            difficulty: Some("extreme".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_profile(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        let query = PreferenceQuery {
            min_rating: Some(7.5),
            ..Default::default()
        };
        assert!(matches!(query.into_profile(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_weights_override() {
        let query = PreferenceQuery {
            weather_weight: Some(1.0),
            ..Default::default()
        };
        let profile = query.into_profile().unwrap();
        assert_eq!(profile.weights().weather, 1.0);
        assert_eq!(profile.weights().rating, 0.2);

        let bad = PreferenceQuery {
            rating_weight: Some(1.5),
            ..Default::default()
        };
        assert!(bad.into_profile().is_err());
    }

    #[test]
    fn test_deserialize_from_query_string() {
        let uri: axum::http::Uri =
            "/x?min_temp=5&allow_precipitation=false&city=sopot&time_range=any"
                .parse()
                .unwrap();
        let axum::extract::Query(query) =
            axum::extract::Query::<PreferenceQuery>::try_from_uri(&uri).unwrap();
        let profile = query.into_profile().unwrap();
        assert_eq!(profile.min_temp(), 5.0);
        assert!(!profile.allow_precipitation());
        assert_eq!(profile.preferred_city(), City::Sopot);
        assert_eq!(profile.preferred_time_range(), TimeRange::Any);
    }
}
