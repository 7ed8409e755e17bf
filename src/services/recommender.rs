//! Recommendation orchestrator: owns the catalog and the weather source.

use chrono::{Local, NaiveDate};
use std::sync::Arc;

use crate::models::{DailyComfort, PreferenceProfile, Trail};
use crate::services::catalog::TrailCatalog;
use crate::services::comfort;
use crate::services::filter;
use crate::services::weather_source::{WeatherSource, FORECAST_DAYS};

/// Shared across requests behind an `Arc`; holds no mutable state of its own.
#[derive(Debug)]
pub struct Recommender<W> {
    catalog: Arc<TrailCatalog>,
    weather: W,
}

impl<W: WeatherSource> Recommender<W> {
    pub fn new(catalog: Arc<TrailCatalog>, weather: W) -> Self {
        Self { catalog, weather }
    }

    pub fn catalog(&self) -> &TrailCatalog {
        &self.catalog
    }

    pub fn trail(&self, id: u32) -> Option<&Trail> {
        self.catalog.get(id)
    }

    /// Catalog trails passing `profile`, in catalog order, one per name.
    pub fn recommend(&self, profile: &PreferenceProfile) -> Vec<&Trail> {
        let matched = filter::filter_all(self.catalog.trails(), profile);
        tracing::debug!(
            "{} of {} trails match the profile",
            matched.len(),
            self.catalog.len()
        );
        matched
    }

    /// Daily comfort for `trail` starting today (server-local date).
    pub async fn daily_comfort_for(
        &self,
        trail: &Trail,
        profile: &PreferenceProfile,
    ) -> Vec<DailyComfort> {
        self.daily_comfort_from(trail, profile, Local::now().date_naive())
            .await
    }

    /// Daily comfort for `trail` over [`FORECAST_DAYS`] days starting at `today`.
    pub async fn daily_comfort_from(
        &self,
        trail: &Trail,
        profile: &PreferenceProfile,
        today: NaiveDate,
    ) -> Vec<DailyComfort> {
        comfort::daily_comfort(trail, profile, &self.weather, today, FORECAST_DAYS).await
    }
}
