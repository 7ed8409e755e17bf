//! In-memory forecast cache with a fixed time-to-live.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::models::{Coordinates, WeatherObservation};
use crate::services::weather_source::WeatherSource;

/// Forecasts are cached per location on a 4-decimal grid and per horizon.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct ForecastKey {
    latitude: Decimal,
    longitude: Decimal,
    days: u32,
}

impl ForecastKey {
    fn new(coordinates: Coordinates, days: u32) -> Self {
        let (latitude, longitude) = coordinates.grid_key();
        Self {
            latitude,
            longitude,
            days,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedForecast {
    observations: Vec<WeatherObservation>,
    fetched_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ForecastCache {
    ttl: Duration,
    entries: RwLock<HashMap<ForecastKey, CachedForecast>>,
    /// One lock per key, held across an upstream fetch.
    fetch_locks: Mutex<HashMap<ForecastKey, Arc<Mutex<()>>>>,
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            fetch_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The fetch lock for a location. Concurrent misses on the same key
    /// queue on it, so only the first one reaches the upstream source.
    async fn fetch_lock(&self, coordinates: Coordinates, days: u32) -> Arc<Mutex<()>> {
        self.fetch_locks
            .lock()
            .await
            .entry(ForecastKey::new(coordinates, days))
            .or_default()
            .clone()
    }

    /// Cached observations for the location, unless missing or expired.
    pub async fn get_fresh(
        &self,
        coordinates: Coordinates,
        days: u32,
    ) -> Option<Vec<WeatherObservation>> {
        let key = ForecastKey::new(coordinates, days);
        let entries = self.entries.read().await;
        let entry = entries.get(&key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        tracing::debug!(
            "Forecast cache hit for ({}, {}), fetched at {}",
            coordinates.latitude,
            coordinates.longitude,
            entry.fetched_at
        );
        Some(entry.observations.clone())
    }

    pub async fn insert(
        &self,
        coordinates: Coordinates,
        days: u32,
        observations: Vec<WeatherObservation>,
    ) {
        let fetched_at = Utc::now();
        let entry = CachedForecast {
            observations,
            fetched_at,
            expires_at: fetched_at + self.ttl,
        };
        self.entries
            .write()
            .await
            .insert(ForecastKey::new(coordinates, days), entry);
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();
        drop(entries);

        // Locks nobody is holding or waiting on
        self.fetch_locks
            .lock()
            .await
            .retain(|_, lock| Arc::strong_count(lock) > 1);

        if removed > 0 {
            tracing::debug!("Purged {} expired forecast cache entries", removed);
        }
        removed
    }

    #[allow(dead_code)] // No route clears the cache yet
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// A [`WeatherSource`] that serves fresh cache entries and only calls the
/// wrapped source on a miss. Concurrent misses for one location share a single
/// upstream fetch. Empty results are never cached, so a failed fetch is retried
/// on the next request.
#[derive(Debug, Clone)]
pub struct CachedWeatherSource<W> {
    inner: W,
    cache: Arc<ForecastCache>,
}

impl<W: WeatherSource> CachedWeatherSource<W> {
    pub fn new(inner: W, cache: Arc<ForecastCache>) -> Self {
        Self { inner, cache }
    }
}

impl<W: WeatherSource> WeatherSource for CachedWeatherSource<W> {
    async fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        days: u32,
    ) -> Vec<WeatherObservation> {
        if let Some(observations) = self.cache.get_fresh(coordinates, days).await {
            return observations;
        }

        let lock = self.cache.fetch_lock(coordinates, days).await;
        let _guard = lock.lock().await;
        // Filled by whoever held the lock before us
        if let Some(observations) = self.cache.get_fresh(coordinates, days).await {
            return observations;
        }

        self.cache.purge_expired().await;
        let observations = self.inner.hourly_forecast(coordinates, days).await;
        if !observations.is_empty() {
            self.cache
                .insert(coordinates, days, observations.clone())
                .await;
            tracing::debug!(
                "Forecast cache now holds {} entries",
                self.cache.len().await
            );
        }
        observations
    }
}
