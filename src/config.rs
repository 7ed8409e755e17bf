use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::open_meteo::DEFAULT_API_URL;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `;`-separated trail catalog export.
    pub trails_csv: PathBuf,
    pub weather_api_url: String,
    pub weather_user_agent: String,
    pub weather_cache_ttl: Duration,
    pub weather_max_retries: u32,
    pub weather_retry_backoff: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable numbers fall back to the
    /// default with a warning.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| parse_or_default(key, lookup(key), default);

        Self {
            port: parse_or_default("PORT", lookup("PORT"), 8080),
            trails_csv: lookup("TRAILS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/trails.csv")),
            weather_api_url: lookup("WEATHER_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            weather_user_agent: lookup("WEATHER_USER_AGENT")
                .unwrap_or_else(|| "TrailComfort/0.1".to_string()),
            weather_cache_ttl: Duration::from_secs(number("WEATHER_CACHE_TTL_SECS", 3600)),
            weather_max_retries: parse_or_default(
                "WEATHER_MAX_RETRIES",
                lookup("WEATHER_MAX_RETRIES"),
                5,
            ),
            weather_retry_backoff: Duration::from_millis(number("WEATHER_RETRY_BACKOFF_MS", 200)),
        }
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}='{}', using default {}", key, value, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.trails_csv, PathBuf::from("./data/trails.csv"));
        assert_eq!(config.weather_api_url, DEFAULT_API_URL);
        assert!(config.weather_user_agent.contains("TrailComfort"));
        assert_eq!(config.weather_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.weather_max_retries, 5);
        assert_eq!(config.weather_retry_backoff, Duration::from_millis(200));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("TRAILS_CSV", "/srv/trails.csv"),
            ("WEATHER_CACHE_TTL_SECS", "60"),
            ("WEATHER_MAX_RETRIES", "0"),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.trails_csv, PathBuf::from("/srv/trails.csv"));
        assert_eq!(config.weather_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.weather_max_retries, 0);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("WEATHER_RETRY_BACKOFF_MS", "-5")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.weather_retry_backoff, Duration::from_millis(200));
    }
}
