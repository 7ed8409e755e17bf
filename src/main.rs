// Trail Comfort API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::catalog::{load_catalog_file, TrailCatalog};
use services::open_meteo::OpenMeteoClient;
use services::recommender::Recommender;
use services::weather_cache::{CachedWeatherSource, ForecastCache};

/// Trail Comfort API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trail Comfort API",
        version = "0.1.0",
        description = "Walking trail recommendations for the Tricity area (Gdańsk, Gdynia, \
            Sopot). Filters a trail catalog by difficulty, length, rating, estimated walking \
            time and city, and rates each of the next 14 days for walking comfort using \
            hourly Open-Meteo forecasts.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Trails", description = "Trail catalog and recommendations"),
        (name = "Comfort", description = "Daily walking comfort from weather forecasts"),
    ),
    paths(
        routes::health::health_check,
        routes::trails::list_trails,
        routes::trails::get_trail,
        routes::trails::get_recommendations,
        routes::comfort::get_trail_comfort,
        routes::comfort::get_comfort_batch,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::trails::RecommendationsResponse,
            routes::comfort::TrailComfortResponse,
            routes::comfort::DayComfort,
            models::Trail,
            models::Difficulty,
            models::PreferenceProfile,
            models::ScoringWeights,
            models::CloudCoverBand,
            models::City,
            models::TimeRange,
            models::ComfortBand,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trail_comfort_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Load the trail catalog; the service still starts without one
    let catalog = match load_catalog_file(&config.trails_csv) {
        Ok(catalog) => {
            if catalog.is_empty() {
                tracing::warn!("No trails found in {}", config.trails_csv.display());
            }
            catalog
        }
        Err(e) => {
            tracing::error!(
                "Failed to load trails from {}: {}",
                config.trails_csv.display(),
                e
            );
            TrailCatalog::default()
        }
    };

    // Weather source: Open-Meteo behind a TTL cache
    let client = OpenMeteoClient::new(
        &config.weather_api_url,
        &config.weather_user_agent,
        config.weather_max_retries,
        config.weather_retry_backoff,
    )
    .expect("Failed to build Open-Meteo client");
    let cache_ttl = chrono::Duration::from_std(config.weather_cache_ttl)
        .unwrap_or_else(|_| chrono::Duration::hours(1));
    let forecast_cache = Arc::new(ForecastCache::new(cache_ttl));
    let weather = CachedWeatherSource::new(client, forecast_cache);

    let app_state = AppState {
        recommender: Arc::new(Recommender::new(Arc::new(catalog), weather)),
    };

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let trail_routes = Router::new()
        .route("/api/v1/trails", get(routes::trails::list_trails))
        .route("/api/v1/trails/:id", get(routes::trails::get_trail))
        .route(
            "/api/v1/recommendations",
            get(routes::trails::get_recommendations),
        )
        .with_state(app_state.clone());

    let comfort_routes = Router::new()
        .route(
            "/api/v1/trails/:id/comfort",
            get(routes::comfort::get_trail_comfort),
        )
        .route("/api/v1/comfort", get(routes::comfort::get_comfort_batch))
        .with_state(app_state.clone());

    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(app_state);

    let app = Router::new()
        .merge(health_routes)
        .merge(trail_routes)
        .merge(comfort_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
