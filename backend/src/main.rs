//! Crop Irrigation Planner - Backend Server
//!
//! Generates 14-day irrigation schedules for tracked crops, either from a
//! local soil-moisture simulation or from a weather-driven predictive model.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use external::{ForecastProvider, IrrigationModelClient, WeatherClient};
use services::{CropService, ScheduleService};
use shared::GpsCoordinates;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub crops: CropService,
    pub schedules: ScheduleService,
    pub forecasts: Arc<dyn ForecastProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irrigation_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Crop Irrigation Planner Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Default schedule source: {}", config.schedule.default_source);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    if config.weather.api_key.trim().is_empty() {
        tracing::warn!("Weather API key not configured; predicted schedules will fail");
    }

    // External collaborators
    let forecasts: Arc<dyn ForecastProvider> = Arc::new(WeatherClient::new(
        config.weather.api_key.clone(),
        config.weather.api_endpoint.clone(),
        Duration::from_secs(config.weather.timeout_secs),
    )?);
    let model = Arc::new(IrrigationModelClient::new(
        config.model.endpoint.clone(),
        Duration::from_secs(config.model.timeout_secs),
    )?);

    let crops = CropService::new(db_pool.clone());
    let schedules = ScheduleService::new(
        Arc::new(crops.clone()),
        forecasts.clone(),
        model,
        GpsCoordinates::new(
            config.weather.default_latitude,
            config.weather.default_longitude,
        ),
    );

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        crops,
        schedules,
        forecasts,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Crop Irrigation Planner API v1.0"
}
