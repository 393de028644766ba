//! Route definitions for the Crop Irrigation Planner

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/crops", crop_routes())
        .nest("/weather", weather_routes())
}

/// Crop and schedule routes
fn crop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_crops).post(handlers::create_crop))
        .route("/:crop_id", get(handlers::get_crop))
        .route(
            "/:crop_id/schedule",
            get(handlers::get_schedule).post(handlers::generate_schedule),
        )
}

/// Weather routes
fn weather_routes() -> Router<AppState> {
    Router::new().route("/forecast", get(handlers::get_weather_forecast))
}
