//! HTTP handlers for weather endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_coordinates, ApiResponse, GpsCoordinates, WeatherForecast};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for a location lookup
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

/// Get the daily weather forecast for a location
pub async fn get_weather_forecast(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<ApiResponse<WeatherForecast>>> {
    let location = GpsCoordinates::new(query.latitude, query.longitude);
    validate_coordinates(&location).map_err(|msg| AppError::ValidationError(msg.to_string()))?;

    let forecast = state.forecasts.daily_forecast(&location).await?;
    Ok(Json(ApiResponse::ok(forecast)))
}
