//! External API integrations

pub mod irrigation_model;
pub mod weather;

use shared::irrigation::NormalizedFeatureVector;
use shared::{DailySchedule, GpsCoordinates, WeatherForecast};

use crate::error::AppResult;

pub use irrigation_model::IrrigationModelClient;
pub use weather::WeatherClient;

/// Daily weather forecast for a location
#[axum::async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn daily_forecast(&self, location: &GpsCoordinates) -> AppResult<WeatherForecast>;
}

/// Predictive model turning one feature vector per day into a schedule
#[axum::async_trait]
pub trait IrrigationModel: Send + Sync {
    async fn predict(&self, batch: &[NormalizedFeatureVector]) -> AppResult<DailySchedule>;
}
