//! Weather data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// Simplified daily forecast consumed by the dashboard and the feature builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub location_name: String,
    pub location: GpsCoordinates,
    pub daily: Vec<DailyForecast>,
}

/// One forecast day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_min_celsius: Option<f64>,
    pub temp_max_celsius: Option<f64>,
    pub icon: String,
}

/// Forecast for `day_offset`, reusing the last known day when the
/// forecast is shorter than requested
pub fn forecast_day_or_last(daily: &[DailyForecast], day_offset: usize) -> Option<&DailyForecast> {
    if daily.is_empty() {
        return None;
    }
    daily.get(day_offset.min(daily.len() - 1))
}
