//! Weather API client for fetching forecast data
//!
//! Integrates with the OpenWeatherMap 5-day / 3-hour forecast and collapses
//! it into one entry per calendar day.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{DailyForecast, GpsCoordinates, WeatherForecast};

use crate::error::{AppError, AppResult, Upstream};
use crate::external::ForecastProvider;

/// Distinct days kept from the 3-hourly forecast
const MAX_FORECAST_DAYS: usize = 5;

/// Timestamps requested per call (5 days of 3-hour steps)
const FORECAST_TIMESTAMPS: u32 = 40;

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: OWMCity,
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    icon: String,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            base_url,
        })
    }

    /// Fetch the daily forecast by GPS coordinates
    pub async fn get_forecast(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<WeatherForecast> {
        if self.api_key.is_empty() {
            return Err(AppError::upstream(
                Upstream::Weather,
                "forecast",
                "API key is not configured",
            ));
        }

        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric&cnt={}",
            self.base_url, latitude, longitude, self.api_key, FORECAST_TIMESTAMPS
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            let e = e.without_url();
            tracing::warn!("Weather API request failed: {}", e);
            let reason = if e.is_timeout() {
                "request timed out"
            } else {
                "request failed"
            };
            AppError::upstream(Upstream::Weather, "forecast", reason)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API error: {} - {}", status, body);
            return Err(AppError::upstream(
                Upstream::Weather,
                "forecast",
                format!("provider returned HTTP {}", status.as_u16()),
            ));
        }

        let data: OWMForecastResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse forecast response: {}", e.without_url());
            AppError::upstream(Upstream::Weather, "forecast", "unreadable forecast response")
        })?;

        let forecast = convert_forecast_response(data, GpsCoordinates::new(latitude, longitude));
        tracing::debug!(
            "Fetched {} forecast days for {}",
            forecast.daily.len(),
            forecast.location_name
        );
        Ok(forecast)
    }
}

#[axum::async_trait]
impl ForecastProvider for WeatherClient {
    async fn daily_forecast(&self, location: &GpsCoordinates) -> AppResult<WeatherForecast> {
        self.get_forecast(location.latitude, location.longitude).await
    }
}

/// Collapse 3-hourly entries into one entry per day, in time order
fn convert_forecast_response(data: OWMForecastResponse, location: GpsCoordinates) -> WeatherForecast {
    let mut daily: Vec<DailyForecast> = Vec::new();

    for item in data.list {
        let Some(date) = DateTime::from_timestamp(item.dt, 0).map(|t| t.date_naive()) else {
            continue;
        };

        if let Some(index) = daily.iter().position(|d| d.date == date) {
            let day = &mut daily[index];
            day.temp_min_celsius = min_option(day.temp_min_celsius, item.main.temp_min);
            day.temp_max_celsius = max_option(day.temp_max_celsius, item.main.temp_max);
        } else if daily.len() < MAX_FORECAST_DAYS {
            daily.push(new_day(date, &item));
        }
    }

    WeatherForecast {
        location_name: data.city.name,
        location,
        daily,
    }
}

fn new_day(date: NaiveDate, item: &OWMForecastItem) -> DailyForecast {
    DailyForecast {
        date,
        temp_min_celsius: item.main.temp_min,
        temp_max_celsius: item.main.temp_max,
        icon: item
            .weather
            .first()
            .map(|w| w.icon.clone())
            .unwrap_or_else(|| "01d".to_string()),
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
