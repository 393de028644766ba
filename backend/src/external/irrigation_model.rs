//! Irrigation Model Client
//!
//! Client for the predictive irrigation model microservice. The service takes
//! a batch of normalized feature vectors and answers with a 14-day schedule.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::irrigation::NormalizedFeatureVector;
use shared::DailySchedule;

use crate::error::{AppError, AppResult, Upstream};
use crate::external::IrrigationModel;

/// Client for the irrigation model microservice
#[derive(Clone)]
pub struct IrrigationModelClient {
    endpoint: String,
    http_client: Client,
}

/// Request body; the service still names its input `image_data`
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub image_data: &'a [NormalizedFeatureVector],
}

/// Response from the prediction endpoint
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: Option<Prediction>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub schedule: Vec<u8>,
    pub quantity: Vec<f64>,
}

impl IrrigationModelClient {
    /// Create a new irrigation model client
    pub fn new(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Send a feature batch and return the validated schedule
    pub async fn request_prediction(
        &self,
        batch: &[NormalizedFeatureVector],
    ) -> AppResult<DailySchedule> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&PredictRequest { image_data: batch })
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::warn!("Irrigation model request failed: {}", e);
                let reason = if e.is_timeout() {
                    "request timed out"
                } else {
                    "request failed"
                };
                model_error(reason)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read irrigation model response: {}", e);
            model_error("response body could not be read")
        })?;

        let parsed: Option<PredictResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            tracing::warn!("Irrigation model returned {}: {}", status, body);
            let reason = parsed
                .and_then(|p| p.error)
                .unwrap_or_else(|| format!("service returned HTTP {}", status.as_u16()));
            return Err(model_error(reason));
        }

        match parsed {
            Some(prediction) => decode_prediction(prediction),
            None => {
                tracing::warn!("Unparseable irrigation model response: {}", body);
                Err(model_error("malformed response: body is not a prediction"))
            }
        }
    }
}

#[axum::async_trait]
impl IrrigationModel for IrrigationModelClient {
    async fn predict(&self, batch: &[NormalizedFeatureVector]) -> AppResult<DailySchedule> {
        self.request_prediction(batch).await
    }
}

fn model_error(message: impl Into<String>) -> AppError {
    AppError::upstream(Upstream::Model, "prediction", message)
}

/// Turn a parsed response into a schedule, rejecting anything off-shape
pub fn decode_prediction(response: PredictResponse) -> AppResult<DailySchedule> {
    if !response.success {
        let reason = response
            .error
            .unwrap_or_else(|| "service reported failure without a reason".to_string());
        return Err(model_error(reason));
    }

    let prediction = response
        .prediction
        .ok_or_else(|| model_error("malformed response: prediction is missing"))?;

    Ok(DailySchedule::from_parts(
        &prediction.schedule,
        &prediction.quantity,
    )?)
}
