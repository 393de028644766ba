//! Error handling for the Crop Irrigation Planner
//!
//! Every failure is rendered as `{ "success": false, "code", "message" }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ScheduleError;
use thiserror::Error;

/// External collaborators the pipeline depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Weather,
    Model,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Upstream::Weather => write!(f, "weather service"),
            Upstream::Model => write!(f, "irrigation model service"),
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unknown water needs tier: {0}")]
    InvalidTier(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    // External service errors
    #[error("{service} unavailable ({context}): {message}")]
    UpstreamUnavailable {
        service: Upstream,
        context: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn upstream(service: Upstream, context: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable {
            service,
            context: context.into(),
            message: message.into(),
        }
    }

    /// Attach the crop a collaborator call was made for
    pub fn for_crop(self, crop_id: uuid::Uuid) -> Self {
        match self {
            AppError::UpstreamUnavailable {
                service, message, ..
            } => AppError::UpstreamUnavailable {
                service,
                context: format!("crop {}", crop_id),
                message,
            },
            other => other,
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidTier(tier) => AppError::InvalidTier(tier),
            ScheduleError::MalformedSchedule(msg) => {
                AppError::upstream(Upstream::Model, "prediction", format!("malformed response: {}", msg))
            }
            ScheduleError::InvalidWaterRequirement(msg) => AppError::Validation {
                field: "waterRequirement".to_string(),
                message: msg,
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        let (status, code, message, field) = match self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found.", resource),
                None,
            ),
            AppError::InvalidTier(tier) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_TIER",
                format!("Unknown water needs tier '{}'", tier),
                Some("waterNeeds".to_string()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                message.clone(),
                Some(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::UpstreamUnavailable {
                service,
                context,
                message,
            } => (
                match service {
                    Upstream::Weather => StatusCode::SERVICE_UNAVAILABLE,
                    Upstream::Model => StatusCode::BAD_GATEWAY,
                },
                "UPSTREAM_UNAVAILABLE",
                format!("The {} failed for {}: {}", service, context, message),
                None,
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                format!("Configuration error: {}", msg),
                None,
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
                None,
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                None,
            ),
        };

        (
            status,
            ErrorResponse {
                success: false,
                code: code.to_string(),
                message,
                field,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
