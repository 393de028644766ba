//! Crop management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{ApiResponse, Crop};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::crop::CreateCropInput;
use crate::AppState;

/// List all crops
pub async fn list_crops(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Crop>>>> {
    let crops = state.crops.list_crops().await?;
    Ok(Json(ApiResponse::ok(crops)))
}

/// Get a specific crop
pub async fn get_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Crop>>> {
    let crop = state.crops.find_crop(crop_id).await?;
    Ok(Json(ApiResponse::ok(crop)))
}

/// Create a new crop
pub async fn create_crop(
    State(state): State<AppState>,
    Json(input): Json<CreateCropInput>,
) -> impl IntoResponse {
    match state.crops.create_crop(input).await {
        Ok(crop) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_message(crop, "Crop created successfully.")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
