//! Irrigation schedule HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{ApiResponse, ScheduleSource, ScheduleView};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::schedule::ScheduleViewKind;
use crate::AppState;

/// Query parameters for schedule generation
#[derive(Debug, Deserialize)]
pub struct GenerateScheduleQuery {
    pub source: Option<ScheduleSource>,
    #[serde(default)]
    pub view: ScheduleViewKind,
}

/// Query parameters for schedule retrieval
#[derive(Debug, Deserialize)]
pub struct ScheduleViewQuery {
    #[serde(default)]
    pub view: ScheduleViewKind,
}

/// Generate and store a new schedule for a crop
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(crop_id): Path<Uuid>,
    Query(query): Query<GenerateScheduleQuery>,
) -> AppResult<Json<ApiResponse<ScheduleView>>> {
    let source = query
        .source
        .unwrap_or(state.config.schedule.default_source);

    let view = state
        .schedules
        .generate_view(crop_id, source, query.view)
        .await?;

    Ok(Json(ApiResponse::with_message(
        view,
        "Irrigation schedule generated successfully.",
    )))
}

/// Get the latest schedule stored for a crop
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(crop_id): Path<Uuid>,
    Query(query): Query<ScheduleViewQuery>,
) -> AppResult<Json<ApiResponse<ScheduleView>>> {
    let view = state.schedules.latest(crop_id, query.view).await?;
    Ok(Json(ApiResponse::ok(view)))
}
