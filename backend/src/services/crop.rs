//! Crop records and their persisted irrigation schedules

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use shared::{
    validate_coordinates, validate_crop_name, validate_planted_date, validate_water_requirement,
    Crop, CropStage, DailySchedule, GeneratedSchedule, GpsCoordinates, ScheduleError,
    ScheduleSource, WaterNeedsTier, WaterRequirement,
};

use crate::error::{AppError, AppResult};

/// Crop lookup and schedule persistence used by the schedule pipeline
#[axum::async_trait]
pub trait CropStore: Send + Sync {
    async fn get_crop(&self, crop_id: Uuid) -> AppResult<Crop>;

    /// Attach a schedule to the crop, replacing any earlier one
    async fn save_schedule(&self, crop_id: Uuid, generated: &GeneratedSchedule) -> AppResult<()>;

    async fn latest_schedule(&self, crop_id: Uuid) -> AppResult<Option<GeneratedSchedule>>;
}

/// Crop service backed by PostgreSQL
#[derive(Clone)]
pub struct CropService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CropRow {
    id: Uuid,
    name: String,
    stage: String,
    water_needs: String,
    daily_amount_liters: f64,
    watering_frequency: f64,
    planted_date: NaiveDate,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CropRow> for Crop {
    type Error = ScheduleError;

    fn try_from(row: CropRow) -> Result<Self, Self::Error> {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GpsCoordinates::new(latitude, longitude)),
            _ => None,
        };

        Ok(Crop {
            id: row.id,
            name: row.name,
            stage: CropStage::from(row.stage),
            water_needs: row.water_needs.parse()?,
            water_requirement: WaterRequirement::new(row.daily_amount_liters, row.watering_frequency),
            planted_date: row.planted_date,
            location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ScheduleRow {
    source: String,
    schedule: Json<DailySchedule>,
    generated_at: DateTime<Utc>,
}

impl TryFrom<ScheduleRow> for GeneratedSchedule {
    type Error = AppError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let source: ScheduleSource = row.source.parse().map_err(AppError::Internal)?;
        Ok(GeneratedSchedule {
            source,
            schedule: row.schedule.0,
            generated_at: row.generated_at,
        })
    }
}

/// Input for creating a crop
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCropInput {
    pub name: String,
    pub stage: String,
    pub water_needs: String,
    pub water_requirement: WaterRequirement,
    pub planted_date: NaiveDate,
    pub location: Option<GpsCoordinates>,
}

impl CreateCropInput {
    /// Validate the input and resolve its tier label
    pub fn validate(&self, today: NaiveDate) -> AppResult<WaterNeedsTier> {
        validate_crop_name(&self.name).map_err(|msg| validation("name", msg))?;

        if self.stage.trim().is_empty() {
            return Err(validation("stage", "Crop stage cannot be empty"));
        }

        let tier: WaterNeedsTier = self.water_needs.parse()?;

        validate_water_requirement(&self.water_requirement)
            .map_err(|msg| validation("waterRequirement", msg))?;
        validate_planted_date(self.planted_date, today)
            .map_err(|msg| validation("plantedDate", msg))?;

        if let Some(location) = &self.location {
            validate_coordinates(location).map_err(|msg| validation("location", msg))?;
        }

        Ok(tier)
    }
}

fn validation(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

const CROP_COLUMNS: &str = r#"
    id, name, stage, water_needs, daily_amount_liters, watering_frequency,
    planted_date, latitude, longitude, created_at, updated_at
"#;

impl CropService {
    /// Create a new CropService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List every crop, newest first
    pub async fn list_crops(&self) -> AppResult<Vec<Crop>> {
        let rows = sqlx::query_as::<_, CropRow>(&format!(
            "SELECT {} FROM crops ORDER BY created_at DESC",
            CROP_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(decode_crop_rows(rows))
    }

    /// Get a crop by ID
    pub async fn find_crop(&self, crop_id: Uuid) -> AppResult<Crop> {
        let row = sqlx::query_as::<_, CropRow>(&format!(
            "SELECT {} FROM crops WHERE id = $1",
            CROP_COLUMNS
        ))
        .bind(crop_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop".to_string()))?;

        Ok(Crop::try_from(row)?)
    }

    /// Create a new crop
    pub async fn create_crop(&self, input: CreateCropInput) -> AppResult<Crop> {
        let tier = input.validate(Utc::now().date_naive())?;

        let (latitude, longitude) = match &input.location {
            Some(location) => (Some(location.latitude), Some(location.longitude)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, CropRow>(&format!(
            r#"
            INSERT INTO crops (id, name, stage, water_needs, daily_amount_liters,
                               watering_frequency, planted_date, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CROP_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.stage.trim())
        .bind(tier.label())
        .bind(input.water_requirement.daily_amount)
        .bind(input.water_requirement.frequency)
        .bind(input.planted_date)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(&self.db)
        .await?;

        let crop = Crop::try_from(row)?;
        tracing::info!("Created crop {} ({})", crop.id, crop.name);
        Ok(crop)
    }
}

#[axum::async_trait]
impl CropStore for CropService {
    async fn get_crop(&self, crop_id: Uuid) -> AppResult<Crop> {
        self.find_crop(crop_id).await
    }

    async fn save_schedule(&self, crop_id: Uuid, generated: &GeneratedSchedule) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO irrigation_schedules (crop_id, source, schedule, generated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (crop_id) DO UPDATE
            SET source = EXCLUDED.source,
                schedule = EXCLUDED.schedule,
                generated_at = EXCLUDED.generated_at
            "#,
        )
        .bind(crop_id)
        .bind(generated.source.as_str())
        .bind(Json(&generated.schedule))
        .bind(generated.generated_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn latest_schedule(&self, crop_id: Uuid) -> AppResult<Option<GeneratedSchedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT source, schedule, generated_at
            FROM irrigation_schedules
            WHERE crop_id = $1
            "#,
        )
        .bind(crop_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(GeneratedSchedule::try_from).transpose()
    }
}

/// Decode listed rows, skipping any that no longer hold a known tier
fn decode_crop_rows(rows: Vec<CropRow>) -> Vec<Crop> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Crop::try_from(row) {
                Ok(crop) => Some(crop),
                Err(e) => {
                    tracing::warn!("Skipping crop {} in listing: {}", id, e);
                    None
                }
            }
        })
        .collect()
}
