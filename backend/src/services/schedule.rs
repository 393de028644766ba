//! Irrigation schedule generation and retrieval
//!
//! Generation has two paths. The simulated path runs the moisture depletion
//! simulator locally. The predicted path fetches a weather forecast, builds
//! one normalized feature vector per day and asks the model service for a
//! schedule. Either way the raw schedule is stored on the crop; the dry-day
//! quota is applied only when a schedule is rendered for display.

use std::sync::Arc;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use uuid::Uuid;

use shared::irrigation::{
    build_feature_batch, rebalance, simulate_schedule, CropProfile, DrawSource, FieldConditions,
    RngDraws,
};
use shared::{Crop, GeneratedSchedule, GpsCoordinates, ScheduleSource, ScheduleView};

use crate::error::{AppError, AppResult};
use crate::external::{ForecastProvider, IrrigationModel};
use crate::services::crop::CropStore;

/// How a stored schedule is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleViewKind {
    /// Dry-day quota of the crop's tier applied
    #[default]
    Display,
    /// Exactly what the generator produced
    Raw,
}

/// Schedule pipeline over its collaborators
#[derive(Clone)]
pub struct ScheduleService {
    crops: Arc<dyn CropStore>,
    forecasts: Arc<dyn ForecastProvider>,
    model: Arc<dyn IrrigationModel>,
    default_location: GpsCoordinates,
}

impl ScheduleService {
    pub fn new(
        crops: Arc<dyn CropStore>,
        forecasts: Arc<dyn ForecastProvider>,
        model: Arc<dyn IrrigationModel>,
        default_location: GpsCoordinates,
    ) -> Self {
        Self {
            crops,
            forecasts,
            model,
            default_location,
        }
    }

    /// Generate and store a fresh schedule, rendered in the requested view
    pub async fn generate_view(
        &self,
        crop_id: Uuid,
        source: ScheduleSource,
        kind: ScheduleViewKind,
    ) -> AppResult<ScheduleView> {
        let mut draws = RngDraws::new(StdRng::from_entropy());
        let (crop, generated) = self.generate_with(crop_id, source, &mut draws).await?;
        Ok(render(&crop, &generated, kind))
    }

    /// Generate and store a schedule using caller-supplied simulator draws.
    ///
    /// Returns the crop alongside the schedule so callers can render it
    /// without reading the crop again.
    pub async fn generate_with<D>(
        &self,
        crop_id: Uuid,
        source: ScheduleSource,
        draws: &mut D,
    ) -> AppResult<(Crop, GeneratedSchedule)>
    where
        D: DrawSource + Send,
    {
        let crop = self.crops.get_crop(crop_id).await?;

        let generated = match source {
            ScheduleSource::Simulated => simulate_schedule(&crop, draws)?,
            ScheduleSource::Predicted => self.predict(&crop).await?,
        };

        self.crops.save_schedule(crop_id, &generated).await?;

        tracing::info!(
            "Generated {} schedule for crop {}: {} watering days, {:.1} L",
            generated.source,
            crop_id,
            generated.schedule.watering_day_count(),
            generated.schedule.total_volume()
        );

        Ok((crop, generated))
    }

    async fn predict(&self, crop: &Crop) -> AppResult<GeneratedSchedule> {
        let location = crop
            .location
            .clone()
            .unwrap_or_else(|| self.default_location.clone());

        let forecast = self
            .forecasts
            .daily_forecast(&location)
            .await
            .map_err(|e| e.for_crop(crop.id))?;

        let profile = CropProfile::from_crop(crop, Utc::now().date_naive());
        let batch = build_feature_batch(&profile, &forecast.daily, &FieldConditions::default());
        tracing::debug!(
            "Built {} feature vectors for crop {} from {} forecast days",
            batch.len(),
            crop.id,
            forecast.daily.len()
        );

        let schedule = self
            .model
            .predict(&batch)
            .await
            .map_err(|e| e.for_crop(crop.id))?;

        Ok(GeneratedSchedule::new(ScheduleSource::Predicted, schedule))
    }

    /// Latest stored schedule for the crop in the requested view
    pub async fn latest(&self, crop_id: Uuid, kind: ScheduleViewKind) -> AppResult<ScheduleView> {
        let crop = self.crops.get_crop(crop_id).await?;
        let generated = self
            .crops
            .latest_schedule(crop_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Irrigation schedule".to_string()))?;

        Ok(render(&crop, &generated, kind))
    }
}

/// Render a schedule for the crop it belongs to
fn render(crop: &Crop, generated: &GeneratedSchedule, kind: ScheduleViewKind) -> ScheduleView {
    match kind {
        ScheduleViewKind::Raw => generated.raw_view(),
        ScheduleViewKind::Display => generated.view(&rebalance(&generated.schedule, crop.water_needs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Upstream;
    use chrono::NaiveDate;
    use shared::irrigation::{FixedDraws, NormalizedFeatureVector};
    use shared::{
        CropStage, DailyForecast, DailySchedule, WaterNeedsTier, WaterRequirement, WeatherForecast,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryCropStore {
        crops: HashMap<Uuid, Crop>,
        schedules: Mutex<HashMap<Uuid, GeneratedSchedule>>,
        lookups: AtomicUsize,
    }

    #[axum::async_trait]
    impl CropStore for MemoryCropStore {
        async fn get_crop(&self, crop_id: Uuid) -> AppResult<Crop> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.crops
                .get(&crop_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Crop".to_string()))
        }

        async fn save_schedule(&self, crop_id: Uuid, generated: &GeneratedSchedule) -> AppResult<()> {
            self.schedules
                .lock()
                .unwrap()
                .insert(crop_id, generated.clone());
            Ok(())
        }

        async fn latest_schedule(&self, crop_id: Uuid) -> AppResult<Option<GeneratedSchedule>> {
            Ok(self.schedules.lock().unwrap().get(&crop_id).cloned())
        }
    }

    struct StaticForecast {
        requested: Mutex<Vec<GpsCoordinates>>,
        fail: bool,
    }

    #[axum::async_trait]
    impl ForecastProvider for StaticForecast {
        async fn daily_forecast(&self, location: &GpsCoordinates) -> AppResult<WeatherForecast> {
            self.requested.lock().unwrap().push(location.clone());
            if self.fail {
                return Err(AppError::upstream(Upstream::Weather, "forecast", "request timed out"));
            }
            Ok(WeatherForecast {
                location_name: "Test Farm".to_string(),
                location: location.clone(),
                daily: vec![DailyForecast {
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    temp_min_celsius: Some(21.0),
                    temp_max_celsius: Some(33.0),
                    icon: "01d".to_string(),
                }],
            })
        }
    }

    /// Waters every day with 2 L and records the batch it was given
    struct EveryDayModel {
        batches: Mutex<Vec<Vec<NormalizedFeatureVector>>>,
    }

    #[axum::async_trait]
    impl IrrigationModel for EveryDayModel {
        async fn predict(&self, batch: &[NormalizedFeatureVector]) -> AppResult<DailySchedule> {
            self.batches.lock().unwrap().push(batch.to_vec());
            Ok(DailySchedule::from_parts(&[1; 14], &[2.0; 14])?)
        }
    }

    struct Harness {
        service: ScheduleService,
        store: Arc<MemoryCropStore>,
        forecast: Arc<StaticForecast>,
        model: Arc<EveryDayModel>,
    }

    impl Harness {
        async fn generate(&self, crop_id: Uuid, source: ScheduleSource) -> AppResult<GeneratedSchedule> {
            let (_, generated) = self
                .service
                .generate_with(crop_id, source, &mut FixedDraws::neutral())
                .await?;
            Ok(generated)
        }
    }

    fn crop(tier: WaterNeedsTier, location: Option<GpsCoordinates>) -> Crop {
        Crop {
            id: Uuid::new_v4(),
            name: "Tomato".to_string(),
            stage: CropStage::Growing,
            water_needs: tier,
            water_requirement: WaterRequirement::new(2.5, 2.0),
            planted_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            location,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn default_location() -> GpsCoordinates {
        GpsCoordinates::new("12.9716".parse().unwrap(), "77.5946".parse().unwrap())
    }

    fn harness(crops: Vec<Crop>, weather_fails: bool) -> Harness {
        let store = Arc::new(MemoryCropStore {
            crops: crops.into_iter().map(|c| (c.id, c)).collect(),
            ..Default::default()
        });
        let forecast = Arc::new(StaticForecast {
            requested: Mutex::new(Vec::new()),
            fail: weather_fails,
        });
        let model = Arc::new(EveryDayModel {
            batches: Mutex::new(Vec::new()),
        });
        let service = ScheduleService::new(
            store.clone(),
            forecast.clone(),
            model.clone(),
            default_location(),
        );
        Harness {
            service,
            store,
            forecast,
            model,
        }
    }

    #[tokio::test]
    async fn test_simulated_schedule_is_stored_raw() {
        let crop = crop(WaterNeedsTier::Medium, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        let generated = h.generate(crop_id, ScheduleSource::Simulated).await.unwrap();

        // 75, 50, 25 -> water on day 2, then every third day
        let expected: Vec<usize> = vec![2, 5, 8, 11];
        let days: Vec<usize> = generated.schedule.watering_days().map(|(d, _)| d).collect();
        assert_eq!(days, expected);
        assert_eq!(generated.source, ScheduleSource::Simulated);

        let stored = h.store.latest_schedule(crop_id).await.unwrap().unwrap();
        assert_eq!(stored.schedule, generated.schedule);
    }

    #[tokio::test]
    async fn test_predicted_schedule_uses_forecast_and_model() {
        let crop = crop(WaterNeedsTier::High, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        let generated = h.generate(crop_id, ScheduleSource::Predicted).await.unwrap();

        assert_eq!(generated.source, ScheduleSource::Predicted);
        assert_eq!(generated.schedule.watering_day_count(), 14);

        // no crop location, so the default is used
        assert_eq!(h.forecast.requested.lock().unwrap()[0], default_location());

        let batches = h.model.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 14);
        // 33 C on the only forecast day, reused for the whole horizon
        assert!(batches[0].iter().all(|v| (v[1] - 23.0 / 30.0).abs() < 1e-12));
    }

    #[tokio::test]
    async fn test_crop_location_is_preferred() {
        let location = GpsCoordinates::new("18.7883".parse().unwrap(), "98.9853".parse().unwrap());
        let crop = crop(WaterNeedsTier::Low, Some(location.clone()));
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        h.generate(crop_id, ScheduleSource::Predicted).await.unwrap();
        assert_eq!(h.forecast.requested.lock().unwrap()[0], location);
    }

    #[tokio::test]
    async fn test_weather_failure_names_crop_and_skips_model() {
        let crop = crop(WaterNeedsTier::Medium, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], true);

        let err = h.generate(crop_id, ScheduleSource::Predicted).await.unwrap_err();

        match err {
            AppError::UpstreamUnavailable {
                service, context, ..
            } => {
                assert_eq!(service, Upstream::Weather);
                assert_eq!(context, format!("crop {}", crop_id));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(h.model.batches.lock().unwrap().is_empty());
        assert!(h.store.latest_schedule(crop_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_crop_is_not_found() {
        let h = harness(vec![], false);
        let err = h
            .generate(Uuid::new_v4(), ScheduleSource::Simulated)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_display_view_applies_quota_raw_does_not() {
        let crop = crop(WaterNeedsTier::High, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        h.generate(crop_id, ScheduleSource::Predicted).await.unwrap();

        let display = h.service.latest(crop_id, ScheduleViewKind::Display).await.unwrap();
        let raw = h.service.latest(crop_id, ScheduleViewKind::Raw).await.unwrap();

        assert_eq!(display.schedule.iter().filter(|&&f| f == 0).count(), 4);
        assert_eq!(raw.schedule.iter().filter(|&&f| f == 0).count(), 0);
        assert_eq!(display.generated_at, raw.generated_at);
    }

    #[tokio::test]
    async fn test_generate_view_reads_crop_once() {
        let crop = crop(WaterNeedsTier::High, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        let view = h
            .service
            .generate_view(crop_id, ScheduleSource::Predicted, ScheduleViewKind::Display)
            .await
            .unwrap();

        assert_eq!(h.store.lookups.load(Ordering::SeqCst), 1);
        // High tier shows 4 dry days even though the model watered all 14
        assert_eq!(view.schedule.iter().filter(|&&f| f == 0).count(), 4);
        let stored = h.store.latest_schedule(crop_id).await.unwrap().unwrap();
        assert_eq!(stored.schedule.watering_day_count(), 14);
    }

    #[tokio::test]
    async fn test_generate_view_raw_matches_stored_schedule() {
        let crop = crop(WaterNeedsTier::Low, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        let view = h
            .service
            .generate_view(crop_id, ScheduleSource::Predicted, ScheduleViewKind::Raw)
            .await
            .unwrap();

        assert_eq!(view.schedule, vec![1u8; 14]);
        assert_eq!(h.store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_latest_without_schedule_is_not_found() {
        let crop = crop(WaterNeedsTier::Low, None);
        let crop_id = crop.id;
        let h = harness(vec![crop], false);

        let err = h
            .service
            .latest(crop_id, ScheduleViewKind::Display)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref r) if r == "Irrigation schedule"));
    }
}
