//! Feature vectors for the predictive model

use chrono::NaiveDate;

use crate::irrigation::normalize::Feature;
use crate::models::{
    forecast_day_or_last, Crop, CropStage, DailyForecast, WaterNeedsTier, HORIZON_DAYS,
};

pub const FEATURE_COUNT: usize = 7;

/// One day of model input; see [`Feature::ORDERED`] for the column order
pub type NormalizedFeatureVector = [f64; FEATURE_COUNT];

/// Temperature used when no forecast day is available
pub const FALLBACK_TEMPERATURE_CELSIUS: f64 = 25.0;

/// Field measurements not yet backed by telemetry.
///
/// The defaults describe average conditions: slightly dry soil, moderate
/// humidity and no rain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldConditions {
    pub soil_moisture: f64,
    pub humidity_percent: f64,
    pub rainfall_mm: f64,
}

impl Default for FieldConditions {
    fn default() -> Self {
        Self {
            soil_moisture: 40.0,
            humidity_percent: 60.0,
            rainfall_mm: 0.0,
        }
    }
}

/// Crop attributes the model consumes
#[derive(Debug, Clone, PartialEq)]
pub struct CropProfile {
    pub days_since_planted: i64,
    pub stage: CropStage,
    pub water_needs: WaterNeedsTier,
}

impl CropProfile {
    pub fn from_crop(crop: &Crop, today: NaiveDate) -> Self {
        Self {
            days_since_planted: crop.days_since_planted(today),
            stage: crop.stage.clone(),
            water_needs: crop.water_needs,
        }
    }
}

/// Build the 14-day batch submitted to the model in one request
pub fn build_feature_batch(
    profile: &CropProfile,
    forecast: &[DailyForecast],
    conditions: &FieldConditions,
) -> Vec<NormalizedFeatureVector> {
    let stage_code = profile.stage.stage_code();
    let needs_code = profile.water_needs.needs_code();

    (0..HORIZON_DAYS)
        .map(|day| {
            let temperature = forecast_day_or_last(forecast, day)
                .and_then(|f| f.temp_max_celsius)
                .unwrap_or(FALLBACK_TEMPERATURE_CELSIUS);
            let crop_age = (profile.days_since_planted + day as i64) as f64;

            [
                Feature::SoilMoisture.normalize(conditions.soil_moisture),
                Feature::Temperature.normalize(temperature),
                Feature::Humidity.normalize(conditions.humidity_percent),
                Feature::Rainfall.normalize(conditions.rainfall_mm),
                Feature::CropAge.normalize(crop_age),
                Feature::CropStage.normalize(stage_code),
                Feature::WaterNeeds.normalize(needs_code),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CropProfile {
        CropProfile {
            days_since_planted: 20,
            stage: CropStage::Growing,
            water_needs: WaterNeedsTier::High,
        }
    }

    fn day(n: u32, max: Option<f64>) -> DailyForecast {
        DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 6, n).unwrap(),
            temp_min_celsius: None,
            temp_max_celsius: max,
            icon: "01d".to_string(),
        }
    }

    #[test]
    fn test_batch_shape_and_bounds() {
        let batch = build_feature_batch(&profile(), &[day(1, Some(34.0))], &FieldConditions::default());
        assert_eq!(batch.len(), HORIZON_DAYS);
        for vector in &batch {
            assert!(vector.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_column_values() {
        let forecast = vec![day(1, Some(25.0)), day(2, Some(40.0))];
        let batch = build_feature_batch(&profile(), &forecast, &FieldConditions::default());

        assert!((batch[0][0] - 30.0 / 85.0).abs() < 1e-12);
        assert_eq!(batch[0][1], 0.5);
        assert!((batch[0][2] - 40.0 / 75.0).abs() < 1e-12);
        assert_eq!(batch[0][3], 0.0);
        assert!((batch[0][4] - 15.0 / 95.0).abs() < 1e-12);
        assert!((batch[0][5] - 0.25 / 0.75).abs() < 1e-12);
        assert!((batch[0][6] - 1.0).abs() < 1e-12);

        // crop age advances one day per row
        assert!((batch[5][4] - 20.0 / 95.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_forecast_reuses_last_day() {
        let forecast = vec![day(1, Some(25.0)), day(2, Some(40.0))];
        let batch = build_feature_batch(&profile(), &forecast, &FieldConditions::default());
        assert_eq!(batch[1][1], 1.0);
        assert_eq!(batch[13][1], 1.0);
    }

    #[test]
    fn test_missing_forecast_uses_fallback_temperature() {
        let batch = build_feature_batch(&profile(), &[], &FieldConditions::default());
        assert!(batch.iter().all(|v| v[1] == 0.5));

        let batch = build_feature_batch(&profile(), &[day(1, None)], &FieldConditions::default());
        assert_eq!(batch[0][1], 0.5);
    }

    #[test]
    fn test_unknown_stage_uses_default_code() {
        let profile = CropProfile {
            stage: CropStage::Other("Dormant".to_string()),
            ..profile()
        };
        let batch = build_feature_batch(&profile, &[], &FieldConditions::default());
        assert!((batch[0][5] - 0.25 / 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_telemetry_overrides_placeholders() {
        let conditions = FieldConditions {
            soil_moisture: 95.0,
            humidity_percent: 20.0,
            rainfall_mm: 15.0,
        };
        let batch = build_feature_batch(&profile(), &[], &conditions);
        assert_eq!(batch[0][0], 1.0);
        assert_eq!(batch[0][2], 0.0);
        assert_eq!(batch[0][3], 1.0);
    }
}
