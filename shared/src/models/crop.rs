//! Crop records and their water-needs classification

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::types::GpsCoordinates;

/// Water-needs classification of a crop.
///
/// Drives both the simulated depletion rate and the dry-day quota enforced
/// on displayed schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterNeedsTier {
    Low,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl WaterNeedsTier {
    pub const ALL: [WaterNeedsTier; 4] = [
        WaterNeedsTier::Low,
        WaterNeedsTier::Medium,
        WaterNeedsTier::MediumHigh,
        WaterNeedsTier::High,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WaterNeedsTier::Low => "Low",
            WaterNeedsTier::Medium => "Medium",
            WaterNeedsTier::MediumHigh => "Medium-High",
            WaterNeedsTier::High => "High",
        }
    }

    /// Moisture units lost per day at a neutral weather factor of 1.0
    pub fn depletion_rate(&self) -> f64 {
        match self {
            WaterNeedsTier::Low => 15.0,
            WaterNeedsTier::Medium => 25.0,
            WaterNeedsTier::MediumHigh => 35.0,
            WaterNeedsTier::High => 45.0,
        }
    }

    /// Minimum number of dry days per week on a displayed schedule
    pub fn zero_days_per_week(&self) -> usize {
        match self {
            WaterNeedsTier::Low => 5,
            WaterNeedsTier::Medium => 4,
            WaterNeedsTier::MediumHigh => 3,
            WaterNeedsTier::High => 2,
        }
    }

    /// Numeric code fed to the predictive model
    pub fn needs_code(&self) -> f64 {
        match self {
            WaterNeedsTier::Low => 0.2,
            WaterNeedsTier::Medium => 0.5,
            WaterNeedsTier::MediumHigh => 0.7,
            WaterNeedsTier::High => 0.9,
        }
    }
}

impl FromStr for WaterNeedsTier {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(WaterNeedsTier::Low),
            "Medium" => Ok(WaterNeedsTier::Medium),
            "Medium-High" => Ok(WaterNeedsTier::MediumHigh),
            "High" => Ok(WaterNeedsTier::High),
            other => Err(ScheduleError::InvalidTier(other.to_string())),
        }
    }
}

impl std::fmt::Display for WaterNeedsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Growth stage of a crop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CropStage {
    Seedling,
    Growing,
    Mature,
    Harvesting,
    /// Stage label not known to the model
    Other(String),
}

/// Stage code used when the stage is not one the model was trained on
pub const DEFAULT_STAGE_CODE: f64 = 0.5;

impl CropStage {
    /// Numeric code fed to the predictive model
    pub fn stage_code(&self) -> f64 {
        match self {
            CropStage::Seedling => 0.25,
            CropStage::Growing => 0.5,
            CropStage::Mature => 0.75,
            CropStage::Harvesting => 1.0,
            CropStage::Other(_) => DEFAULT_STAGE_CODE,
        }
    }
}

impl From<String> for CropStage {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Seedling" => CropStage::Seedling,
            "Growing" => CropStage::Growing,
            "Mature" => CropStage::Mature,
            "Harvesting" => CropStage::Harvesting,
            _ => CropStage::Other(label),
        }
    }
}

impl From<CropStage> for String {
    fn from(stage: CropStage) -> Self {
        stage.to_string()
    }
}

impl std::fmt::Display for CropStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropStage::Seedling => write!(f, "Seedling"),
            CropStage::Growing => write!(f, "Growing"),
            CropStage::Mature => write!(f, "Mature"),
            CropStage::Harvesting => write!(f, "Harvesting"),
            CropStage::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Crop-specific watering parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterRequirement {
    /// Liters per watering
    pub daily_amount: f64,
    /// Watering multiplier applied on each irrigation event
    pub frequency: f64,
}

impl WaterRequirement {
    pub fn new(daily_amount: f64, frequency: f64) -> Self {
        Self {
            daily_amount,
            frequency,
        }
    }

    /// Nominal liters delivered by one irrigation event
    pub fn volume_per_event(&self) -> f64 {
        self.daily_amount * self.frequency
    }
}

/// A crop tracked by the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: Uuid,
    pub name: String,
    pub stage: CropStage,
    pub water_needs: WaterNeedsTier,
    pub water_requirement: WaterRequirement,
    pub planted_date: NaiveDate,
    pub location: Option<GpsCoordinates>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Crop {
    /// Days since planting as of `today`, never negative
    pub fn days_since_planted(&self, today: NaiveDate) -> i64 {
        (today - self.planted_date).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_labels_round_trip() {
        for tier in WaterNeedsTier::ALL {
            assert_eq!(tier.label().parse::<WaterNeedsTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        let err = "Extreme".parse::<WaterNeedsTier>().unwrap_err();
        assert_eq!(err, ScheduleError::InvalidTier("Extreme".to_string()));
        assert!("medium".parse::<WaterNeedsTier>().is_err());
    }

    #[test]
    fn test_tier_serde_uses_dashboard_labels() {
        let json = serde_json::to_string(&WaterNeedsTier::MediumHigh).unwrap();
        assert_eq!(json, "\"Medium-High\"");
        let tier: WaterNeedsTier = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(tier, WaterNeedsTier::High);
    }

    #[test]
    fn test_stage_codes() {
        assert_eq!(CropStage::Seedling.stage_code(), 0.25);
        assert_eq!(CropStage::Growing.stage_code(), 0.5);
        assert_eq!(CropStage::Mature.stage_code(), 0.75);
        assert_eq!(CropStage::Harvesting.stage_code(), 1.0);
        assert_eq!(CropStage::from("Dormant".to_string()).stage_code(), 0.5);
    }

    #[test]
    fn test_stage_serde_keeps_unknown_labels() {
        let stage: CropStage = serde_json::from_str("\"Flowering\"").unwrap();
        assert_eq!(stage, CropStage::Other("Flowering".to_string()));
        assert_eq!(serde_json::to_string(&stage).unwrap(), "\"Flowering\"");
    }

    #[test]
    fn test_days_since_planted() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let crop = Crop {
            id: Uuid::new_v4(),
            name: "Tomato".to_string(),
            stage: CropStage::Growing,
            water_needs: WaterNeedsTier::Medium,
            water_requirement: WaterRequirement::new(2.0, 1.5),
            planted_date: NaiveDate::from_ymd_opt(2024, 5, 16).unwrap(),
            location: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(crop.days_since_planted(today), 30);

        let future = Crop {
            planted_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            ..crop
        };
        assert_eq!(future.days_since_planted(today), 0);
    }
}
