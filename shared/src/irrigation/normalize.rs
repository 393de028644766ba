//! Feature normalization onto [0, 1]

/// Linear bounds used to rescale one physical quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
}

impl RangeSpec {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Rescale `value` into [0, 1], clamping anything outside the bounds
    pub fn scale(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Inputs of the predictive model, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    SoilMoisture,
    Temperature,
    Humidity,
    Rainfall,
    CropAge,
    CropStage,
    WaterNeeds,
}

impl Feature {
    pub const ORDERED: [Feature; 7] = [
        Feature::SoilMoisture,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Rainfall,
        Feature::CropAge,
        Feature::CropStage,
        Feature::WaterNeeds,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::SoilMoisture => "Soil_Moisture",
            Feature::Temperature => "Temperature",
            Feature::Humidity => "Humidity",
            Feature::Rainfall => "Rainfall",
            Feature::CropAge => "crop_age",
            Feature::CropStage => "crop_stage",
            Feature::WaterNeeds => "water_needs",
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ORDERED.into_iter().find(|feature| feature.name() == name)
    }

    /// Bounds the model was trained with
    pub fn range(&self) -> RangeSpec {
        match self {
            Feature::SoilMoisture => RangeSpec::new(10.0, 95.0),
            Feature::Temperature => RangeSpec::new(10.0, 40.0),
            Feature::Humidity => RangeSpec::new(20.0, 95.0),
            Feature::Rainfall => RangeSpec::new(0.0, 15.0),
            Feature::CropAge => RangeSpec::new(5.0, 100.0),
            Feature::CropStage => RangeSpec::new(0.25, 1.0),
            Feature::WaterNeeds => RangeSpec::new(0.2, 0.9),
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        self.range().scale(value)
    }
}

/// Normalize a raw measurement by feature name.
///
/// Missing or non-finite values and unknown feature names map to 0 so that
/// gaps in sensor data never fail the pipeline.
pub fn normalize(value: Option<f64>, feature_name: &str) -> f64 {
    match (value, Feature::from_name(feature_name)) {
        (Some(value), Some(feature)) => feature.normalize(value),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_linear() {
        assert_eq!(normalize(Some(25.0), "Temperature"), 0.5);
        assert_eq!(normalize(Some(10.0), "Temperature"), 0.0);
        assert_eq!(normalize(Some(40.0), "Temperature"), 1.0);
        assert!((normalize(Some(40.0), "Soil_Moisture") - 30.0 / 85.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(Some(-5.0), "Rainfall"), 0.0);
        assert_eq!(normalize(Some(120.0), "crop_age"), 1.0);
    }

    #[test]
    fn test_normalize_fallbacks() {
        assert_eq!(normalize(None, "Temperature"), 0.0);
        assert_eq!(normalize(Some(f64::NAN), "Temperature"), 0.0);
        assert_eq!(normalize(Some(f64::INFINITY), "Humidity"), 0.0);
        assert_eq!(normalize(Some(25.0), "Wind_Speed"), 0.0);
        assert_eq!(normalize(Some(25.0), "temperature"), 0.0);
    }

    #[test]
    fn test_feature_names_resolve() {
        for feature in Feature::ORDERED {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
            let range = feature.range();
            assert!(range.max > range.min);
        }
    }
}
