//! Validation utilities for the Crop Irrigation Planner

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::irrigation::simulator::{MAX_EVENT_VOLUME, MIN_EVENT_VOLUME};
use crate::models::WaterRequirement;
use crate::types::GpsCoordinates;

// ============================================================================
// Crop Validations
// ============================================================================

/// Validate crop display name (1-100 characters, not blank)
pub fn validate_crop_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Crop name cannot be empty");
    }
    if name.chars().count() > 100 {
        return Err("Crop name must be at most 100 characters");
    }
    Ok(())
}

/// Validate that a water requirement yields a positive amount per watering
pub fn validate_water_requirement(requirement: &WaterRequirement) -> Result<(), &'static str> {
    if !requirement.daily_amount.is_finite() || requirement.daily_amount <= 0.0 {
        return Err("Daily water amount must be a positive number");
    }
    if !requirement.frequency.is_finite() || requirement.frequency <= 0.0 {
        return Err("Watering frequency must be a positive number");
    }
    let volume = requirement.volume_per_event();
    if !volume.is_finite() || volume < MIN_EVENT_VOLUME {
        return Err("Daily amount times frequency must be at least 0.1 liters");
    }
    if volume > MAX_EVENT_VOLUME {
        return Err("Daily amount times frequency must be at most 100000 liters");
    }
    Ok(())
}

/// Validate planting date is not after `today`
pub fn validate_planted_date(planted: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if planted > today {
        return Err("Planted date cannot be in the future");
    }
    Ok(())
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude and longitude are within world bounds
pub fn validate_coordinates(coordinates: &GpsCoordinates) -> Result<(), &'static str> {
    if coordinates.latitude < Decimal::from(-90) || coordinates.latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if coordinates.longitude < Decimal::from(-180) || coordinates.longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}
