//! WebAssembly module for the Crop Irrigation Planner
//!
//! Provides client-side computation for:
//! - Dry-day rebalancing of stored schedules
//! - Feature normalization previews
//! - Offline schedule simulation

use rand::{rngs::StdRng, SeedableRng};
use wasm_bindgen::prelude::*;

use shared::irrigation::{self, RngDraws};
use shared::{DailySchedule, ScheduleWire, WaterNeedsTier, WaterRequirement, HORIZON_DAYS};

fn parse_tier(water_needs: &str) -> Result<WaterNeedsTier, JsValue> {
    water_needs
        .parse::<WaterNeedsTier>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn console_warn(_message: &str) {}

/// Apply the dry-day quota of `water_needs` to a `{schedule, quantity}` JSON
/// object and return the rebalanced object.
///
/// Short sequences are padded with dry days, long ones truncated to 14.
#[wasm_bindgen]
pub fn rebalance_schedule(schedule_json: &str, water_needs: &str) -> Result<String, JsValue> {
    let wire: ScheduleWire = serde_json::from_str(schedule_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid schedule JSON: {}", e)))?;
    let tier = parse_tier(water_needs)?;

    if wire.schedule.len() != HORIZON_DAYS || wire.quantity.len() != HORIZON_DAYS {
        console_warn(&format!(
            "schedule has {} flags and {} quantities; normalizing to {} days",
            wire.schedule.len(),
            wire.quantity.len(),
            HORIZON_DAYS
        ));
    }

    let schedule = DailySchedule::padded(&wire.schedule, &wire.quantity)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let balanced = irrigation::rebalance(&schedule, tier);

    serde_json::to_string(&balanced.to_wire())
        .map_err(|e| JsValue::from_str(&format!("Failed to encode schedule: {}", e)))
}

/// Scale a raw reading into [0, 1] for a named model feature
#[wasm_bindgen]
pub fn normalize_feature(value: Option<f64>, feature_name: &str) -> f64 {
    irrigation::normalize(value, feature_name)
}

/// Dry days a displayed schedule must show over 14 days
#[wasm_bindgen]
pub fn zero_day_target(water_needs: &str) -> Result<u32, JsValue> {
    let tier = parse_tier(water_needs)?;
    Ok(irrigation::zero_day_target(tier) as u32)
}

/// Run the moisture simulator with a fixed seed and return `{schedule, quantity}`
#[wasm_bindgen]
pub fn simulate_schedule_preview(
    water_needs: &str,
    daily_amount: f64,
    frequency: f64,
    seed: u64,
) -> Result<String, JsValue> {
    let tier = parse_tier(water_needs)?;
    let simulator =
        irrigation::MoistureSimulator::new(tier, WaterRequirement::new(daily_amount, frequency))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut draws = RngDraws::new(StdRng::seed_from_u64(seed));
    let schedule = simulator.run(&mut draws);

    serde_json::to_string(&schedule.to_wire())
        .map_err(|e| JsValue::from_str(&format!("Failed to encode schedule: {}", e)))
}
