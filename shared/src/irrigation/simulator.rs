//! Soil-moisture depletion simulator
//!
//! Models the root zone as a bucket that starts full, drains by a
//! tier-dependent amount scaled by daily weather, and is refilled whenever
//! it drops below the trigger threshold.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::ScheduleError;
use crate::models::{
    Crop, DailySchedule, GeneratedSchedule, ScheduleSource, WaterNeedsTier, WaterRequirement,
    HORIZON_DAYS,
};

/// Bucket level at the start of the simulation and after every irrigation
pub const FULL_MOISTURE: f64 = 100.0;

/// Irrigation triggers when moisture falls strictly below this level
pub const TRIGGER_THRESHOLD: f64 = 30.0;

/// Daily weather multiplier; above 1.0 is hot and dry, below is cool and humid
pub const WEATHER_FACTOR_RANGE: RangeInclusive<f64> = 0.8..=1.4;

/// Multiplier applied to the nominal volume of each irrigation event
pub const VOLUME_JITTER_RANGE: RangeInclusive<f64> = 0.9..=1.1;

/// Smallest nominal event volume that still rounds to a positive amount
pub const MIN_EVENT_VOLUME: f64 = 0.1;

/// Largest nominal event volume; jittered volumes stay finite below it
pub const MAX_EVENT_VOLUME: f64 = 100_000.0;

/// Source of the simulator's random draws.
///
/// The two draws are requested separately so that implementations keep them
/// independent of each other.
pub trait DrawSource {
    /// Next weather factor, within [`WEATHER_FACTOR_RANGE`]
    fn weather_factor(&mut self) -> f64;

    /// Next volume multiplier, within [`VOLUME_JITTER_RANGE`]
    fn volume_jitter(&mut self) -> f64;
}

/// Uniform draws from any [`rand::Rng`]; seed the generator for reproducible runs
#[derive(Debug, Clone)]
pub struct RngDraws<R> {
    rng: R,
}

impl<R: Rng> RngDraws<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DrawSource for RngDraws<R> {
    fn weather_factor(&mut self) -> f64 {
        self.rng.gen_range(WEATHER_FACTOR_RANGE)
    }

    fn volume_jitter(&mut self) -> f64 {
        self.rng.gen_range(VOLUME_JITTER_RANGE)
    }
}

/// The same factor every day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraws {
    pub weather_factor: f64,
    pub volume_jitter: f64,
}

impl FixedDraws {
    /// Neutral weather and exact nominal volumes
    pub fn neutral() -> Self {
        Self {
            weather_factor: 1.0,
            volume_jitter: 1.0,
        }
    }
}

impl DrawSource for FixedDraws {
    fn weather_factor(&mut self) -> f64 {
        self.weather_factor
    }

    fn volume_jitter(&mut self) -> f64 {
        self.volume_jitter
    }
}

/// Replays pre-recorded factors, falling back to 1.0 once a sequence runs out
#[derive(Debug, Clone, Default)]
pub struct RecordedDraws {
    weather_factors: VecDeque<f64>,
    volume_jitters: VecDeque<f64>,
}

impl RecordedDraws {
    pub fn new(
        weather_factors: impl IntoIterator<Item = f64>,
        volume_jitters: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            weather_factors: weather_factors.into_iter().collect(),
            volume_jitters: volume_jitters.into_iter().collect(),
        }
    }
}

impl DrawSource for RecordedDraws {
    fn weather_factor(&mut self) -> f64 {
        self.weather_factors.pop_front().unwrap_or(1.0)
    }

    fn volume_jitter(&mut self) -> f64 {
        self.volume_jitters.pop_front().unwrap_or(1.0)
    }
}

/// One simulated day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationStep {
    pub day: usize,
    pub weather_factor: f64,
    /// Moisture after depletion, before any refill
    pub moisture: f64,
    /// Liters applied, `None` on dry days
    pub irrigation: Option<f64>,
}

/// Runs the 14-day depletion model for one crop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoistureSimulator {
    tier: WaterNeedsTier,
    requirement: WaterRequirement,
}

impl MoistureSimulator {
    pub fn new(
        tier: WaterNeedsTier,
        requirement: WaterRequirement,
    ) -> Result<Self, ScheduleError> {
        validate_event_volume(&requirement)?;
        Ok(Self { tier, requirement })
    }

    pub fn for_crop(crop: &Crop) -> Result<Self, ScheduleError> {
        Self::new(crop.water_needs, crop.water_requirement)
    }

    /// Day-by-day trace of the simulation
    pub fn steps<D: DrawSource + ?Sized>(&self, draws: &mut D) -> Vec<SimulationStep> {
        let depletion = self.tier.depletion_rate();
        let mut moisture = FULL_MOISTURE;
        let mut steps = Vec::with_capacity(HORIZON_DAYS);

        for day in 0..HORIZON_DAYS {
            let weather_factor = draws.weather_factor();
            moisture -= depletion * weather_factor;
            let depleted = moisture;

            let irrigation = if moisture < TRIGGER_THRESHOLD {
                moisture = FULL_MOISTURE;
                let jitter = draws.volume_jitter();
                Some(round_to_tenth(self.requirement.volume_per_event() * jitter))
            } else {
                None
            };

            steps.push(SimulationStep {
                day,
                weather_factor,
                moisture: depleted,
                irrigation,
            });
        }

        steps
    }

    pub fn run<D: DrawSource + ?Sized>(&self, draws: &mut D) -> DailySchedule {
        let mut schedule = DailySchedule::dry();
        for step in self.steps(draws) {
            if let Some(liters) = step.irrigation {
                schedule.set_watering(step.day, liters);
            }
        }
        schedule
    }
}

/// Simulate a crop's next 14 days and tag the result as simulated
pub fn simulate_schedule<D: DrawSource + ?Sized>(
    crop: &Crop,
    draws: &mut D,
) -> Result<GeneratedSchedule, ScheduleError> {
    let simulator = MoistureSimulator::for_crop(crop)?;
    Ok(GeneratedSchedule::new(
        ScheduleSource::Simulated,
        simulator.run(draws),
    ))
}

fn validate_event_volume(requirement: &WaterRequirement) -> Result<(), ScheduleError> {
    let volume = requirement.volume_per_event();
    if !(MIN_EVENT_VOLUME..=MAX_EVENT_VOLUME).contains(&volume) {
        return Err(ScheduleError::InvalidWaterRequirement(format!(
            "daily amount times frequency must be between {} and {} liters, got {}",
            MIN_EVENT_VOLUME, MAX_EVENT_VOLUME, volume
        )));
    }
    Ok(())
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
