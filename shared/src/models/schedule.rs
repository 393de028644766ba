//! Irrigation schedule models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ScheduleError;

/// Number of days covered by every schedule, starting today
pub const HORIZON_DAYS: usize = 14;

/// A 14-day irrigation plan.
///
/// `irrigate[i]` is true exactly when `volume[i] > 0`. The fields are private
/// so that every constructor and mutation keeps that pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleWire", into = "ScheduleWire")]
pub struct DailySchedule {
    irrigate: [bool; HORIZON_DAYS],
    volume: [f64; HORIZON_DAYS],
}

/// Wire form shared by the model service, the database and the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWire {
    pub schedule: Vec<u8>,
    pub quantity: Vec<f64>,
}

impl DailySchedule {
    /// A schedule with no watering days
    pub fn dry() -> Self {
        Self {
            irrigate: [false; HORIZON_DAYS],
            volume: [0.0; HORIZON_DAYS],
        }
    }

    /// Build a schedule from 0/1 flags and liters, validating shape.
    ///
    /// Both sequences must hold exactly 14 entries, flags must be 0 or 1 and
    /// quantities finite and non-negative. A day only counts as a watering
    /// day when its flag is 1 and its quantity is positive; any other
    /// combination is stored as a dry day with zero volume.
    pub fn from_parts(flags: &[u8], quantities: &[f64]) -> Result<Self, ScheduleError> {
        if flags.len() != HORIZON_DAYS {
            return Err(ScheduleError::MalformedSchedule(format!(
                "expected {} schedule entries, got {}",
                HORIZON_DAYS,
                flags.len()
            )));
        }
        if quantities.len() != HORIZON_DAYS {
            return Err(ScheduleError::MalformedSchedule(format!(
                "expected {} quantity entries, got {}",
                HORIZON_DAYS,
                quantities.len()
            )));
        }

        let mut schedule = Self::dry();
        for (day, (&flag, &liters)) in flags.iter().zip(quantities).enumerate() {
            if flag > 1 {
                return Err(ScheduleError::MalformedSchedule(format!(
                    "schedule entry {} must be 0 or 1, got {}",
                    day, flag
                )));
            }
            if !liters.is_finite() || liters < 0.0 {
                return Err(ScheduleError::MalformedSchedule(format!(
                    "quantity entry {} must be a non-negative number, got {}",
                    day, liters
                )));
            }
            if flag == 1 && liters > 0.0 {
                schedule.set_watering(day, liters);
            }
        }

        Ok(schedule)
    }

    /// Like [`DailySchedule::from_parts`] but pads short inputs with dry days
    /// and drops entries past the horizon.
    pub fn padded(flags: &[u8], quantities: &[f64]) -> Result<Self, ScheduleError> {
        let mut safe_flags = [0u8; HORIZON_DAYS];
        let mut safe_quantities = [0.0f64; HORIZON_DAYS];
        for (slot, flag) in safe_flags.iter_mut().zip(flags) {
            *slot = *flag;
        }
        for (slot, liters) in safe_quantities.iter_mut().zip(quantities) {
            *slot = *liters;
        }
        Self::from_parts(&safe_flags, &safe_quantities)
    }

    pub fn irrigate(&self) -> &[bool; HORIZON_DAYS] {
        &self.irrigate
    }

    pub fn volume(&self) -> &[f64; HORIZON_DAYS] {
        &self.volume
    }

    pub fn is_watering_day(&self, day: usize) -> bool {
        self.irrigate.get(day).copied().unwrap_or(false)
    }

    /// `(day, liters)` for each watering day, in day order
    pub fn watering_days(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.irrigate
            .iter()
            .zip(self.volume.iter())
            .enumerate()
            .filter(|(_, (water, _))| **water)
            .map(|(day, (_, liters))| (day, *liters))
    }

    pub fn watering_day_count(&self) -> usize {
        self.irrigate.iter().filter(|&&water| water).count()
    }

    pub fn zero_day_count(&self) -> usize {
        HORIZON_DAYS - self.watering_day_count()
    }

    pub fn total_volume(&self) -> f64 {
        self.volume.iter().sum()
    }

    /// Mark `day` as a watering day. Non-positive volumes leave it dry.
    pub(crate) fn set_watering(&mut self, day: usize, liters: f64) {
        if liters > 0.0 {
            self.irrigate[day] = true;
            self.volume[day] = liters;
        } else {
            self.clear_day(day);
        }
    }

    pub(crate) fn clear_day(&mut self, day: usize) {
        self.irrigate[day] = false;
        self.volume[day] = 0.0;
    }

    pub fn to_wire(&self) -> ScheduleWire {
        ScheduleWire {
            schedule: self.irrigate.iter().map(|&water| u8::from(water)).collect(),
            quantity: self.volume.to_vec(),
        }
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self::dry()
    }
}

impl TryFrom<ScheduleWire> for DailySchedule {
    type Error = ScheduleError;

    fn try_from(wire: ScheduleWire) -> Result<Self, Self::Error> {
        Self::from_parts(&wire.schedule, &wire.quantity)
    }
}

impl From<DailySchedule> for ScheduleWire {
    fn from(schedule: DailySchedule) -> Self {
        schedule.to_wire()
    }
}

/// Which generation path produced a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// Built locally by the moisture depletion simulator
    Simulated,
    /// Returned by the external predictive model
    Predicted,
}

impl ScheduleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleSource::Simulated => "simulated",
            ScheduleSource::Predicted => "predicted",
        }
    }
}

impl FromStr for ScheduleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(ScheduleSource::Simulated),
            "predicted" => Ok(ScheduleSource::Predicted),
            other => Err(format!("unknown schedule source: {}", other)),
        }
    }
}

impl std::fmt::Display for ScheduleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw schedule tagged with where and when it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSchedule {
    pub source: ScheduleSource,
    pub schedule: DailySchedule,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedSchedule {
    pub fn new(source: ScheduleSource, schedule: DailySchedule) -> Self {
        Self {
            source,
            schedule,
            generated_at: Utc::now(),
        }
    }

    /// Render for the dashboard, optionally swapping in a derived schedule
    pub fn view(&self, schedule: &DailySchedule) -> ScheduleView {
        let wire = schedule.to_wire();
        ScheduleView {
            schedule: wire.schedule,
            quantity: wire.quantity,
            generated_at: self.generated_at,
            source: self.source,
        }
    }

    pub fn raw_view(&self) -> ScheduleView {
        self.view(&self.schedule)
    }
}

/// Dashboard payload for one schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub schedule: Vec<u8>,
    pub quantity: Vec<f64>,
    pub generated_at: DateTime<Utc>,
    pub source: ScheduleSource,
}
