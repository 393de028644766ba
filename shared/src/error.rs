//! Errors raised by the schedule synthesis pipeline

use thiserror::Error;

/// Failures of the pure irrigation pipeline.
///
/// None of these carry transport detail; the backend wraps them with the
/// crop and collaborator context before they reach a client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Unknown water needs tier: {0}")]
    InvalidTier(String),

    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),

    #[error("Invalid water requirement: {0}")]
    InvalidWaterRequirement(String),
}
