//! Shared types and models for the Crop Irrigation Planner
//!
//! This crate contains the domain model and the schedule synthesis pipeline
//! shared between the backend and the frontend (via WASM).

pub mod error;
pub mod irrigation;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
