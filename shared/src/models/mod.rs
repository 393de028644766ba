//! Domain models for the Crop Irrigation Planner

mod crop;
mod schedule;
mod weather;

pub use crop::*;
pub use schedule::*;
pub use weather::*;
