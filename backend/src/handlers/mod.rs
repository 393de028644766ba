//! HTTP handlers for the Crop Irrigation Planner

pub mod crop;
pub mod health;
pub mod schedule;
pub mod weather;

pub use crop::*;
pub use health::*;
pub use schedule::*;
pub use weather::*;
