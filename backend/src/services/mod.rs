//! Business logic services for the Crop Irrigation Planner

pub mod crop;
pub mod schedule;

pub use crop::CropService;
pub use schedule::ScheduleService;
