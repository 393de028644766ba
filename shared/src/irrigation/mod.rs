//! 14-day irrigation schedule synthesis
//!
//! Two interchangeable generators produce a raw schedule: the local
//! [`simulator`] and the external model fed by [`features`]. Either result
//! goes through [`rebalance`] before it is displayed.

pub mod features;
pub mod normalize;
pub mod rebalance;
pub mod simulator;

pub use features::{
    build_feature_batch, CropProfile, FieldConditions, NormalizedFeatureVector, FEATURE_COUNT,
};
pub use normalize::{normalize, Feature, RangeSpec};
pub use rebalance::{demotion_plan, rebalance, zero_day_target};
pub use simulator::{
    simulate_schedule, DrawSource, FixedDraws, MoistureSimulator, RecordedDraws, RngDraws,
    SimulationStep,
};
