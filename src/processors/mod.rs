pub mod derived;
pub mod spatial;
pub mod temporal;

pub use derived::{DerivedDefinition, ParameterExtender};
pub use spatial::SpatialAggregator;
pub use temporal::TemporalAggregator;
