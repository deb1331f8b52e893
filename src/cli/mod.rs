pub mod args;
pub mod commands;

pub use args::{AggregationArgs, Cli, Commands};
pub use commands::run;
