//! Stats module - grouping and reduction of loaded records

mod aggregator;

pub use aggregator::{Aggregator, DeathMetric};
