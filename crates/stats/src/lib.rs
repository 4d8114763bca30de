//! Cynos Stats - the statistics store and cost model for the Cynos query
//! engine's planner.
//!
//! This crate is deliberately built on `std`: the reader/writer cache
//! discipline and background refresh thread the statistics store requires
//! (see [`store::StatsStore`]) have no faithful `no_std` equivalent. Every
//! other crate in the workspace stays `no_std + alloc` and depends on this
//! one as an ordinary library.

mod cost_model;
mod error;
mod estimator;
mod histogram;
mod stats;
mod store;

pub use cost_model::CostModel;
pub use error::{Result, StatsError};
pub use estimator::{CostEstimate, CostEstimator};
pub use histogram::{Histogram, HistogramBucket};
pub use stats::{ColumnStats, IndexStats, TableStats, TopNEntry};
pub use store::{StatsCollector, StatsStore, StatsStoreConfig};
