//! Cynos Engine - facade wiring the query pipeline over an in-memory catalog.
//!
//! This crate ties together `cynos-core`'s types, `cynos-storage`'s catalog
//! and row store, `cynos-stats`'s cost model and statistics cache, and
//! `cynos-query`'s analyzer/planner/executor into one entry point:
//! [`Engine::execute`].
//!
//! - `config`: [`EngineConfig`], the serde/TOML-deserializable configuration
//!   surface covering cost-model, statistics and cancellation parameters.
//! - `collector`: [`InMemoryStatsCollector`], the `StatsCollector` that
//!   samples an `InMemoryCatalog` to answer `StatsStore` cache misses.
//! - `metadata`: [`QueryMetadata`], the planner/execution facts returned
//!   alongside every query's rows.
//! - `engine`: [`Engine`] itself.

mod collector;
mod config;
mod engine;
mod metadata;

pub use collector::InMemoryStatsCollector;
pub use config::EngineConfig;
pub use engine::Engine;
pub use metadata::QueryMetadata;
