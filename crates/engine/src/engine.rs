//! `Engine`: the facade wiring `SemanticAnalyzer` -> `QueryPlanner` -> cost
//! estimation -> the pull executor over one owned `InMemoryCatalog`.
//!
//! DDL is out of scope here (the catalog arrives already built), so `Engine`
//! owns its catalog directly rather than behind a lock: every `execute` call
//! sees the same, never-mutated schema and row set.

use std::sync::Arc;
use std::time::Instant;

use cynos_core::{CancellationToken, Result, Row};
use cynos_query::analyzer::SemanticAnalyzer;
use cynos_query::context::ExecutionContext;
use cynos_query::cost::{self, chosen_access_method};
use cynos_query::executor::PullExecutor;
use cynos_query::planner::QueryPlanner;
use cynos_query::statement::Statement;
use cynos_stats::StatsStore;
use cynos_storage::InMemoryCatalog;

use crate::collector::InMemoryStatsCollector;
use crate::config::EngineConfig;
use crate::metadata::{requires_primary_lookup, QueryMetadata};

/// Owns a catalog and the statistics store built over it, and runs
/// statements end to end: analyze, plan, cost, execute.
pub struct Engine {
    catalog: Arc<InMemoryCatalog>,
    stats: StatsStore,
    config: EngineConfig,
}

impl Engine {
    /// Builds an engine over an already-populated catalog. `config`
    /// controls statistics sampling, the cost model's page/buffer
    /// parameters, and the executor's cancellation check stride.
    pub fn new(config: EngineConfig, catalog: InMemoryCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let collector = Arc::new(InMemoryStatsCollector::new(catalog.clone(), config.sample_rate, config.histogram_buckets));
        let stats = StatsStore::new(collector, config.stats_store_config());
        Self { catalog, stats, config }
    }

    /// Runs one already-analyzed `Select`/DML statement, returning the rows
    /// the executor produced plus the planner/execution metadata.
    ///
    /// `token` lets a caller cancel a long-running statement cooperatively;
    /// pass a fresh, never-canceled `CancellationToken::new()` for no
    /// cancellation support.
    pub fn execute(&self, statement: &Statement, token: CancellationToken) -> Result<(Vec<Row>, QueryMetadata)> {
        let analyzer = SemanticAnalyzer::new(self.catalog.as_ref());
        let analyzed = analyzer.analyze(statement)?;
        let logical_plan = analyzed.into_logical_plan();

        let ctx = ExecutionContext::from_catalog_and_stats(self.catalog.as_ref(), &self.stats);
        let planner = QueryPlanner::new(ctx);
        let physical_plan = planner.plan(logical_plan);

        let model = self.config.cost_model();
        let estimate = cost::estimate_physical_plan_cost(&physical_plan, self.catalog.as_ref(), &self.stats, &model);
        let access_method = chosen_access_method(&physical_plan);
        tracing::debug!(?access_method, estimated_rows = estimate.out_rows, "planned query");

        let executor = PullExecutor::with_cancellation(self.catalog.as_ref(), token, self.config.cancel_check_stride);
        let started = Instant::now();
        let rows = executor.collect(&physical_plan)?;
        let execution_time = started.elapsed();

        let metadata = QueryMetadata {
            requires_primary_lookup: requires_primary_lookup(&access_method),
            access_method,
            estimated_rows: estimate.out_rows,
            actual_rows: rows.len(),
            execution_time,
        };
        Ok((rows, metadata))
    }

    /// Direct read access to the owned catalog, for callers building rows
    /// with `RowStore` before querying, or inspecting schema.
    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }
}
