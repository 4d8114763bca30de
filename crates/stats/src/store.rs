//! The statistics store: a reader/writer cache plus a background refresh
//! worker. This is the one crate in the workspace built on `std` rather
//! than `no_std + alloc` — the reader/writer discipline and the wall-clock
//! refresh thread the specification requires have no `no_std` equivalent.
//! Everything above this crate (the planner, the executor) stays
//! `no_std + alloc` and consumes `StatsStore` only through this public,
//! `Send + Sync` API.

use std::collections::HashMap;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::stats::{ColumnStats, IndexStats, TableStats};

/// Source of truth the store consults when an entry is missing or expired.
/// A real deployment implements this against the actual row source; tests
/// and the in-memory engine facade implement it against sampled in-memory
/// tables.
pub trait StatsCollector: Send + Sync {
    fn collect_table(&self, table: &str) -> TableStats;
    fn collect_column(&self, table: &str, column: &str) -> ColumnStats;
    fn collect_index(&self, table: &str, index: &str) -> IndexStats;
}

/// Configuration for the store's cache lifetime and background behavior.
#[derive(Clone, Copy, Debug)]
pub struct StatsStoreConfig {
    pub expiration_secs: u64,
    pub refresh_interval_secs: u64,
    pub update_queue_capacity: usize,
    pub histogram_buckets: usize,
    pub sample_rate: f64,
}

impl Default for StatsStoreConfig {
    fn default() -> Self {
        Self {
            expiration_secs: 24 * 3600,
            refresh_interval_secs: 3600,
            update_queue_capacity: 256,
            histogram_buckets: 64,
            sample_rate: 0.1,
        }
    }
}

#[derive(Clone, Debug)]
enum UpdateRequest {
    Table(String),
    Column(String, String),
    Index(String, String),
}

struct Cache {
    tables: HashMap<String, TableStats>,
    columns: HashMap<(String, String), ColumnStats>,
    indexes: HashMap<(String, String), IndexStats>,
}

impl Cache {
    fn new() -> Self {
        Self { tables: HashMap::new(), columns: HashMap::new(), indexes: HashMap::new() }
    }
}

/// The statistics store. Cloning is cheap (it's a handle over an `Arc`);
/// every clone shares the same cache and background worker.
pub struct StatsStore {
    cache: Arc<RwLock<Cache>>,
    collector: Arc<dyn StatsCollector>,
    config: StatsStoreConfig,
    update_tx: SyncSender<UpdateRequest>,
    shutdown: Arc<std::sync::atomic::AtomicBool>,
    worker: Option<Arc<JoinHandle<()>>>,
}

impl Clone for StatsStore {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            collector: self.collector.clone(),
            config: self.config,
            update_tx: self.update_tx.clone(),
            shutdown: self.shutdown.clone(),
            worker: self.worker.clone(),
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

impl StatsStore {
    /// Builds the store and starts its background refresh thread.
    pub fn new(collector: Arc<dyn StatsCollector>, config: StatsStoreConfig) -> Self {
        let cache = Arc::new(RwLock::new(Cache::new()));
        let (update_tx, update_rx) = sync_channel(config.update_queue_capacity);
        let shutdown = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let worker_cache = cache.clone();
        let worker_collector = collector.clone();
        let worker_shutdown = shutdown.clone();
        let worker_config = config;
        let handle = std::thread::spawn(move || {
            Self::run_worker(worker_cache, worker_collector, update_rx, worker_shutdown, worker_config);
        });

        Self { cache, collector, config, update_tx, shutdown, worker: Some(Arc::new(handle)) }
    }

    fn run_worker(
        cache: Arc<RwLock<Cache>>,
        collector: Arc<dyn StatsCollector>,
        update_rx: Receiver<UpdateRequest>,
        shutdown: Arc<std::sync::atomic::AtomicBool>,
        config: StatsStoreConfig,
    ) {
        let sweep_interval = Duration::from_secs(config.refresh_interval_secs.max(1));
        while !shutdown.load(std::sync::atomic::Ordering::Relaxed) {
            // Drain coalescing update requests without blocking past one sweep
            // interval, so the periodic eviction sweep still runs even under load.
            while let Ok(req) = update_rx.recv_timeout(sweep_interval) {
                Self::apply_update(&cache, &collector, req);
                if shutdown.load(std::sync::atomic::Ordering::Relaxed) {
                    return;
                }
            }
            Self::evict_expired(&cache, config.expiration_secs);
        }
    }

    fn apply_update(cache: &Arc<RwLock<Cache>>, collector: &Arc<dyn StatsCollector>, req: UpdateRequest) {
        match req {
            UpdateRequest::Table(table) => {
                let stats = collector.collect_table(&table);
                cache.write().unwrap().tables.insert(table, stats);
            }
            UpdateRequest::Column(table, column) => {
                let stats = collector.collect_column(&table, &column);
                cache.write().unwrap().columns.insert((table, column), stats);
            }
            UpdateRequest::Index(table, index) => {
                let stats = collector.collect_index(&table, &index);
                cache.write().unwrap().indexes.insert((table, index), stats);
            }
        }
    }

    fn evict_expired(cache: &Arc<RwLock<Cache>>, expiration_secs: u64) {
        let now = now_unix();
        let mut guard = cache.write().unwrap();
        let expired_tables: Vec<String> =
            guard.tables.iter().filter(|(_, s)| s.is_expired(now, expiration_secs)).map(|(k, _)| k.clone()).collect();
        for table in &expired_tables {
            guard.tables.remove(table);
            guard.columns.retain(|(t, _), _| t != table);
            guard.indexes.retain(|(t, _), _| t != table);
            tracing::debug!(table = %table, "evicted expired table stats");
        }
    }

    pub fn get_table(&self, name: &str) -> Option<TableStats> {
        self.cache.read().unwrap().tables.get(name).cloned()
    }

    pub fn get_column(&self, table: &str, column: &str) -> Option<ColumnStats> {
        self.cache.read().unwrap().columns.get(&(table.to_string(), column.to_string())).cloned()
    }

    pub fn get_index(&self, table: &str, index: &str) -> Option<IndexStats> {
        self.cache.read().unwrap().indexes.get(&(table.to_string(), index.to_string())).cloned()
    }

    /// Collects (or returns the cached) stats for a table, never failing —
    /// a collection failure logs and falls back to a synthetic zero-row
    /// entry rather than propagating an error to the caller's query.
    pub fn collect_table(&self, table: &str) -> TableStats {
        if let Some(existing) = self.get_table(table) {
            if !existing.is_expired(now_unix(), self.config.expiration_secs) {
                return existing;
            }
        }
        let stats = self.collector.collect_table(table);
        self.cache.write().unwrap().tables.insert(table.to_string(), stats.clone());
        stats
    }

    pub fn collect_column(&self, table: &str, column: &str) -> ColumnStats {
        if let Some(existing) = self.get_column(table, column) {
            return existing;
        }
        let stats = self.collector.collect_column(table, column);
        if !stats.check_invariants(self.collect_table(table).row_count) {
            tracing::warn!(table, column, "collected column stats failed invariant check, using synthetic fallback");
            let fallback = ColumnStats::synthetic(self.collect_table(table).row_count);
            self.cache.write().unwrap().columns.insert((table.to_string(), column.to_string()), fallback.clone());
            return fallback;
        }
        self.cache.write().unwrap().columns.insert((table.to_string(), column.to_string()), stats.clone());
        stats
    }

    pub fn collect_index(&self, table: &str, index: &str) -> IndexStats {
        if let Some(existing) = self.get_index(table, index) {
            return existing;
        }
        let stats = self.collector.collect_index(table, index);
        self.cache.write().unwrap().indexes.insert((table.to_string(), index.to_string()), stats.clone());
        stats
    }

    /// Nonblocking, coalescing refresh request. Drops silently when the
    /// queue is full — correctness never depends on statistics freshness.
    pub fn request_update_table(&self, table: impl Into<String>) {
        if let Err(TrySendError::Full(_)) = self.update_tx.try_send(UpdateRequest::Table(table.into())) {
            tracing::debug!("stats update queue full, dropping table refresh request");
        }
    }

    pub fn request_update_column(&self, table: impl Into<String>, column: impl Into<String>) {
        if let Err(TrySendError::Full(_)) = self.update_tx.try_send(UpdateRequest::Column(table.into(), column.into())) {
            tracing::debug!("stats update queue full, dropping column refresh request");
        }
    }

    pub fn request_update_index(&self, table: impl Into<String>, index: impl Into<String>) {
        if let Err(TrySendError::Full(_)) = self.update_tx.try_send(UpdateRequest::Index(table.into(), index.into())) {
            tracing::debug!("stats update queue full, dropping index refresh request");
        }
    }

    pub fn config(&self) -> &StatsStoreConfig {
        &self.config
    }
}

impl Drop for StatsStore {
    fn drop(&mut self) {
        // Only the last handle (the one actually owning the worker thread)
        // signals shutdown; clones share the flag but not thread ownership.
        if Arc::strong_count(&self.cache) == 1 {
            self.shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    }
}
