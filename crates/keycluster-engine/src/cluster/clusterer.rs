//! The clustering entry points.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use rayon::ThreadPool;

use keycluster_core::config::ClusterConfig;
use keycluster_core::errors::error_code::KeyclusterErrorCode;
use keycluster_core::errors::{ClusterError, ConcurrencyError};
use keycluster_core::events::types::{
    ClusterCompleteEvent, ClusterProgressEvent, ClusterStartedEvent, ErrorEvent,
};
use keycluster_core::events::EventDispatcher;
use keycluster_core::traits::{Cancellable, CancellationToken};
use keycluster_core::types::collections::{FxHashMap, FxHashSet};

use super::options::ClusterOptions;
use super::result::{ClusterStats, Clustering};
use super::worker::{KeyContext, Keyed};
use crate::keys::KeyFn;

/// Cluster `values` by `key_fn` using `concurrency` worker threads.
///
/// Shorthand for a [`Clusterer`] with default options. Inputs with fewer
/// distinct values than the default parallel threshold are keyed on the
/// calling thread; the result is the same either way.
pub fn cluster<V, F>(
    values: &[V],
    key_fn: &F,
    concurrency: usize,
) -> Result<Clustering<F::Key, V>, ClusterError>
where
    V: Eq + Hash + Clone + Debug + Send + Sync,
    F: KeyFn<V>,
{
    Clusterer::new(ClusterOptions::default().with_concurrency(concurrency))?.cluster(values, key_fn)
}

/// Key-collision clusterer.
///
/// Holds options plus an optional cancellation token and event handlers.
/// A `Clusterer` is reusable; every call builds its own worker pool.
#[derive(Debug, Clone)]
pub struct Clusterer {
    options: ClusterOptions,
    cancel: Option<CancellationToken>,
    events: EventDispatcher,
}

impl Clusterer {
    pub fn new(options: ClusterOptions) -> Result<Self, ClusterError> {
        options.validate()?;
        Ok(Self {
            options,
            cancel: None,
            events: EventDispatcher::new(),
        })
    }

    pub fn from_config(config: &ClusterConfig) -> Result<Self, ClusterError> {
        Self::new(ClusterOptions::from_config(config))
    }

    /// Stop in-flight and future calls when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Partition the distinct values of `values` by key.
    ///
    /// Fails with the first key computation error, a worker pool error, or
    /// `Cancelled`; no partial mapping is ever returned.
    pub fn cluster<V, F>(&self, values: &[V], key_fn: &F) -> Result<Clustering<F::Key, V>, ClusterError>
    where
        V: Eq + Hash + Clone + Debug + Send + Sync,
        F: KeyFn<V>,
    {
        let start = Instant::now();
        self.check_cancelled().map_err(|e| self.fail(e))?;

        let distinct = distinct_refs(values);
        let workers = self.workers_for(distinct.len());
        let span = tracing::info_span!(
            "cluster",
            input_values = values.len(),
            distinct_values = distinct.len(),
            workers
        );
        let _guard = span.enter();

        self.events.emit_cluster_started(&ClusterStartedEvent {
            input_values: values.len(),
            distinct_values: distinct.len(),
            workers,
        });

        let pool = self.build_pool(workers).map_err(|e| self.fail(e))?;
        let abort = AtomicBool::new(false);

        let key_start = Instant::now();
        let keyed = self
            .key_values(&distinct, key_fn, pool.as_ref(), &abort, Some(distinct.len()))
            .map_err(|e| self.fail(e))?;
        let key_ms = key_start.elapsed().as_millis() as u64;
        // A cancel that lands after the last key still discards the run.
        self.check_cancelled().map_err(|e| self.fail(e))?;

        let merge_start = Instant::now();
        let mut clusters = FxHashMap::default();
        merge_keyed(&mut clusters, keyed, |_| {});
        let merge_ms = merge_start.elapsed().as_millis() as u64;

        let result = Clustering::new(
            clusters,
            ClusterStats {
                input_values: values.len(),
                workers,
                batches: 1,
                key_ms,
                merge_ms,
                ..Default::default()
            },
        );
        self.complete(&result, start);
        Ok(result)
    }

    /// Cluster a lazily produced sequence in batches of `batch_size`.
    ///
    /// Each batch is keyed with the configured concurrency and merged into
    /// one accumulator; values already seen in earlier batches are not keyed
    /// again. The result equals `cluster` over the collected sequence.
    /// Cancellation is checked between batches and between values.
    pub fn cluster_stream<I, F>(
        &self,
        values: I,
        key_fn: &F,
    ) -> Result<Clustering<F::Key, I::Item>, ClusterError>
    where
        I: IntoIterator,
        I::Item: Eq + Hash + Clone + Debug + Send + Sync,
        F: KeyFn<I::Item>,
    {
        let start = Instant::now();
        let span = tracing::info_span!("cluster_stream", batch_size = self.options.batch_size);
        let _guard = span.enter();

        self.events.emit_cluster_started(&ClusterStartedEvent {
            input_values: 0,
            distinct_values: 0,
            workers: self.options.concurrency,
        });

        let mut clusters: FxHashMap<F::Key, FxHashSet<I::Item>> = FxHashMap::default();
        let mut seen: FxHashSet<I::Item> = FxHashSet::default();
        let mut pool: Option<ThreadPool> = None;
        let abort = AtomicBool::new(false);
        let mut stats = ClusterStats::default();

        let mut iter = values.into_iter();
        let mut batch: Vec<I::Item> = Vec::new();
        loop {
            self.check_cancelled().map_err(|e| self.fail(e))?;

            batch.clear();
            batch.extend(iter.by_ref().take(self.options.batch_size));
            if batch.is_empty() {
                break;
            }
            stats.input_values += batch.len();
            stats.batches += 1;

            let fresh: Vec<&I::Item> = {
                let mut local: FxHashSet<&I::Item> = FxHashSet::default();
                batch
                    .iter()
                    .filter(|v| !seen.contains(*v) && local.insert(*v))
                    .collect()
            };

            let workers = self.workers_for(fresh.len());
            if workers > 1 && pool.is_none() {
                pool = self.build_pool(workers).map_err(|e| self.fail(e))?;
            }
            let batch_pool = if workers > 1 { pool.as_ref() } else { None };
            stats.workers = stats.workers.max(workers);

            let key_start = Instant::now();
            let keyed = self
                .key_values(&fresh, key_fn, batch_pool, &abort, None)
                .map_err(|e| self.fail(e))?;
            stats.key_ms += key_start.elapsed().as_millis() as u64;

            let merge_start = Instant::now();
            merge_keyed(&mut clusters, keyed, |v| {
                seen.insert(v.clone());
            });
            stats.merge_ms += merge_start.elapsed().as_millis() as u64;

            tracing::debug!(
                batch = stats.batches,
                batch_values = batch.len(),
                fresh_values = fresh.len(),
                clusters = clusters.len(),
                "batch merged"
            );
            self.events.emit_cluster_progress(&ClusterProgressEvent {
                processed: stats.input_values,
                total: None,
            });
        }

        stats.workers = stats.workers.max(1);
        let result = Clustering::new(clusters, stats);
        self.complete(&result, start);
        Ok(result)
    }

    fn check_cancelled(&self) -> Result<(), ClusterError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ClusterError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Workers to use for `distinct` values: the configured concurrency,
    /// or 1 when the input is below the parallel threshold.
    fn workers_for(&self, distinct: usize) -> usize {
        if self.options.concurrency > 1 && distinct > 0 && distinct >= self.options.min_parallel_values {
            self.options.concurrency
        } else {
            1
        }
    }

    fn build_pool(&self, workers: usize) -> Result<Option<ThreadPool>, ClusterError> {
        if workers <= 1 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("keycluster-worker-{i}"))
            .build()
            .map(Some)
            .map_err(|e| {
                ConcurrencyError::PoolBuild {
                    threads: workers,
                    message: e.to_string(),
                }
                .into()
            })
    }

    fn key_values<'v, V, F>(
        &self,
        distinct: &[&'v V],
        key_fn: &F,
        pool: Option<&ThreadPool>,
        abort: &AtomicBool,
        progress_total: Option<usize>,
    ) -> Result<Vec<Keyed<'v, F::Key, V>>, ClusterError>
    where
        V: Debug + Sync,
        F: KeyFn<V>,
    {
        let ctx = KeyContext {
            retry: self.options.retry,
            chunk_size: self.options.chunk_size,
            cancel: self.cancel.as_ref(),
            events: &self.events,
            abort,
            progress_total: progress_total.filter(|_| !self.events.is_empty()),
        };
        match pool {
            Some(pool) => ctx.key_parallel(pool, distinct, key_fn),
            None => ctx.key_sequential(distinct, key_fn),
        }
    }

    fn complete<K, V>(&self, result: &Clustering<K, V>, start: Instant)
    where
        K: Eq + Hash,
        V: Eq + Hash,
    {
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(stats = %result.stats(), duration_ms, "clustering complete");
        self.events.emit_cluster_complete(&ClusterCompleteEvent {
            distinct_values: result.distinct_values(),
            clusters: result.len(),
            duration_ms,
        });
    }

    /// Log and broadcast an aborting error, then hand it back.
    fn fail(&self, error: ClusterError) -> ClusterError {
        match &error {
            ClusterError::Cancelled => tracing::info!("clustering cancelled"),
            e => tracing::error!(error = %e, code = e.error_code(), "clustering aborted"),
        }
        self.events.emit_error(&ErrorEvent {
            message: error.to_string(),
            error_code: error.error_code().to_string(),
        });
        error
    }
}

/// Distinct values in first-occurrence order.
fn distinct_refs<V: Eq + Hash>(values: &[V]) -> Vec<&V> {
    let mut seen: FxHashSet<&V> = FxHashSet::default();
    values.iter().filter(|v| seen.insert(*v)).collect()
}

/// Sequential merge of worker output into the shared mapping.
fn merge_keyed<'v, K, V, G>(
    clusters: &mut FxHashMap<K, FxHashSet<V>>,
    keyed: Vec<Keyed<'v, K, V>>,
    mut on_value: G,
) where
    K: Eq + Hash,
    V: Eq + Hash + Clone + 'v,
    G: FnMut(&V),
{
    for chunk in keyed {
        for (key, value) in chunk {
            on_value(value);
            clusters.entry(key).or_default().insert(value.clone());
        }
    }
}
