//! Key computation over distinct values, on the calling thread or a pool.
//!
//! Workers only produce `(key, value)` lists; they never touch the shared
//! result mapping.

use std::any::Any;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::ThreadPool;

use keycluster_core::errors::{ClusterError, ConcurrencyError};
use keycluster_core::events::types::{ClusterProgressEvent, KeyRetryEvent};
use keycluster_core::events::EventDispatcher;
use keycluster_core::traits::{Cancellable, CancellationToken};

use super::options::RetryPolicy;
use crate::keys::KeyFn;

/// Keys for one chunk, paired with the values that produced them.
pub(crate) type Keyed<'v, K, V> = Vec<(K, &'v V)>;

enum ChunkError {
    Failed(ClusterError),
    /// Another worker failed first; this chunk stopped early.
    Aborted,
}

/// Per-call state shared read-only by every worker.
pub(crate) struct KeyContext<'a> {
    pub retry: RetryPolicy,
    pub chunk_size: usize,
    pub cancel: Option<&'a CancellationToken>,
    pub events: &'a EventDispatcher,
    /// Set by the first failing worker so the others stop dispatching.
    pub abort: &'a AtomicBool,
    /// Emit a progress event per finished chunk, against this total.
    pub progress_total: Option<usize>,
}

impl KeyContext<'_> {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.is_cancelled())
    }

    fn key_one<V, F>(&self, value: &V, key_fn: &F) -> Result<F::Key, ClusterError>
    where
        V: Debug,
        F: KeyFn<V>,
    {
        let mut attempt = 1;
        loop {
            match key_fn.key(value) {
                Ok(key) => return Ok(key),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    tracing::warn!(value = ?value, attempt, error = %e, "transient key failure, retrying");
                    if !self.events.is_empty() {
                        self.events.emit_key_retry(&KeyRetryEvent {
                            value: format!("{value:?}"),
                            attempt,
                            message: e.message.clone(),
                        });
                    }
                    attempt += 1;
                }
                Err(e) => return Err(ClusterError::key_computation(value, e)),
            }
        }
    }

    fn key_chunk<'v, V, F>(&self, chunk: &[&'v V], key_fn: &F) -> Result<Keyed<'v, F::Key, V>, ChunkError>
    where
        V: Debug,
        F: KeyFn<V>,
    {
        let mut out = Vec::with_capacity(chunk.len());
        for &value in chunk {
            if self.abort.load(Ordering::Relaxed) {
                return Err(ChunkError::Aborted);
            }
            if self.is_cancelled() {
                return Err(ChunkError::Failed(ClusterError::Cancelled));
            }
            let key = self.key_one(value, key_fn).map_err(ChunkError::Failed)?;
            out.push((key, value));
        }
        Ok(out)
    }

    /// Run one chunk, converting a panicking key function into an error.
    fn run_chunk<'v, V, F>(
        &self,
        chunk: &[&'v V],
        key_fn: &F,
        processed: &AtomicUsize,
    ) -> Result<Keyed<'v, F::Key, V>, ChunkError>
    where
        V: Debug,
        F: KeyFn<V>,
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.key_chunk(chunk, key_fn)))
            .unwrap_or_else(|payload| {
                Err(ChunkError::Failed(
                    ConcurrencyError::WorkerPanicked {
                        message: panic_message(payload.as_ref()),
                    }
                    .into(),
                ))
            });

        match &outcome {
            Ok(_) => {
                let done = processed.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
                if let Some(total) = self.progress_total {
                    self.events.emit_cluster_progress(&ClusterProgressEvent {
                        processed: done,
                        total: Some(total),
                    });
                }
            }
            Err(ChunkError::Failed(_)) => self.abort.store(true, Ordering::SeqCst),
            Err(ChunkError::Aborted) => {}
        }
        outcome
    }

    /// Key every value on the calling thread, stopping at the first failure.
    pub fn key_sequential<'v, V, F>(
        &self,
        values: &[&'v V],
        key_fn: &F,
    ) -> Result<Vec<Keyed<'v, F::Key, V>>, ClusterError>
    where
        V: Debug,
        F: KeyFn<V>,
    {
        let processed = AtomicUsize::new(0);
        let mut out = Vec::with_capacity(values.len().div_ceil(self.chunk_size));
        for chunk in values.chunks(self.chunk_size) {
            match self.run_chunk(chunk, key_fn, &processed) {
                Ok(keyed) => out.push(keyed),
                Err(ChunkError::Failed(e)) => return Err(e),
                Err(ChunkError::Aborted) => return Err(ClusterError::Cancelled),
            }
        }
        Ok(out)
    }

    /// Key every value on `pool`, one task per chunk.
    ///
    /// On failure the error from the lowest-indexed failed chunk is returned;
    /// chunks that stopped because of it are discarded.
    pub fn key_parallel<'v, V, F>(
        &self,
        pool: &ThreadPool,
        values: &[&'v V],
        key_fn: &F,
    ) -> Result<Vec<Keyed<'v, F::Key, V>>, ClusterError>
    where
        V: Debug + Sync,
        F: KeyFn<V>,
    {
        let processed = AtomicUsize::new(0);
        let outcomes: Vec<Result<Keyed<'v, F::Key, V>, ChunkError>> = pool.install(|| {
            values
                .par_chunks(self.chunk_size)
                .map(|chunk| self.run_chunk(chunk, key_fn, &processed))
                .collect()
        });

        let mut out = Vec::with_capacity(outcomes.len());
        let mut aborted = false;
        for outcome in outcomes {
            match outcome {
                Ok(keyed) => out.push(keyed),
                Err(ChunkError::Failed(e)) => return Err(e),
                Err(ChunkError::Aborted) => aborted = true,
            }
        }
        if aborted {
            // Only reachable if the abort flag was raised outside this call.
            return Err(ClusterError::Cancelled);
        }
        Ok(out)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{infallible, key_fn};
    use keycluster_core::errors::KeyFnError;

    fn ctx<'a>(
        events: &'a EventDispatcher,
        abort: &'a AtomicBool,
        retry: RetryPolicy,
    ) -> KeyContext<'a> {
        KeyContext {
            retry,
            chunk_size: 2,
            cancel: None,
            events,
            abort,
            progress_total: None,
        }
    }

    #[test]
    fn sequential_keys_every_value_in_order() {
        let events = EventDispatcher::new();
        let abort = AtomicBool::new(false);
        let values = ["a".to_string(), "bb".to_string(), "ccc".to_string()];
        let refs: Vec<&String> = values.iter().collect();
        let keyed = ctx(&events, &abort, RetryPolicy::NONE)
            .key_sequential(&refs, &infallible(|s: &String| s.len()))
            .unwrap();
        let flat: Vec<(usize, &String)> = keyed.into_iter().flatten().collect();
        assert_eq!(flat, vec![(1, &values[0]), (2, &values[1]), (3, &values[2])]);
    }

    #[test]
    fn transient_failure_retried_within_budget() {
        let events = EventDispatcher::new();
        let abort = AtomicBool::new(false);
        let calls = AtomicUsize::new(0);
        let flaky = key_fn(|s: &String| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(KeyFnError::transient("busy"))
            } else {
                Ok(s.clone())
            }
        });
        let v = "x".to_string();
        let key = ctx(&events, &abort, RetryPolicy::attempts(3)).key_one(&v, &flaky).unwrap();
        assert_eq!(key, "x");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn permanent_failure_not_retried() {
        let events = EventDispatcher::new();
        let abort = AtomicBool::new(false);
        let calls = AtomicUsize::new(0);
        let broken = key_fn(|_: &String| -> Result<String, KeyFnError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(KeyFnError::new("malformed"))
        });
        let v = "x".to_string();
        let err = ctx(&events, &abort, RetryPolicy::attempts(5)).key_one(&v, &broken).unwrap_err();
        assert!(matches!(err, ClusterError::KeyComputation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panic_becomes_worker_panicked() {
        let events = EventDispatcher::new();
        let abort = AtomicBool::new(false);
        let values = ["ok".to_string(), "boom".to_string()];
        let refs: Vec<&String> = values.iter().collect();
        let exploding = infallible(|s: &String| {
            if s == "boom" {
                panic!("key function exploded");
            }
            s.clone()
        });
        let err = ctx(&events, &abort, RetryPolicy::NONE)
            .key_sequential(&refs, &exploding)
            .unwrap_err();
        match err {
            ClusterError::Concurrency(ConcurrencyError::WorkerPanicked { message }) => {
                assert!(message.contains("exploded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(abort.load(Ordering::SeqCst));
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic payload");
    }
}
