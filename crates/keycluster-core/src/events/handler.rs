//! ClusterEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing clustering runs.
///
/// All methods have no-op default implementations, so handlers only need
/// to override the events they care about. `Send + Sync` is required
/// because progress events fire from worker threads.
pub trait ClusterEventHandler: Send + Sync {
    fn on_cluster_started(&self, _event: &ClusterStartedEvent) {}
    fn on_cluster_progress(&self, _event: &ClusterProgressEvent) {}
    fn on_cluster_complete(&self, _event: &ClusterCompleteEvent) {}
    fn on_key_retry(&self, _event: &KeyRetryEvent) {}
    fn on_error(&self, _event: &ErrorEvent) {}
}
