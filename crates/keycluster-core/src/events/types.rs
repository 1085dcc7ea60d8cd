//! Event payload types for clustering lifecycle events.

/// Payload for `on_cluster_started`.
#[derive(Debug, Clone)]
pub struct ClusterStartedEvent {
    pub input_values: usize,
    pub distinct_values: usize,
    pub workers: usize,
}

/// Payload for `on_cluster_progress`. Emitted once per completed chunk
/// on the parallel path and once per batch on the streamed path.
#[derive(Debug, Clone)]
pub struct ClusterProgressEvent {
    pub processed: usize,
    pub total: Option<usize>,
}

/// Payload for `on_cluster_complete`.
#[derive(Debug, Clone)]
pub struct ClusterCompleteEvent {
    pub distinct_values: usize,
    pub clusters: usize,
    pub duration_ms: u64,
}

/// Payload for `on_key_retry`.
#[derive(Debug, Clone)]
pub struct KeyRetryEvent {
    pub value: String,
    pub attempt: u32,
    pub message: String,
}

/// Payload for `on_error`.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub message: String,
    pub error_code: String,
}
