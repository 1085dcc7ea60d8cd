//! Key-collision clustering.
//!
//! Keys are computed per distinct value, sequentially or on a worker pool,
//! then merged into one `key -> set of values` mapping on the calling
//! thread. The grouping does not depend on how work was partitioned.

pub mod clusterer;
pub mod options;
pub mod result;
mod worker;

pub use clusterer::{cluster, Clusterer};
pub use options::{ClusterOptions, RetryPolicy};
pub use result::{ClusterStats, Clustering};
