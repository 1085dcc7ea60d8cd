//! Clustering result: a partition of the distinct input values by key.

use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use keycluster_core::tracing::metrics;
use keycluster_core::types::collections::{FxHashMap, FxHashSet};

/// Counters and timings for one clustering call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterStats {
    /// Values supplied, duplicates included.
    pub input_values: usize,
    pub distinct_values: usize,
    pub clusters: usize,
    pub largest_cluster: usize,
    /// Worker threads that computed keys (1 on the sequential path).
    pub workers: usize,
    /// Batches consumed; 1 for a materialized input.
    pub batches: usize,
    pub key_ms: u64,
    pub merge_ms: u64,
}

impl ClusterStats {
    /// Distinct values keyed per second, 0 when keying took under a millisecond.
    pub fn values_per_second(&self) -> u64 {
        if self.key_ms == 0 {
            return 0;
        }
        (self.distinct_values as u64).saturating_mul(1000) / self.key_ms
    }
}

/// Renders as `field=value` pairs using the shared metric field names.
impl fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} {}={} {}={} {}={} {}={} {}={} {}={} {}={}",
            metrics::INPUT_VALUES,
            self.input_values,
            metrics::DISTINCT_VALUES,
            self.distinct_values,
            metrics::CLUSTERS,
            self.clusters,
            metrics::WORKERS,
            self.workers,
            metrics::BATCHES,
            self.batches,
            metrics::KEY_MS,
            self.key_ms,
            metrics::MERGE_MS,
            self.merge_ms,
            metrics::VALUES_PER_SECOND,
            self.values_per_second(),
        )
    }
}

/// Mapping from key to the set of distinct values that produced it.
///
/// Every distinct input value is in exactly one cluster. Iteration order
/// is unspecified.
#[derive(Debug, Clone)]
pub struct Clustering<K, V> {
    clusters: FxHashMap<K, FxHashSet<V>>,
    stats: ClusterStats,
}

impl<K, V> Clustering<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    pub(crate) fn new(clusters: FxHashMap<K, FxHashSet<V>>, mut stats: ClusterStats) -> Self {
        stats.clusters = clusters.len();
        stats.distinct_values = clusters.values().map(|m| m.len()).sum();
        stats.largest_cluster = clusters.values().map(|m| m.len()).max().unwrap_or(0);
        Self { clusters, stats }
    }

    pub fn empty() -> Self {
        Self::new(FxHashMap::default(), ClusterStats::default())
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&FxHashSet<V>> {
        self.clusters.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.clusters.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &FxHashSet<V>)> {
        self.clusters.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.clusters.keys()
    }

    /// Total distinct values across all clusters.
    pub fn distinct_values(&self) -> usize {
        self.stats.distinct_values
    }

    /// Key of the cluster holding `value`. Linear in the number of clusters.
    pub fn key_of(&self, value: &V) -> Option<&K> {
        self.clusters
            .iter()
            .find(|(_, members)| members.contains(value))
            .map(|(k, _)| k)
    }

    /// Every member value, cluster by cluster.
    pub fn flatten(&self) -> impl Iterator<Item = &V> {
        self.clusters.values().flatten()
    }

    /// True when `other` groups exactly the same values together,
    /// regardless of which keys label the groups.
    pub fn same_partition<K2>(&self, other: &Clustering<K2, V>) -> bool
    where
        K2: Eq + Hash,
    {
        if self.len() != other.len() || self.distinct_values() != other.distinct_values() {
            return false;
        }
        let mut owner: FxHashMap<&V, &FxHashSet<V>> = FxHashMap::default();
        for members in other.clusters.values() {
            for v in members {
                owner.insert(v, members);
            }
        }
        self.clusters.values().all(|members| {
            members
                .iter()
                .next()
                .and_then(|first| owner.get(first))
                .is_some_and(|theirs| *theirs == members)
        })
    }

    pub fn stats(&self) -> &ClusterStats {
        &self.stats
    }

    pub fn into_inner(self) -> FxHashMap<K, FxHashSet<V>> {
        self.clusters
    }
}

impl<K, V> Clustering<K, V>
where
    K: Eq + Hash + Ord,
    V: Eq + Hash,
{
    /// Clusters with at least `min_size` members, largest first, ties by key.
    ///
    /// With `min_size = 2` this is the list of merge candidates a cleaning
    /// tool would present: groups of differently-spelled values that collide.
    pub fn candidates(&self, min_size: usize) -> Vec<(&K, &FxHashSet<V>)> {
        let mut out: Vec<_> = self
            .clusters
            .iter()
            .filter(|(_, members)| members.len() >= min_size)
            .collect();
        out.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        out
    }
}

impl<K, V> PartialEq for Clustering<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    /// Compares the key to member-set mapping only; stats are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.clusters == other.clusters
    }
}

impl<K: Eq + Hash, V: Eq + Hash> Eq for Clustering<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(groups: &[(&str, &[&str])]) -> Clustering<String, String> {
        let mut map: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
        for (k, vs) in groups {
            map.insert(k.to_string(), vs.iter().map(|v| v.to_string()).collect());
        }
        Clustering::new(map, ClusterStats::default())
    }

    #[test]
    fn stats_derived_from_clusters() {
        let c = build(&[("a", &["a1", "a2", "a3"]), ("b", &["b1"])]);
        assert_eq!(c.stats().clusters, 2);
        assert_eq!(c.stats().distinct_values, 4);
        assert_eq!(c.stats().largest_cluster, 3);
    }

    #[test]
    fn same_partition_ignores_keys() {
        let a = build(&[("x", &["1", "2"]), ("y", &["3"])]);
        let b = build(&[("p", &["3"]), ("q", &["2", "1"])]);
        assert!(a.same_partition(&b));
        assert_ne!(a, b);

        let c = build(&[("x", &["1"]), ("y", &["2", "3"])]);
        assert!(!a.same_partition(&c));
    }

    #[test]
    fn candidates_sorted_by_size_then_key() {
        let c = build(&[
            ("b", &["b1", "b2"]),
            ("a", &["a1", "a2"]),
            ("c", &["c1", "c2", "c3"]),
            ("d", &["d1"]),
        ]);
        let keys: Vec<&String> = c.candidates(2).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn key_of_finds_owner() {
        let c = build(&[("x", &["1", "2"]), ("y", &["3"])]);
        assert_eq!(c.key_of(&"2".to_string()).map(String::as_str), Some("x"));
        assert_eq!(c.key_of(&"9".to_string()), None);
    }

    #[test]
    fn stats_display_uses_metric_names() {
        let stats = ClusterStats {
            input_values: 10,
            distinct_values: 8,
            clusters: 3,
            workers: 2,
            batches: 1,
            key_ms: 4,
            ..Default::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("input_values=10 distinct_values=8 clusters=3 workers=2"));
        assert!(text.ends_with("values_per_second=2000"));
    }

    #[test]
    fn empty_result() {
        let c: Clustering<String, String> = Clustering::empty();
        assert!(c.is_empty());
        assert_eq!(c.flatten().count(), 0);
        assert_eq!(c.stats().largest_cluster, 0);
    }
}
