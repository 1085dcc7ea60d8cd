use std::collections::HashSet;

use keycluster_engine::{cluster, infallible, ClusterOptions, Clusterer, Fingerprint, KeyFn};
use proptest::prelude::*;

fn small_pool(concurrency: usize) -> Clusterer {
    Clusterer::new(
        ClusterOptions::default()
            .with_concurrency(concurrency)
            .with_chunk_size(4)
            .with_min_parallel_values(0),
    )
    .unwrap()
}

fn values_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-cA-C .,]{0,6}", 0..80)
}

proptest! {
    #[test]
    fn every_distinct_value_in_exactly_one_cluster(values in values_strategy()) {
        let result = cluster(&values, &Fingerprint, 1).unwrap();
        let distinct: HashSet<&String> = values.iter().collect();

        let mut seen: HashSet<&String> = HashSet::new();
        for (key, members) in result.iter() {
            prop_assert!(!members.is_empty());
            for v in members {
                prop_assert!(seen.insert(v), "{:?} in two clusters", v);
                prop_assert_eq!(&Fingerprint.key(v).unwrap(), key);
            }
        }
        prop_assert_eq!(seen, distinct);
    }

    #[test]
    fn result_independent_of_concurrency(values in values_strategy(), k in 1usize..=4) {
        let sequential = cluster(&values, &Fingerprint, 1).unwrap();
        let par = small_pool(k).cluster(&values, &Fingerprint).unwrap();
        prop_assert_eq!(par, sequential);
    }

    #[test]
    fn reclustering_members_is_idempotent(values in values_strategy()) {
        let by_len = infallible(|s: &String| s.trim().len() % 3);
        let first = cluster(&values, &by_len, 1).unwrap();
        let members: Vec<String> = first.flatten().cloned().collect();
        let second = small_pool(2).cluster(&members, &by_len).unwrap();
        prop_assert_eq!(second, first);
    }

    #[test]
    fn repeated_runs_agree(values in values_strategy(), k in 1usize..=4) {
        let c = small_pool(k);
        let a = c.cluster(&values, &Fingerprint).unwrap();
        let b = c.cluster(&values, &Fingerprint).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn stream_equals_materialized(values in values_strategy(), batch in 1usize..20, k in 1usize..=3) {
        let expected = cluster(&values, &Fingerprint, 1).unwrap();
        let c = Clusterer::new(
            ClusterOptions::default()
                .with_concurrency(k)
                .with_chunk_size(3)
                .with_batch_size(batch)
                .with_min_parallel_values(0),
        )
        .unwrap();
        let streamed = c.cluster_stream(values.clone(), &Fingerprint).unwrap();
        prop_assert_eq!(streamed, expected);
    }
}
