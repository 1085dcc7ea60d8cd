//! Tests for the keycluster error handling system.

use std::collections::HashSet;

use keycluster_core::errors::error_code::{self, KeyclusterErrorCode};
use keycluster_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let key = KeyFnError::new("bad value");
    assert!(!key.error_code().is_empty());

    let cluster = ClusterError::Cancelled;
    assert!(!cluster.error_code().is_empty());

    let concurrency = ConcurrencyError::WorkerPanicked {
        message: "boom".into(),
    };
    assert!(!concurrency.error_code().is_empty());

    let config = ConfigError::FileNotFound {
        path: "/tmp".into(),
    };
    assert!(!config.error_code().is_empty());
}

#[test]
fn test_from_conversions() {
    let pool = ConcurrencyError::PoolBuild {
        threads: 4,
        message: "no threads".into(),
    };
    let err: ClusterError = pool.into();
    assert!(matches!(err, ClusterError::Concurrency(ConcurrencyError::PoolBuild { .. })));
    assert_eq!(err.error_code(), error_code::CONCURRENCY_ERROR);

    let config = ConfigError::ValidationFailed {
        field: "cluster.concurrency".into(),
        message: "must be greater than 0".into(),
    };
    let err: ClusterError = config.into();
    assert!(matches!(err, ClusterError::Config(_)));
    assert_eq!(err.error_code(), error_code::CONFIG_ERROR);
}

#[test]
fn test_key_computation_carries_value() {
    let err = ClusterError::key_computation("Main St", KeyFnError::new("unparseable"));
    match &err {
        ClusterError::KeyComputation { value, source } => {
            assert_eq!(value, "\"Main St\"");
            assert_eq!(source.message, "unparseable");
            assert!(!source.is_transient());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let text = err.to_string();
    assert!(text.contains("Main St"));
    assert!(text.contains("unparseable"));
}

#[test]
fn test_coded_string_format() {
    let err = ClusterError::Cancelled;
    assert_eq!(err.coded_string(), "[CANCELLED] Clustering cancelled");

    let err = ClusterError::InvalidConcurrency(0);
    assert!(err.coded_string().starts_with("[INVALID_CONCURRENCY]"));
}

#[test]
fn test_worker_panic_has_distinct_code() {
    let err: ClusterError = ConcurrencyError::WorkerPanicked {
        message: "index out of bounds".into(),
    }
    .into();
    assert_eq!(err.error_code(), error_code::WORKER_PANICKED);
}

#[test]
fn test_error_codes_unique() {
    let codes = [
        error_code::KEY_COMPUTATION_ERROR,
        error_code::KEY_FN_ERROR,
        error_code::CONCURRENCY_ERROR,
        error_code::WORKER_PANICKED,
        error_code::CANCELLED,
        error_code::INVALID_CONCURRENCY,
        error_code::CONFIG_ERROR,
    ];
    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}

#[test]
fn test_transient_flag() {
    assert!(KeyFnError::transient("lookup timed out").is_transient());
    assert!(!KeyFnError::new("empty").is_transient());
}
