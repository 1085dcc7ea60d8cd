//! The `KeyFn` trait and closure adapters.

use std::hash::Hash;

use keycluster_core::errors::KeyFnError;

/// A pure, deterministic mapping from a value to its clustering key.
///
/// Implementations must return the same key for equal values and must be
/// safe to call from several worker threads at once.
pub trait KeyFn<V: ?Sized>: Send + Sync {
    type Key: Eq + Hash + Clone + Send;

    fn key(&self, value: &V) -> Result<Self::Key, KeyFnError>;
}

/// Adapter for fallible closures. Built with [`key_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnKey<F>(F);

/// Use a closure returning `Result<K, KeyFnError>` as a key function.
pub fn key_fn<V, K, F>(f: F) -> FnKey<F>
where
    V: ?Sized,
    F: Fn(&V) -> Result<K, KeyFnError> + Send + Sync,
{
    FnKey(f)
}

impl<V, K, F> KeyFn<V> for FnKey<F>
where
    V: ?Sized,
    K: Eq + Hash + Clone + Send,
    F: Fn(&V) -> Result<K, KeyFnError> + Send + Sync,
{
    type Key = K;

    fn key(&self, value: &V) -> Result<K, KeyFnError> {
        (self.0)(value)
    }
}

/// Adapter for closures that cannot fail. Built with [`infallible`].
#[derive(Debug, Clone, Copy)]
pub struct InfallibleKey<F>(F);

/// Use a closure returning a bare key as a key function.
pub fn infallible<V, K, F>(f: F) -> InfallibleKey<F>
where
    V: ?Sized,
    F: Fn(&V) -> K + Send + Sync,
{
    InfallibleKey(f)
}

impl<V, K, F> KeyFn<V> for InfallibleKey<F>
where
    V: ?Sized,
    K: Eq + Hash + Clone + Send,
    F: Fn(&V) -> K + Send + Sync,
{
    type Key = K;

    fn key(&self, value: &V) -> Result<K, KeyFnError> {
        Ok((self.0)(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_adapters() {
        let upper = infallible(|s: &String| s.to_uppercase());
        assert_eq!(upper.key(&"main st".to_string()).unwrap(), "MAIN ST");

        let strict = key_fn(|s: &String| {
            if s.is_empty() {
                Err(KeyFnError::new("empty"))
            } else {
                Ok(s.len())
            }
        });
        assert_eq!(strict.key(&"abc".to_string()).unwrap(), 3);
        assert!(strict.key(&String::new()).is_err());
    }
}
