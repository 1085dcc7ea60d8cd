//! Character n-gram fingerprint keyer.
//!
//! Removes punctuation, control characters and all whitespace, lowercases,
//! then keys on the sorted set of distinct character n-grams. Catches
//! split or merged words (`"Main Street"` vs `"MainStreet"`) that the token
//! fingerprint misses.

use std::collections::BTreeSet;

use keycluster_core::errors::{ConfigError, KeyFnError};

use super::fingerprint::PUNCTUATION_AND_CONTROL;
use super::KeyFn;

/// Character n-gram fingerprint key function.
#[derive(Debug, Clone, Copy)]
pub struct NGramFingerprint {
    n: usize,
}

impl NGramFingerprint {
    pub fn new(n: usize) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "ngram.n".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(Self { n })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn fingerprint(&self, s: &str) -> String {
        let lowered = s.to_lowercase();
        let stripped = PUNCTUATION_AND_CONTROL.replace_all(&lowered, "");
        let chars: Vec<char> = stripped.chars().filter(|c| !c.is_whitespace()).collect();

        // Shorter than one gram: the whole string is its only gram.
        if chars.len() < self.n {
            return chars.into_iter().collect();
        }

        let grams: BTreeSet<String> = chars
            .windows(self.n)
            .map(|w| w.iter().collect())
            .collect();
        grams.into_iter().collect()
    }
}

impl<V> KeyFn<V> for NGramFingerprint
where
    V: AsRef<str> + ?Sized,
{
    type Key = String;

    fn key(&self, value: &V) -> Result<String, KeyFnError> {
        Ok(self.fingerprint(value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rejected() {
        assert!(NGramFingerprint::new(0).is_err());
    }

    #[test]
    fn whitespace_insensitive() {
        let f = NGramFingerprint::new(2).unwrap();
        assert_eq!(f.fingerprint("Main Street"), f.fingerprint("MainStreet"));
        assert_eq!(f.fingerprint("Main Street"), f.fingerprint("main-street"));
    }

    #[test]
    fn sorted_distinct_grams() {
        let f = NGramFingerprint::new(2).unwrap();
        // grams of "abab": ab, ba, ab -> {ab, ba}
        assert_eq!(f.fingerprint("abab"), "abba");
    }

    #[test]
    fn unigram_is_sorted_letter_set() {
        let f = NGramFingerprint::new(1).unwrap();
        assert_eq!(f.fingerprint("cab bac"), "abc");
    }

    #[test]
    fn short_input_keeps_identity() {
        let f = NGramFingerprint::new(3).unwrap();
        assert_eq!(f.fingerprint("a"), "a");
        assert_ne!(f.fingerprint("a"), f.fingerprint("b"));
        assert_eq!(f.fingerprint(""), "");
    }
}
