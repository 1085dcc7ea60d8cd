//! Token fingerprint keyer.
//!
//! Lowercases, strips punctuation and control characters, then keys on the
//! sorted set of whitespace-separated tokens. Word order, repeated words,
//! letter case and punctuation no longer distinguish values:
//! `"Main St."`, `"st main"` and `"MAIN  ST"` all key to `"main st"`.

use std::collections::BTreeSet;
use once_cell::sync::Lazy;
use regex::Regex;

use keycluster_core::errors::KeyFnError;

use super::KeyFn;

/// Punctuation plus control characters other than tab.
pub(crate) static PUNCTUATION_AND_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{P}\x00-\x08\x0A-\x1F\x7F]").unwrap());

/// Token fingerprint key function.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fingerprint;

impl Fingerprint {
    pub fn fingerprint(&self, s: &str) -> String {
        let lowered = s.trim().to_lowercase();
        let stripped = PUNCTUATION_AND_CONTROL.replace_all(&lowered, "");
        let tokens: BTreeSet<&str> = stripped.split_whitespace().collect();
        tokens.into_iter().collect::<Vec<_>>().join(" ")
    }
}

impl<V> KeyFn<V> for Fingerprint
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
    fn word_order_and_case_ignored() {
        let f = Fingerprint;
        assert_eq!(f.fingerprint("Main St."), "main st");
        assert_eq!(f.fingerprint("st main"), "main st");
        assert_eq!(f.fingerprint("  MAIN   ST  "), "main st");
    }

    #[test]
    fn duplicate_tokens_collapse() {
        assert_eq!(Fingerprint.fingerprint("main main st"), "main st");
    }

    #[test]
    fn punctuation_inside_token_joins() {
        assert_eq!(Fingerprint.fingerprint("O'Connell St"), "oconnell st");
    }

    #[test]
    fn newline_is_stripped_tab_separates() {
        assert_eq!(Fingerprint.fingerprint("main\nst"), "mainst");
        assert_eq!(Fingerprint.fingerprint("main\tst"), "main st");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert_eq!(Fingerprint.fingerprint(""), "");
        assert_eq!(Fingerprint.fingerprint("..."), "");
    }

    #[test]
    fn works_on_str_and_string() {
        let owned = String::from("Elm Ave");
        assert_eq!(KeyFn::<String>::key(&Fingerprint, &owned).unwrap(), "ave elm");
        assert_eq!(KeyFn::<str>::key(&Fingerprint, "Elm Ave").unwrap(), "ave elm");
    }
}
