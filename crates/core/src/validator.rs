//! Field-level validation accumulator.
//!
//! A [`Validator`] collects failure messages keyed by field name. Every failed
//! [`Validator::check`] appends its message, so a field can report several
//! problems at once.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

pub type ValidationErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

/// True if no two values are equal.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

/// True if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_is_valid() {
        assert!(Validator::new().valid());
    }

    #[test]
    fn test_check_records_only_failures() {
        let mut v = Validator::new();
        v.check(true, "title", "must be provided");
        assert!(v.valid());

        v.check(false, "title", "must be provided");
        assert!(!v.valid());
        assert_eq!(v.errors()["title"], vec!["must be provided"]);
    }

    #[test]
    fn test_messages_append_per_key() {
        let mut v = Validator::new();
        v.check(false, "year", "must be provided");
        v.check(false, "year", "must be greater than 1888");

        assert_eq!(
            v.into_errors()["year"],
            vec!["must be provided", "must be greater than 1888"]
        );
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut v = Validator::new();
        v.add_error("title", "must be provided");
        v.add_error("genres", "must be provided");

        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(
            json,
            r#"{"genres":["must be provided"],"title":["must be provided"]}"#
        );
    }

    #[test]
    fn test_unique() {
        assert!(unique(&["a", "b", "c"]));
        assert!(!unique(&["a", "a"]));
        assert!(!unique(&["a", "b", "a"]));
        assert!(unique::<&str>(&[]));
        assert!(unique(&["A", "a"]));
    }

    #[test]
    fn test_permitted_value() {
        assert!(permitted_value(&"drama", &["drama", "comedy"]));
        assert!(!permitted_value(&"horror", &["drama", "comedy"]));
    }
}
