//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env`].
//! Tests use [`Env::fixed()`] backed by a map, eliminating the need for
//! `unsafe` calls to [`std::env::set_var`] / [`std::env::remove_var`].

use std::collections::BTreeMap;

/// Environment variable reader.
///
/// Wraps lookups so that production code hits `std::env` while tests
/// (and embedders resolving configuration for someone else) can supply
/// a controlled set of values.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<BTreeMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn fixed(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Create an `Env` with no variables at all.
    pub fn empty() -> Self {
        Self {
            overrides: Some(BTreeMap::new()),
        }
    }

    /// All variables whose name starts with `prefix`.
    ///
    /// Variables that are not valid unicode are skipped.
    pub fn vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        match &self.overrides {
            Some(map) => map
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .filter(|(k, _)| k.starts_with(prefix))
                .collect(),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}
