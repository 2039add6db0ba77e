//! Precedence resolution across source layers.
//!
//! Precedence is data, not control flow: layers are pushed in order from
//! lowest to highest precedence and merged left to right, later layers
//! overwriting earlier ones key by key.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

use crate::sources::{FlatMap, Source};

/// Values contributed by one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub source: Source,
    pub values: FlatMap,
}

impl Layer {
    pub fn new(source: Source, values: FlatMap) -> Self {
        Self { source, values }
    }
}

/// Merged values together with the source each one came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    values: FlatMap,
    origins: IndexMap<String, Source>,
}

impl Resolution {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Source that supplied the winning value of `key`.
    pub fn origin(&self, key: &str) -> Option<Source> {
        self.origins.get(key).copied()
    }

    pub fn values(&self) -> &FlatMap {
        &self.values
    }

    pub fn into_values(self) -> FlatMap {
        self.values
    }
}

/// Merge `layers` left to right.
pub fn resolve(layers: &[Layer]) -> Resolution {
    let mut resolution = Resolution::default();
    for layer in layers {
        tracing::debug!(source = %layer.source, keys = layer.values.len(), "applying configuration layer");
        for (key, value) in &layer.values {
            resolution.values.insert(key.clone(), value.clone());
            resolution.origins.insert(key.clone(), layer.source);
        }
    }
    for (key, source) in &resolution.origins {
        tracing::debug!(%key, %source, "resolved configuration key");
    }
    resolution
}

/// Locate the config file: the first candidate holding a non-empty string
/// under `key` wins and later candidates are not consulted.
pub fn resolve_config_path(candidates: &[&FlatMap], key: &str) -> Option<PathBuf> {
    candidates.iter().find_map(|map| match map.get(key) {
        Some(Value::String(path)) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => None,
    })
}
