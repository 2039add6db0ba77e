//! Source providers.
//!
//! Each provider turns one origin (defaults, `.env` file, environment,
//! CLI flags) into a [`FlatMap`] keyed by the canonical dotted form, so
//! the merge engine can layer them key for key.

pub mod environment;
pub mod file;
pub mod flags;

use indexmap::IndexMap;
use serde_json::Value;

/// Flat mapping from canonical dotted keys to scalar values.
pub type FlatMap = IndexMap<String, Value>;

/// Origin of a layer, listed from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Defaults,
    Environment,
    File,
    Flags,
}
