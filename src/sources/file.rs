//! `.env`-format configuration files.
//!
//! Lines are `SNKD_CLIENT_ID=value`, parsed with `dotenvy`. The file is
//! never exported into the process environment; its pairs only feed the
//! file layer.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use super::FlatMap;
use crate::error::ConfigError;
use crate::keys;
use crate::options::ParseOptions;

/// Load the `.env` file at `path`.
pub fn load(path: &Path, opts: &ParseOptions) -> Result<FlatMap, ConfigError> {
    let to_error = |source| ConfigError::SourceLoad {
        path: path.to_path_buf(),
        source,
    };
    let iter = dotenvy::from_path_iter(path).map_err(to_error)?;
    let pairs = iter.collect::<Result<Vec<_>, _>>().map_err(to_error)?;
    tracing::debug!(path = %path.display(), lines = pairs.len(), "read config file");
    Ok(into_flat_map(pairs, opts))
}

/// Parse `.env` content from any reader. `origin` names it in errors.
pub fn parse<R: Read>(reader: R, origin: &Path, opts: &ParseOptions) -> Result<FlatMap, ConfigError> {
    let pairs = dotenvy::from_read_iter(reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::SourceLoad {
            path: origin.to_path_buf(),
            source,
        })?;
    Ok(into_flat_map(pairs, opts))
}

fn into_flat_map(pairs: Vec<(String, String)>, opts: &ParseOptions) -> FlatMap {
    let mut map = FlatMap::new();
    for (name, value) in pairs {
        match keys::from_env_name(&name, opts) {
            Some(key) => {
                map.insert(key, Value::String(value));
            }
            None => tracing::debug!(%name, "skipping config file entry without prefix"),
        }
    }
    map
}
