//! Schema descriptors and the key reflector.
//!
//! A configuration type is any `Serialize + DeserializeOwned` struct whose
//! serialized field names are the dotted key paths. Flattening a value of
//! it yields the defaults; the [`Schema`] descriptor adds what serde cannot
//! express: per-key descriptions, kind hints for `Option` fields and the
//! optional validation hook.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::sources::FlatMap;

/// Scalar kind of a configuration key, inferred from its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Bool,
    Integer,
    Float,
    String,
    List,
    /// `null` default whose type could not be determined.
    Unset,
}

impl Kind {
    /// Kind of a flattened leaf value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Kind::Bool,
            Value::Number(n) if n.is_f64() => Kind::Float,
            Value::Number(_) => Kind::Integer,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::List,
            Value::Null | Value::Object(_) => Kind::Unset,
        }
    }
}

/// One declared configuration key.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub kind: Kind,
    pub default: Value,
    pub description: String,
    /// The registration default was `null`; an empty value decodes back to it.
    pub nullable: bool,
}

/// Opt-in validation for configuration types.
///
/// Wire it up with [`SchemaBuilder::validated`].
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

type Validator<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Descriptor attached to a configuration type.
pub struct Schema<T> {
    descriptions: HashMap<String, String>,
    kinds: HashMap<String, Kind>,
    validator: Option<Validator<T>>,
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("descriptions", &self.descriptions)
            .field("kinds", &self.kinds)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self {
            descriptions: HashMap::new(),
            kinds: HashMap::new(),
            validator: None,
        }
    }
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            schema: Self::default(),
        }
    }

    /// Human-readable description of `key`, empty when none was given.
    pub fn description(&self, key: &str) -> &str {
        self.descriptions.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn kind_hint(&self, key: &str) -> Option<Kind> {
        self.kinds.get(key).copied()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Run the validation hook, if any.
    pub fn validate(&self, config: &T) -> Result<(), ConfigError> {
        match &self.validator {
            Some(validator) => validator(config).map_err(ConfigError::Validation),
            None => Ok(()),
        }
    }
}

impl<T: Serialize> Schema<T> {
    /// Field descriptors for every key `config` serializes to.
    pub fn fields(&self, config: &T, delimiter: &str) -> Vec<Field> {
        flatten(config, delimiter)
            .into_iter()
            .map(|(key, default)| {
                if key.chars().any(char::is_uppercase) {
                    tracing::warn!(%key, "key is not lower-case; env and flag values will never match it");
                }
                let kind = self.kind_hint(&key).unwrap_or_else(|| Kind::of(&default));
                let description = self.description(&key).to_string();
                Field {
                    key,
                    kind,
                    nullable: default.is_null(),
                    default,
                    description,
                }
            })
            .collect()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<T> {
    schema: Schema<T>,
}

impl<T> SchemaBuilder<T> {
    /// Attach help text to `key`.
    pub fn describe(mut self, key: impl Into<String>, description: impl Into<String>) -> Self {
        self.schema
            .descriptions
            .insert(key.into(), description.into());
        self
    }

    /// Force the kind of `key`, e.g. `Integer` for an `Option<u16>` field.
    pub fn kind(mut self, key: impl Into<String>, kind: Kind) -> Self {
        self.schema.kinds.insert(key.into(), kind);
        self
    }

    /// Run `validator` after every successful decode.
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.schema.validator = Some(Box::new(validator));
        self
    }

    pub fn build(self) -> Schema<T> {
        self.schema
    }
}

impl<T: Validate> SchemaBuilder<T> {
    /// Use the type's own [`Validate`] implementation as the hook.
    pub fn validated(self) -> Self {
        self.validator(|config: &T| config.validate())
    }
}

/// Flatten `config` into dotted keys.
///
/// Never fails: a value that does not serialize to an object yields an
/// empty mapping.
pub fn flatten<S: Serialize + ?Sized>(config: &S, delimiter: &str) -> FlatMap {
    match try_flatten(config, delimiter) {
        Ok(map) => map,
        Err(err) => {
            tracing::warn!(error = %err, "configuration value could not be reflected");
            FlatMap::new()
        }
    }
}

/// Flatten `config` into dotted keys, surfacing serialization failures.
pub fn try_flatten<S: Serialize + ?Sized>(
    config: &S,
    delimiter: &str,
) -> Result<FlatMap, serde_json::Error> {
    let mut out = FlatMap::new();
    if let Value::Object(map) = serde_json::to_value(config)? {
        flatten_into(&mut out, None, map, delimiter);
    }
    Ok(out)
}

fn flatten_into(out: &mut FlatMap, prefix: Option<&str>, map: Map<String, Value>, delimiter: &str) {
    for (segment, value) in map {
        let key = match prefix {
            Some(prefix) => format!("{prefix}{delimiter}{segment}"),
            None => segment,
        };
        match value {
            Value::Object(inner) => flatten_into(out, Some(&key), inner, delimiter),
            leaf => {
                out.insert(key, leaf);
            }
        }
    }
}

/// Plain-text rendering of a leaf value (flag defaults, `.env` values).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
