//! Unmarshalling the merged flat mapping into the destination type.
//!
//! Environment, file and flag values arrive as strings. They are coerced
//! to the kind of the field they target (weakly: `"1"` is a valid bool,
//! an empty string a valid zero) before serde sees them.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::ConfigError;
use crate::options::ParseOptions;
use crate::schema::{Field, Kind};
use crate::sources::FlatMap;

/// Decode `values` into `T`.
///
/// Keys matching one of `fields` are coerced first; any other key is
/// passed through untouched and left to serde (ignored unless `T` denies
/// unknown fields).
pub fn decode<T: DeserializeOwned>(
    values: FlatMap,
    fields: &[Field],
    opts: &ParseOptions,
) -> Result<T, ConfigError> {
    let by_key: HashMap<&str, &Field> = fields.iter().map(|f| (f.key.as_str(), f)).collect();
    let coerced = values
        .into_iter()
        .map(|(key, value)| {
            let value = match by_key.get(key.as_str()) {
                Some(field) => coerce(field, value)?,
                None => value,
            };
            Ok((key, value))
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    serde_json::from_value(build_object(coerced, opts)).map_err(ConfigError::Decode)
}

/// Convert `value` to the kind of `field`.
///
/// An empty string on a nullable field becomes `null` whatever its kind,
/// so `KEY=` restores a `None` default.
pub fn coerce(field: &Field, value: Value) -> Result<Value, ConfigError> {
    let kind = field.kind;
    let invalid = |raw: &str| ConfigError::InvalidValue {
        key: field.key.clone(),
        value: raw.to_string(),
        expected: kind,
    };
    match (kind, value) {
        (_, Value::String(s)) if field.nullable && s.is_empty() => Ok(Value::Null),
        (Kind::Bool, Value::String(s)) => parse_bool(&s).map(Value::Bool).ok_or_else(|| invalid(&s)),
        (Kind::Integer, Value::String(s)) => parse_integer(&s).ok_or_else(|| invalid(&s)),
        (Kind::Float, Value::String(s)) => parse_float(&s).ok_or_else(|| invalid(&s)),
        (Kind::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (Kind::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (Kind::List, Value::String(s)) => Ok(split_list(&s)),
        (_, value) => Ok(value),
    }
}

/// Find the kind of a key whose default is `null` by asking `T` which
/// sample value it accepts in that position.
///
/// Samples are tried from the most to the least restrictive target, so an
/// `Option<f64>` is not mistaken for an integer. Falls back to
/// [`Kind::Unset`] when `T` accepts none of them.
pub fn infer_kind<T: DeserializeOwned>(defaults: &FlatMap, key: &str, opts: &ParseOptions) -> Kind {
    let samples = [
        (Kind::String, Value::from("x")),
        (Kind::Bool, Value::Bool(true)),
        (Kind::Float, Value::from(0.5)),
        (Kind::Integer, Value::from(1)),
        (Kind::List, Value::Array(vec![Value::from("x")])),
    ];
    let kind = samples
        .into_iter()
        .find(|(_, sample)| {
            let pairs = defaults
                .iter()
                .map(|(k, v)| {
                    let value = if k == key { sample.clone() } else { v.clone() };
                    (k.clone(), value)
                })
                .collect();
            serde_json::from_value::<T>(build_object(pairs, opts)).is_ok()
        })
        .map(|(kind, _)| kind)
        .unwrap_or(Kind::Unset);
    tracing::debug!(%key, %kind, "inferred kind of optional key");
    kind
}

fn build_object(pairs: Vec<(String, Value)>, opts: &ParseOptions) -> Value {
    if opts.flat_struct() {
        Value::Object(pairs.into_iter().collect())
    } else {
        unflatten(pairs, opts.delimiter())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_integer(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Value::from(0));
    }
    raw.parse::<i64>()
        .map(Value::from)
        .or_else(|_| raw.parse::<u64>().map(Value::from))
        .ok()
}

fn parse_float(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Number::from_f64(0.0).map(Value::Number);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn split_list(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

/// Rebuild nesting from dotted keys.
///
/// When two keys disagree about the shape of a path (`server` holding a
/// scalar and `server.port` a nested value), the one inserted first wins
/// and the other is dropped.
fn unflatten(pairs: Vec<(String, Value)>, delimiter: &str) -> Value {
    let mut root = Map::new();
    'keys: for (key, value) in pairs {
        let segments: Vec<&str> = key.split(delimiter).collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut node = &mut root;
        for segment in parents {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match entry {
                Value::Object(inner) => inner,
                _ => {
                    tracing::warn!(%key, "key path crosses a scalar value, dropping");
                    continue 'keys;
                }
            };
        }
        if matches!(node.get(*last), Some(Value::Object(_))) {
            tracing::warn!(%key, "scalar key shadows nested keys, dropping");
            continue;
        }
        node.insert(last.to_string(), value);
    }
    Value::Object(root)
}
