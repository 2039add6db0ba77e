//! Values given explicitly on the command line.

use clap::ArgMatches;
use clap::parser::ValueSource;
use serde_json::Value;

use super::FlatMap;
use crate::flagset::FlagBinding;
use crate::keys;
use crate::options::ParseOptions;

/// Collect the flags set on the command line.
///
/// Defaults clap fills in for help rendering never count; only
/// [`ValueSource::CommandLine`] values reach the flags layer.
pub fn collect(matches: &ArgMatches, bindings: &[FlagBinding], opts: &ParseOptions) -> FlatMap {
    let mut map = FlatMap::new();
    for binding in bindings {
        if matches.value_source(&binding.id) != Some(ValueSource::CommandLine) {
            continue;
        }
        let value = if binding.boolean {
            matches
                .try_get_one::<bool>(&binding.id)
                .ok()
                .flatten()
                .map(|b| Value::Bool(*b))
        } else {
            matches
                .try_get_one::<String>(&binding.id)
                .ok()
                .flatten()
                .map(|s| Value::String(s.clone()))
        };
        if let Some(value) = value {
            map.insert(keys::from_flag_name(&binding.id, opts), value);
        }
    }
    map
}

/// Whether the help flag was given.
pub fn help_requested(matches: &ArgMatches, opts: &ParseOptions) -> bool {
    matches
        .try_get_one::<bool>(opts.help_flag())
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
