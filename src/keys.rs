//! Conversions between the canonical key form and its env/flag spellings.
//!
//! The canonical form is lower-case with segments joined by the configured
//! delimiter (`client.id`). Every source converts into it so layers can be
//! merged key for key.

use crate::options::ParseOptions;

/// `SNKD_CLIENT_ID` → `client.id`.
///
/// Returns `None` when the name lacks the prefix or nothing follows it.
pub fn from_env_name(name: &str, opts: &ParseOptions) -> Option<String> {
    let rest = name.strip_prefix(opts.env_prefix())?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.replace('_', opts.delimiter()).to_lowercase())
}

/// `client.id` → `SNKD_CLIENT_ID`.
pub fn to_env_name(key: &str, opts: &ParseOptions) -> String {
    format!(
        "{}{}",
        opts.env_prefix(),
        key.replace(opts.delimiter(), "_").to_uppercase()
    )
}

/// `client.id` → `client-id`.
pub fn to_flag_name(key: &str, opts: &ParseOptions) -> String {
    key.replace(opts.delimiter(), "-")
}

/// `client-id` → `client.id`.
pub fn from_flag_name(name: &str, opts: &ParseOptions) -> String {
    name.replace('-', opts.delimiter()).to_lowercase()
}
