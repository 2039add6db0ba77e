//! Immutable parse options shared by every stage.

use crate::constants::{
    DEFAULT_CONFIG_PATH_KEY, DEFAULT_DELIMITER, DEFAULT_ENV_PREFIX, DEFAULT_HELP_FLAG,
};

/// Options controlling key naming and lookup.
///
/// Built by value with the `with_*` methods and never mutated afterwards;
/// every stage receives it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    env_prefix: String,
    delimiter: String,
    flat_struct: bool,
    help_flag: String,
    config_path_key: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            flat_struct: true,
            help_flag: DEFAULT_HELP_FLAG.to_string(),
            config_path_key: DEFAULT_CONFIG_PATH_KEY.to_string(),
        }
    }
}

impl ParseOptions {
    /// Prefix environment variables and `.env` keys must carry.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Separator between key path segments. An empty delimiter is ignored.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            tracing::warn!(kept = %self.delimiter, "ignoring empty key delimiter");
            return self;
        }
        self.delimiter = delimiter;
        self
    }

    /// Whether the destination struct names its fields with full dotted
    /// paths (`true`) or nests one struct per path segment (`false`).
    pub fn with_flat_struct(mut self, flat: bool) -> Self {
        self.flat_struct = flat;
        self
    }

    /// Name of the boolean flag that short-circuits loading.
    pub fn with_help_flag(mut self, name: impl Into<String>) -> Self {
        self.help_flag = name.into();
        self
    }

    /// Key that holds the path of the `.env` file to load.
    pub fn with_config_path_key(mut self, key: impl Into<String>) -> Self {
        self.config_path_key = key.into();
        self
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn flat_struct(&self) -> bool {
        self.flat_struct
    }

    pub fn help_flag(&self) -> &str {
        &self.help_flag
    }

    pub fn config_path_key(&self) -> &str {
        &self.config_path_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ParseOptions::default();
        assert_eq!(opts.env_prefix(), "SNKD_");
        assert_eq!(opts.delimiter(), ".");
        assert!(opts.flat_struct());
        assert_eq!(opts.help_flag(), "help");
        assert_eq!(opts.config_path_key(), "config");
    }

    #[test]
    fn overrides_apply() {
        let opts = ParseOptions::default()
            .with_env_prefix("APP_")
            .with_delimiter("__")
            .with_flat_struct(false)
            .with_help_flag("usage")
            .with_config_path_key("env.file");
        assert_eq!(opts.env_prefix(), "APP_");
        assert_eq!(opts.delimiter(), "__");
        assert!(!opts.flat_struct());
        assert_eq!(opts.help_flag(), "usage");
        assert_eq!(opts.config_path_key(), "env.file");
    }

    #[test]
    fn empty_delimiter_keeps_previous() {
        let opts = ParseOptions::default().with_delimiter("/").with_delimiter("");
        assert_eq!(opts.delimiter(), "/");
    }
}
