//! Reverse path: render configuration values as a `.env` file.
//!
//! Used to produce template files. Keys take their environment spelling
//! (`client.id` → `SNKD_CLIENT_ID`) so the output loads back through the
//! file provider unchanged.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ConfigError;
use crate::keys;
use crate::options::ParseOptions;
use crate::schema::{display_value, try_flatten};

/// Accumulates one or more configuration values into `.env` lines.
///
/// Later values overwrite earlier ones for the same key.
#[derive(Debug)]
pub struct Marshaler<'a> {
    options: &'a ParseOptions,
    entries: IndexMap<String, String>,
}

impl<'a> Marshaler<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            entries: IndexMap::new(),
        }
    }

    /// Flatten `config` and add its keys.
    pub fn include<S: Serialize + ?Sized>(mut self, config: &S) -> Result<Self, ConfigError> {
        let flat = try_flatten(config, self.options.delimiter()).map_err(ConfigError::Encode)?;
        for (key, value) in flat {
            self.entries
                .insert(keys::to_env_name(&key, self.options), display_value(&value));
        }
        Ok(self)
    }

    /// Render `KEY=value` lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            out.push_str(name);
            out.push('=');
            out.push_str(&quote(value));
            out.push('\n');
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.render().into_bytes()
    }
}

/// Marshal a single configuration value.
pub fn marshal<S: Serialize + ?Sized>(
    config: &S,
    options: &ParseOptions,
) -> Result<Vec<u8>, ConfigError> {
    Ok(Marshaler::new(options).include(config)?.to_bytes())
}

fn is_bare(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.-/:,@+".contains(c)
}

fn quote(value: &str) -> String {
    if value.chars().all(is_bare) {
        return value.to_string();
    }
    if !value.contains('\'') && !value.contains('\n') {
        return format!("'{value}'");
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Client {
        #[serde(rename = "client.id")]
        client_id: String,
        #[serde(rename = "client.secret")]
        client_secret: String,
        config: Option<String>,
    }

    #[derive(Serialize)]
    struct Server {
        server: Inner,
    }

    #[derive(Serialize)]
    struct Inner {
        port: u16,
        debug: bool,
    }

    #[test]
    fn renders_env_lines() {
        let client = Client {
            client_id: "abc".into(),
            client_secret: "xyz".into(),
            config: None,
        };
        let out = String::from_utf8(marshal(&client, &ParseOptions::default()).unwrap()).unwrap();
        assert_eq!(
            out,
            "SNKD_CLIENT_ID=abc\nSNKD_CLIENT_SECRET=xyz\nSNKD_CONFIG=\n"
        );
    }

    #[test]
    fn merges_multiple_values() {
        let opts = ParseOptions::default().with_env_prefix("APP_");
        let client = Client {
            client_id: "abc".into(),
            client_secret: String::new(),
            config: Some("a.env".into()),
        };
        let server = Server {
            server: Inner {
                port: 8080,
                debug: true,
            },
        };
        let out = Marshaler::new(&opts)
            .include(&client)
            .unwrap()
            .include(&server)
            .unwrap()
            .render();
        assert!(out.contains("APP_CLIENT_ID=abc\n"));
        assert!(out.contains("APP_CLIENT_SECRET=\n"));
        assert!(out.contains("APP_CONFIG=a.env\n"));
        assert!(out.contains("APP_SERVER_PORT=8080\n"));
        assert!(out.contains("APP_SERVER_DEBUG=true\n"));
    }

    #[test]
    fn later_values_overwrite() {
        let opts = ParseOptions::default();
        let a = Inner {
            port: 1,
            debug: false,
        };
        let b = Inner {
            port: 2,
            debug: false,
        };
        let out = Marshaler::new(&opts)
            .include(&a)
            .unwrap()
            .include(&b)
            .unwrap()
            .render();
        assert_eq!(out, "SNKD_PORT=2\nSNKD_DEBUG=false\n");
    }

    #[test]
    fn quotes_unsafe_values() {
        assert_eq!(quote("plain-value_1.2/x:y"), "plain-value_1.2/x:y");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote("it's $HOME"), "\"it's \\$HOME\"");
        assert_eq!(quote("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn unserializable_value_is_encode_error() {
        use std::collections::HashMap;
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], "x");
        let result = marshal(&bad, &ParseOptions::default());
        assert!(matches!(result, Err(ConfigError::Encode(_))));
    }
}
