//! Prefixed process environment variables.

use serde_json::Value;

use super::FlatMap;
use crate::env::Env;
use crate::keys;
use crate::options::ParseOptions;

/// Collect every variable carrying the configured prefix.
pub fn collect(env: &Env, opts: &ParseOptions) -> FlatMap {
    env.vars_with_prefix(opts.env_prefix())
        .into_iter()
        .filter_map(|(name, value)| {
            let key = keys::from_env_name(&name, opts)?;
            Some((key, Value::String(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_prefixed_vars() {
        let env = Env::fixed([
            ("SNKD_CLIENT_ID", "abc"),
            ("SNKD_CONFIG", "/tmp/app.env"),
            ("PATH", "/usr/bin"),
        ]);
        let map = collect(&env, &ParseOptions::default());
        assert_eq!(map.len(), 2);
        assert_eq!(map["client.id"], Value::String("abc".into()));
        assert_eq!(map["config"], Value::String("/tmp/app.env".into()));
    }

    #[test]
    fn bare_prefix_is_ignored() {
        let env = Env::fixed([("SNKD_", "x")]);
        assert!(collect(&env, &ParseOptions::default()).is_empty());
    }

    #[test]
    fn respects_custom_prefix() {
        let env = Env::fixed([("SNKD_CLIENT_ID", "abc"), ("APP_CLIENT_ID", "def")]);
        let opts = ParseOptions::default().with_env_prefix("APP_");
        let map = collect(&env, &opts);
        assert_eq!(map.len(), 1);
        assert_eq!(map["client.id"], Value::String("def".into()));
    }
}
