//! Flag synthesis: one clap argument per declared key.
//!
//! The CLI surface is derived from the schema instead of being written by
//! hand. clap's built-in help flag is replaced by a plain boolean so that
//! asking for help is just another parsed value, and unknown arguments are
//! stripped before parsing because the command may be shared with flags
//! that belong to somebody else.

use std::ffi::OsString;

use clap::builder::BoolishValueParser;
use clap::{Arg, ArgAction, Command};

use crate::constants::{CONFIG_PATH_SHORT, DEFAULT_HELP_FLAG, HELP_SHORT};
use crate::keys;
use crate::options::ParseOptions;
use crate::schema::{display_value, Field, Kind};

/// Whether synthesized flags stay on the command or are inherited by its
/// subcommands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagScope {
    #[default]
    Local,
    Global,
}

/// Link between a registered clap argument and its configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagBinding {
    /// clap argument id, equal to the long flag name.
    pub id: String,
    pub key: String,
    pub boolean: bool,
}

/// Register the help flag, the config-path flag and one flag per field.
///
/// Returns the extended command and the bindings of every flag that feeds
/// the flags layer (the help flag is not among them).
pub fn synthesize(
    command: Command,
    fields: &[Field],
    scope: FlagScope,
    opts: &ParseOptions,
) -> (Command, Vec<FlagBinding>) {
    let global = scope == FlagScope::Global;
    let config_key = opts.config_path_key();
    let config_flag = keys::to_flag_name(config_key, opts);

    let mut command = if global {
        disable_help_flags(command)
    } else {
        command.disable_help_flag(true)
    };
    if has_arg(&command, opts.help_flag()) {
        tracing::warn!(flag = opts.help_flag(), "help flag already defined on command");
    } else {
        command = command.arg(help_arg(opts.help_flag(), global));
    }

    let mut bindings = Vec::with_capacity(fields.len() + 1);
    if has_arg(&command, &config_flag) {
        tracing::warn!(flag = %config_flag, "config flag already defined on command");
    } else {
        command = command.arg(config_arg(&config_flag, opts, global));
        bindings.push(FlagBinding {
            id: config_flag.clone(),
            key: config_key.to_string(),
            boolean: false,
        });
    }

    for field in fields {
        if field.key == config_key {
            // registered manually above
            continue;
        }

        // key is now a flag name
        let name = keys::to_flag_name(&field.key, opts);
        if name == opts.help_flag() || name == config_flag || has_arg(&command, &name) {
            tracing::warn!(key = %field.key, flag = %name, "flag name already taken, not registering");
            continue;
        }

        let boolean = field.kind == Kind::Bool;
        let arg = if boolean {
            bool_arg(&name, field)
        } else {
            string_arg(&name, field)
        };
        command = command.arg(arg.global(global));
        bindings.push(FlagBinding {
            id: name,
            key: field.key.clone(),
            boolean,
        });
    }

    (command, bindings)
}

/// A global help flag reaches every subcommand, so none of them may keep
/// clap's own.
fn disable_help_flags(command: Command) -> Command {
    let names: Vec<String> = command
        .get_subcommands()
        .map(|sc| sc.get_name().to_string())
        .collect();
    names
        .into_iter()
        .fold(command.disable_help_flag(true), |command, name| {
            command.mut_subcommand(name, disable_help_flags)
        })
}

fn has_arg(command: &Command, id: &str) -> bool {
    command.get_arguments().any(|a| a.get_id() == id)
}

fn help_arg(name: &str, global: bool) -> Arg {
    let arg = Arg::new(name.to_string())
        .long(name.to_string())
        .action(ArgAction::SetTrue)
        .help("Print help")
        .global(global);
    if name == DEFAULT_HELP_FLAG {
        arg.short(HELP_SHORT)
    } else {
        arg
    }
}

fn config_arg(flag: &str, opts: &ParseOptions, global: bool) -> Arg {
    let env_name = keys::to_env_name(opts.config_path_key(), opts);
    Arg::new(flag.to_string())
        .long(flag.to_string())
        .short(CONFIG_PATH_SHORT)
        .value_name("PATH")
        .allow_hyphen_values(true)
        .help(format!(".env config file path (or env variable {env_name})"))
        .global(global)
}

fn bool_arg(name: &str, field: &Field) -> Arg {
    let arg = Arg::new(name.to_string())
        .long(name.to_string())
        .action(ArgAction::Set)
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value("true")
        .value_parser(BoolishValueParser::new())
        .help(field.description.clone());
    match field.default.as_bool() {
        Some(default) => arg.default_value(if default { "true" } else { "false" }),
        // optional bool, no default to show
        None => arg,
    }
}

fn string_arg(name: &str, field: &Field) -> Arg {
    let arg = Arg::new(name.to_string())
        .long(name.to_string())
        .action(ArgAction::Set)
        .allow_hyphen_values(true)
        .help(field.description.clone());
    let default = display_value(&field.default);
    if default.is_empty() {
        arg
    } else {
        arg.default_value(default)
    }
}

/// Keep only the arguments `command` knows about.
///
/// The first argument (the binary name) is always kept. Positional
/// arguments are dropped and `--` ends processing. An unknown flag without
/// an inline value also drops the next argument unless it looks like a
/// flag, since it is most likely that flag's value. Short clusters keep
/// their known letters; the remainder after a letter that takes a value is
/// that letter's value.
pub fn retain_known_args<I, A>(command: &Command, args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = args.into_iter().peekable();

    if let Some(bin) = iter.next() {
        kept.push(bin);
    }

    while let Some(raw) = iter.next() {
        let Some(token) = raw.to_str().map(str::to_string) else {
            tracing::debug!(arg = ?raw, "ignoring non-unicode argument");
            continue;
        };
        if token == "--" {
            break;
        }

        let (retained, takes_next, inline_value) = if let Some(body) = token.strip_prefix("--") {
            let (name, inline_value) = match body.split_once('=') {
                Some((name, _)) => (name, true),
                None => (body, false),
            };
            match command.get_arguments().find(|a| a.get_long() == Some(name)) {
                Some(arg) => (Some(raw), !inline_value && takes_separate_value(arg), inline_value),
                None => (None, false, inline_value),
            }
        } else if let Some(body) = token.strip_prefix('-').filter(|b| !b.is_empty()) {
            match retain_short_cluster(command, body) {
                Some((cluster, takes_next)) => (Some(OsString::from(format!("-{cluster}"))), takes_next, false),
                None => (None, false, body.chars().nth(1).is_some()),
            }
        } else {
            tracing::debug!(arg = %token, "ignoring positional argument");
            continue;
        };

        match retained {
            Some(arg) => {
                kept.push(arg);
                if takes_next {
                    if let Some(value) = iter.next() {
                        kept.push(value);
                    }
                }
            }
            None => {
                tracing::debug!(arg = %token, "ignoring unknown flag");
                let next_is_value = iter
                    .peek()
                    .and_then(|next| next.to_str())
                    .is_some_and(|next| !next.starts_with('-'));
                if !inline_value && next_is_value {
                    iter.next();
                }
            }
        }
    }

    kept
}

fn takes_separate_value(arg: &Arg) -> bool {
    arg.get_action().takes_values() && !arg.is_require_equals_set()
}

/// Known letters of the short cluster `body` (without the leading `-`),
/// and whether the last of them expects its value in the next argument.
fn retain_short_cluster(command: &Command, body: &str) -> Option<(String, bool)> {
    let mut cluster = String::new();
    for (at, letter) in body.char_indices() {
        let Some(arg) = command.get_arguments().find(|a| a.get_short() == Some(letter)) else {
            tracing::debug!(flag = %letter, "ignoring unknown short flag");
            continue;
        };
        cluster.push(letter);
        if arg.get_action().takes_values() {
            let value = &body[at + letter.len_utf8()..];
            cluster.push_str(value);
            return Some((cluster, value.is_empty() && !arg.is_require_equals_set()));
        }
    }
    (!cluster.is_empty()).then_some((cluster, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn field(key: &str, default: Value, description: &str) -> Field {
        Field {
            key: key.to_string(),
            kind: Kind::of(&default),
            nullable: default.is_null(),
            default,
            description: description.to_string(),
        }
    }

    fn sample_fields() -> Vec<Field> {
        vec![
            field("client.id", json!(""), "client id"),
            field("client.secret", json!("s"), "client secret"),
            field("debug", json!(false), "verbose output"),
            field("config", Value::Null, "Config file path"),
        ]
    }

    fn long_names(command: &Command) -> Vec<String> {
        let mut names: Vec<String> = command
            .get_arguments()
            .filter_map(|a| a.get_long().map(str::to_string))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn registers_one_flag_per_key_plus_help_and_config() {
        let (command, bindings) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        assert_eq!(
            long_names(&command),
            vec!["client-id", "client-secret", "config", "debug", "help"]
        );
        let keys: Vec<_> = bindings.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["config", "client.id", "client.secret", "debug"]);
    }

    #[test]
    fn boolean_defaults_register_boolean_flags() {
        let (_, bindings) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        let debug = bindings.iter().find(|b| b.key == "debug").unwrap();
        assert!(debug.boolean);
        let id = bindings.iter().find(|b| b.key == "client.id").unwrap();
        assert!(!id.boolean);
    }

    #[test]
    fn descriptions_become_help_text() {
        let (command, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "client-id")
            .unwrap();
        assert_eq!(arg.get_help().map(|h| h.to_string()).as_deref(), Some("client id"));

        let config = command.get_arguments().find(|a| a.get_id() == "config").unwrap();
        assert_eq!(config.get_short(), Some('c'));
        assert!(config.get_help().unwrap().to_string().contains("SNKD_CONFIG"));
    }

    #[test]
    fn global_scope_marks_args_global() {
        let (command, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Global,
            &ParseOptions::default(),
        );
        assert!(command.get_arguments().all(|a| a.is_global_set()));

        let (local, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        assert!(local.get_arguments().all(|a| !a.is_global_set()));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let command = Command::new("app").subcommand(
            Command::new("serve").subcommand(Command::new("http")),
        );
        let (command, _) = synthesize(
            command,
            &sample_fields(),
            FlagScope::Global,
            &ParseOptions::default(),
        );
        let m = command
            .try_get_matches_from(["app", "serve", "http", "--client-id", "abc", "-h"])
            .unwrap();
        let (_, serve) = m.subcommand().unwrap();
        let (_, http) = serve.subcommand().unwrap();
        assert_eq!(http.get_one::<String>("client-id").map(String::as_str), Some("abc"));
        assert_eq!(http.get_one::<bool>("help"), Some(&true));
    }

    #[test]
    fn key_colliding_with_help_is_skipped() {
        let fields = vec![field("help", json!("x"), "")];
        let (command, bindings) = synthesize(
            Command::new("app"),
            &fields,
            FlagScope::Local,
            &ParseOptions::default(),
        );
        assert_eq!(long_names(&command), vec!["config", "help"]);
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn existing_command_args_are_not_redefined() {
        let command = Command::new("app").arg(Arg::new("debug").long("debug"));
        let (command, bindings) = synthesize(
            command,
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        assert_eq!(
            command.get_arguments().filter(|a| a.get_id() == "debug").count(),
            1
        );
        assert!(!bindings.iter().any(|b| b.key == "debug"));
    }

    #[test]
    fn parsed_flags_accept_bool_forms() {
        let (command, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        let m = command
            .clone()
            .try_get_matches_from(["app", "--debug"])
            .unwrap();
        assert_eq!(m.get_one::<bool>("debug"), Some(&true));

        let m = command
            .clone()
            .try_get_matches_from(["app", "--debug=false"])
            .unwrap();
        assert_eq!(m.get_one::<bool>("debug"), Some(&false));

        assert!(command.try_get_matches_from(["app", "--debug=maybe"]).is_err());
    }

    #[test]
    fn retain_drops_unknown_flags_and_positionals() {
        let (command, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        let kept = retain_known_args(
            &command,
            [
                "app",
                "serve",
                "--verbose",
                "--client-id",
                "abc",
                "--other=1",
                "--unknown",
                "value",
                "--debug",
                "-c",
                "/tmp/x.env",
                "-x",
                "--",
                "--client-secret=late",
            ],
        );
        let kept: Vec<_> = kept.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            kept,
            vec!["app", "--client-id", "abc", "--debug", "-c", "/tmp/x.env"]
        );
    }

    #[test]
    fn retain_keeps_inline_values() {
        let (command, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        let kept = retain_known_args(
            &command,
            ["app", "--client-id=abc", "-c/tmp/x.env", "--debug=false", "-h"],
        );
        assert_eq!(kept.len(), 5);
        let m = command.try_get_matches_from(kept).unwrap();
        assert_eq!(m.get_one::<String>("client-id").map(String::as_str), Some("abc"));
        assert_eq!(m.get_one::<String>("config").map(String::as_str), Some("/tmp/x.env"));
        assert_eq!(m.get_one::<bool>("help"), Some(&true));
    }

    #[test]
    fn retain_walks_short_clusters() {
        let (command, _) = synthesize(
            Command::new("app"),
            &sample_fields(),
            FlagScope::Local,
            &ParseOptions::default(),
        );
        let kept = retain_known_args(&command, ["app", "-hc", "x.env", "-xh", "-qc/tmp/y.env"]);
        let kept: Vec<_> = kept.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(kept, vec!["app", "-hc", "x.env", "-h", "-c/tmp/y.env"]);

        let m = command
            .try_get_matches_from(["app", "-hc", "x.env"])
            .unwrap();
        assert_eq!(m.get_one::<bool>("help"), Some(&true));
        assert_eq!(m.get_one::<String>("config").map(String::as_str), Some("x.env"));
    }

    #[test]
    fn retain_on_empty_args() {
        let command = Command::new("app");
        assert!(retain_known_args(&command, Vec::<OsString>::new()).is_empty());
    }
}
