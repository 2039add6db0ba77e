//! Registration and the per-parse pipeline.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. `.env` config file (`--config` / `SNKD_CONFIG`)
//! 3. Environment variables (`SNKD_*`)
//! 4. Struct defaults
//!
//! The config file is located through the flags first and the environment
//! second, but its contents always sit between those two layers.

use std::ffi::OsString;

use clap::Command;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::decode;
use crate::env::Env;
use crate::error::ConfigError;
use crate::flagset::{self, FlagBinding, FlagScope};
use crate::merge::{self, Layer, Resolution};
use crate::options::ParseOptions;
use crate::schema::{self, Field, Kind, Schema};
use crate::sources::{self, FlatMap, Source};

/// Result of a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The destination now holds the resolved configuration.
    Loaded,
    /// The help flag was given; the destination was left untouched.
    HelpRequested,
}

/// A configuration type registered on a clap command.
///
/// Created once per process by [`Loader::register`]; every call to
/// [`Loader::load`] re-reads all sources.
#[derive(Debug)]
pub struct Loader<T> {
    command: Command,
    options: ParseOptions,
    schema: Schema<T>,
    fields: Vec<Field>,
    defaults: FlatMap,
    bindings: Vec<FlagBinding>,
}

impl<T: Serialize + DeserializeOwned> Loader<T> {
    /// Derive one flag per key of `config` and register them on `command`.
    ///
    /// The current field values of `config` become the defaults layer and
    /// the defaults shown in help. Keys whose default is `None` and that
    /// carry no kind hint get their kind from what `T` accepts there.
    pub fn register(
        command: Command,
        config: &T,
        scope: FlagScope,
        schema: Schema<T>,
        options: ParseOptions,
    ) -> Self {
        // does not error
        let defaults = schema::flatten(config, options.delimiter());
        let mut fields = schema.fields(config, options.delimiter());
        for field in fields.iter_mut().filter(|f| f.kind == Kind::Unset) {
            field.kind = decode::infer_kind::<T>(&defaults, &field.key, &options);
        }
        let (command, bindings) = flagset::synthesize(command, &fields, scope, &options);
        tracing::debug!(keys = fields.len(), flags = bindings.len(), "registered configuration flags");

        Self {
            command,
            options,
            schema,
            fields,
            defaults,
            bindings,
        }
    }

    /// Parse the real process arguments and environment into `config`.
    pub fn load(&self, config: &mut T) -> Result<Outcome, ConfigError> {
        self.load_from(config, std::env::args_os(), &Env::real())
    }

    /// Bind `config` as the destination and return the zero-argument parse
    /// over the real process arguments and environment.
    pub fn bind<'a>(&'a self, config: &'a mut T) -> impl FnMut() -> Result<Outcome, ConfigError> + 'a {
        move || self.load(config)
    }

    /// Parse `args` (starting with the binary name) and `env` into `config`.
    ///
    /// `config` is overwritten only once decoding succeeds. If the
    /// validator then rejects it, the decoded value stays in place and the
    /// validation error is returned.
    pub fn load_from<I, A>(&self, config: &mut T, args: I, env: &Env) -> Result<Outcome, ConfigError>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        let Some(resolution) = self.resolve(args, env)? else {
            return Ok(Outcome::HelpRequested);
        };

        *config = decode::decode(resolution.into_values(), &self.fields, &self.options)?;
        self.schema.validate(config)?;
        Ok(Outcome::Loaded)
    }

    /// Run the merge without decoding. Returns `None` when help was asked for.
    pub fn resolve<I, A>(&self, args: I, env: &Env) -> Result<Option<Resolution>, ConfigError>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        let env_values = sources::environment::collect(env, &self.options);

        // Positionals and subcommands were filtered out, so nothing the
        // host command requires may be enforced here.
        let args = flagset::retain_known_args(&self.command, args);
        let matches = self
            .command
            .clone()
            .subcommand_required(false)
            .arg_required_else_help(false)
            .mut_args(|arg| arg.required(false))
            .try_get_matches_from(args)
            .map_err(ConfigError::FlagParse)?;

        if sources::flags::help_requested(&matches, &self.options) {
            return Ok(None);
        }

        let flag_values = sources::flags::collect(&matches, &self.bindings, &self.options);

        // flags found -> use flags
        // flags not found -> env found -> use env
        let config_path = merge::resolve_config_path(
            &[&flag_values, &env_values],
            self.options.config_path_key(),
        );
        let file_values = match &config_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                sources::file::load(path, &self.options)?
            }
            None => FlatMap::new(),
        };

        let layers = [
            Layer::new(Source::Defaults, self.defaults.clone()),
            Layer::new(Source::Environment, env_values),
            Layer::new(Source::File, file_values),
            Layer::new(Source::Flags, flag_values),
        ];
        Ok(Some(merge::resolve(&layers)))
    }
}

impl<T> Loader<T> {
    /// The command with every synthesized flag registered.
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn into_command(self) -> Command {
        self.command
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn bindings(&self) -> &[FlagBinding] {
        &self.bindings
    }

    /// Help text of the registered command.
    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }
}
