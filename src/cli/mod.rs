//! Command dispatch for the `strata` binary.
//!
//! Resolves [`args::RootConfig`] and renders it as indented JSON, or
//! prints help or the `.env` template. Returns the text to print so the
//! dispatch can be tested without a process.

pub mod args;

use std::ffi::OsString;

use anyhow::{Context, Result};
use clap::ArgMatches;
use clap::error::ErrorKind;

use strata::{Env, Outcome};

use args::{RootConfig, TEMPLATE_COMMAND};

/// Run the binary against `args` (starting with the binary name) and `env`.
pub fn run<I, A>(args: I, env: &Env) -> Result<String>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let loader = args::register();

    let matches = match loader.command().clone().try_get_matches_from(&args) {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(err.render().to_string());
        }
        Err(err) => return Err(err).context("invalid arguments"),
    };

    if help_requested(&matches, loader.options().help_flag()) {
        return Ok(loader.render_help());
    }

    if let Some((TEMPLATE_COMMAND, _)) = matches.subcommand() {
        let bytes = strata::marshal(&RootConfig::default(), loader.options())
            .context("failed to render template")?;
        return String::from_utf8(bytes).context("template is not valid UTF-8");
    }

    let mut config = RootConfig::default();
    match loader
        .load_from(&mut config, &args, env)
        .context("failed to load configuration")?
    {
        Outcome::HelpRequested => Ok(loader.render_help()),
        Outcome::Loaded => {
            let mut json = serde_json::to_string_pretty(&config)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// The help flag may follow a subcommand, where clap stores it on the
/// subcommand's matches.
fn help_requested(matches: &ArgMatches, flag: &str) -> bool {
    let set = |m: &ArgMatches| m.try_get_one::<bool>(flag).ok().flatten().copied().unwrap_or(false);
    set(matches) || matches.subcommand().is_some_and(|(_, sub)| set(sub))
}
