//! The demo configuration type and the root command it is registered on.

use clap::Command;
use serde::{Deserialize, Serialize};

use strata::constants::{APP_NAME, VERSION};
use strata::{FlagScope, Loader, ParseOptions, Schema};

/// Name of the subcommand printing the `.env` template.
pub const TEMPLATE_COMMAND: &str = "template";

/// Configuration resolved by the `strata` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    #[serde(rename = "client.id")]
    pub client_id: String,
    #[serde(rename = "client.secret")]
    pub client_secret: String,

    // optional
    #[serde(rename = "config")]
    pub config_path: Option<String>,
}

pub fn schema() -> Schema<RootConfig> {
    Schema::builder()
        .describe("client.id", "client id")
        .describe("client.secret", "client secret")
        .describe("config", "Config file path (.env format)")
        .build()
}

pub fn command() -> Command {
    Command::new(APP_NAME)
        .version(VERSION)
        .about("Resolve configuration from defaults, a .env file, SNKD_* variables and flags")
        .disable_help_subcommand(true)
        .subcommand(Command::new(TEMPLATE_COMMAND).about("Print a .env template of the configuration"))
}

/// Register [`RootConfig`] on [`command`]; flags are inherited by subcommands.
pub fn register() -> Loader<RootConfig> {
    Loader::register(
        command(),
        &RootConfig::default(),
        FlagScope::Global,
        schema(),
        ParseOptions::default(),
    )
}
