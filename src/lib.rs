//! Layered configuration resolver (library crate).
//!
//! Merges struct defaults, a `.env` file, prefixed environment variables
//! and CLI flags into one typed configuration value. Flags are derived
//! from the configuration type itself.
//!
//! ```no_run
//! use clap::Command;
//! use serde::{Deserialize, Serialize};
//! use strata::{FlagScope, Loader, ParseOptions, Schema};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     #[serde(rename = "client.id")]
//!     client_id: String,
//! }
//!
//! let schema = Schema::builder().describe("client.id", "client id").build();
//! let loader = Loader::register(
//!     Command::new("app"),
//!     &AppConfig::default(),
//!     FlagScope::Local,
//!     schema,
//!     ParseOptions::default(),
//! );
//! let mut config = AppConfig::default();
//! loader.load(&mut config).unwrap();
//! ```

pub mod constants;
pub mod decode;
pub mod env;
pub mod error;
pub mod flagset;
pub mod keys;
pub mod loader;
pub mod marshal;
pub mod merge;
pub mod options;
pub mod schema;
pub mod sources;

pub use env::Env;
pub use error::ConfigError;
pub use flagset::FlagScope;
pub use loader::{Loader, Outcome};
pub use marshal::{marshal, Marshaler};
pub use merge::Resolution;
pub use options::ParseOptions;
pub use schema::{Field, Kind, Schema, SchemaBuilder, Validate};
pub use sources::{FlatMap, Source};
