//! Configuration for the skyway flight core.
//!
//! Settings persist to disk as RON, tolerate missing or unknown fields, and
//! can be overridden from the command line via clap.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, PlatformArg};
pub use config::{Config, DebugConfig, FlightConfig, RenderConfig, default_config_dir};
pub use error::ConfigError;
