//! Command-line overrides.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use skyway_cull::{MapMode, Platform};

use crate::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Native,
    Constrained,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Native => Platform::Native,
            PlatformArg::Constrained => Platform::Constrained,
        }
    }
}

/// Skyway command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "skyway", about = "Headless skyway flight and culling run")]
pub struct CliArgs {
    /// Viewport width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Render budget class.
    #[arg(long, value_enum)]
    pub platform: Option<PlatformArg>,

    /// Use the navigation map mode.
    #[arg(long)]
    pub navigation: Option<bool>,

    /// Feature catalog (RON).
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Fixed frame time in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f64,
}

impl Config {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.render.width = w;
        }
        if let Some(h) = args.height {
            self.render.height = h;
        }
        if let Some(platform) = args.platform {
            self.render.platform = platform.into();
        }
        if let Some(nav) = args.navigation {
            self.render.map_mode = if nav {
                MapMode::Navigation
            } else {
                MapMode::Standard
            };
        }
        if let Some(ref path) = args.catalog {
            self.render.catalog_path = Some(path.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
