//! Configuration sections with defaults and RON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyway_cull::{Category, MapMode, Platform, RenderBudget, Viewport};
use skyway_flight::{FlightParams, TrailParams};
use skyway_geodesy::GeoPoint;

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// `<platform config dir>/skyway`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|d| d.join("skyway"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub flight: FlightConfig,
    pub trail: TrailParams,
    pub render: RenderConfig,
    pub debug: DebugConfig,
}

/// Spawn point and flight tuning, in degrees where angles are involved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlightConfig {
    pub spawn: GeoPoint,
    /// Initial heading, degrees counter-clockwise from north.
    pub spawn_heading_deg: f64,
    /// Spawn in high altitude mode.
    pub start_high: bool,
    pub max_bank_deg: f64,
    pub decay_rate: f64,
    pub bank_smoothing_rate: f64,
    pub altitude_smoothing_rate: f64,
    pub base_speed_deg_s: f64,
    pub low_speed_multiplier: f64,
    /// Heading change rate at full bank.
    pub turn_rate_deg_s: f64,
}

impl FlightConfig {
    /// Flight model parameters in the model's units.
    pub fn params(&self) -> FlightParams {
        FlightParams {
            max_bank_rad: self.max_bank_deg.to_radians(),
            decay_rate: self.decay_rate,
            bank_smoothing_rate: self.bank_smoothing_rate,
            altitude_smoothing_rate: self.altitude_smoothing_rate,
            base_speed_deg_s: self.base_speed_deg_s,
            low_speed_multiplier: self.low_speed_multiplier,
            turn_rate_rad_s: self.turn_rate_deg_s.to_radians(),
            ..FlightParams::default()
        }
    }

    pub fn spawn_heading_rad(&self) -> f64 {
        self.spawn_heading_deg.to_radians()
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        let p = FlightParams::default();
        Self {
            spawn: GeoPoint::new(2.35, 48.86),
            spawn_heading_deg: 0.0,
            start_high: false,
            max_bank_deg: p.max_bank_rad.to_degrees(),
            decay_rate: p.decay_rate,
            bank_smoothing_rate: p.bank_smoothing_rate,
            altitude_smoothing_rate: p.altitude_smoothing_rate,
            base_speed_deg_s: p.base_speed_deg_s,
            low_speed_multiplier: p.low_speed_multiplier,
            turn_rate_deg_s: p.turn_rate_rad_s.to_degrees(),
        }
    }
}

/// Viewport, platform and culling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub platform: Platform,
    pub width: u32,
    pub height: u32,
    /// Pixels beyond the viewport edge that still count as on-screen.
    pub margin_px: f32,
    /// On-screen globe radius for the orthographic camera.
    pub globe_radius_px: f32,
    pub map_mode: MapMode,
    /// Per-category replacements for the platform's default budgets.
    pub budget_overrides: BTreeMap<Category, usize>,
    /// Render-path error reports queued before new ones are dropped.
    pub error_queue_capacity: usize,
    /// RON feature catalog to load at startup.
    pub catalog_path: Option<PathBuf>,
}

impl RenderConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32, self.margin_px)
    }

    pub fn budget(&self) -> RenderBudget {
        RenderBudget::for_platform(self.platform).with_overrides(&self.budget_overrides)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Native,
            width: 1280,
            height: 720,
            margin_px: 32.0,
            globe_radius_px: 12_000.0,
            map_mode: MapMode::Standard,
            budget_overrides: BTreeMap::new(),
            error_queue_capacity: 64,
            catalog_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "skyway_cull=debug").
    pub log_level: String,
    /// Log a culling summary every this many frames; 0 disables it.
    pub stats_interval_frames: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval_frames: 60,
        }
    }
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing defaults first if it
    /// does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if path.exists() {
            let config = Self::read(&path)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read the file; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh != self {
            log::info!("Config reloaded with changes");
            Ok(Some(fresh))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("spawn_interval_s: 0.05"));
        assert!(ron_str.contains("platform: Native"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.render.budget_overrides.insert(Category::Rivers, 12);
        config.render.catalog_path = Some(PathBuf::from("data/world.ron"));
        let ron_str = ron::to_string(&config).unwrap();
        let back: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(flight: (), render: (width: 640))").unwrap();
        assert_eq!(config.trail, TrailParams::default());
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 720);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_flight_params_conversion() {
        let params = FlightConfig::default().params();
        let reference = FlightParams::default();
        assert!((params.max_bank_rad - reference.max_bank_rad).abs() < 1e-12);
        assert!((params.turn_rate_rad_s - reference.turn_rate_rad_s).abs() < 1e-12);
        assert_eq!(params.decay_rate, reference.decay_rate);
        assert_eq!(params.turn_epsilon, reference.turn_epsilon);
    }

    #[test]
    fn test_budget_overrides_apply() {
        let mut render = RenderConfig {
            platform: Platform::Constrained,
            ..RenderConfig::default()
        };
        render.budget_overrides.insert(Category::Airports, 3);
        let budget = render.budget();
        assert_eq!(budget.limit(Category::Airports), 3);
        assert_eq!(
            budget.limit(Category::Cities),
            RenderBudget::for_platform(Platform::Constrained).limit(Category::Cities)
        );
    }

    #[test]
    fn test_viewport_from_render_config() {
        let v = RenderConfig::default().viewport();
        assert_eq!(v, Viewport::new(1280.0, 720.0, 32.0));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.render.width = 1920;
        config.render.map_mode = MapMode::Navigation;
        config.flight.spawn = GeoPoint::new(-122.4, 37.8);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.debug.log_level = "debug".into();
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.debug.log_level), Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
