//! Headless skyway run.
//!
//! Loads config and a feature catalog, flies a scripted route over it with
//! the orthographic globe camera, and logs what the culling pipeline keeps.
//!
//! Run with: `cargo run -p skyway-demo -- --platform constrained`

mod script;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use skyway_catalog::{FeatureCatalog, KindTag};
use skyway_config::{CliArgs, Config, default_config_dir};
use skyway_cull::{Category, CullStats, OrthographicGlobe};
use skyway_ecs::{
    AltitudeNotices, CullSettings, ErrorTally, Flight, FlightInput, FrameSchedules, LatestFrame,
    SessionSetup, Trails, create_world, run_frame,
};
use skyway_flight::{FlightModel, TrailEmitter};
use tracing::{info, warn};

use crate::script::FlightScript;

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.ron");

fn resolve_config_dir(args: &CliArgs) -> PathBuf {
    if let Some(dir) = &args.config {
        return dir.clone();
    }
    default_config_dir().unwrap_or_else(|e| {
        eprintln!("{e}; using a temporary config directory");
        std::env::temp_dir().join("skyway")
    })
}

fn load_catalog(config: &Config) -> FeatureCatalog {
    if let Some(path) = &config.render.catalog_path {
        match FeatureCatalog::load(path) {
            Ok(catalog) => return catalog,
            Err(e) => warn!("Catalog {} unusable ({e}), using the sample", path.display()),
        }
    }
    FeatureCatalog::from_ron_str(SAMPLE_CATALOG).unwrap_or_else(|e| {
        warn!("Sample catalog failed to parse: {e}");
        FeatureCatalog::default()
    })
}

fn session(config: &Config, catalog: FeatureCatalog) -> SessionSetup {
    let mut flight = FlightModel::new(
        config.flight.params(),
        config.flight.spawn,
        config.flight.spawn_heading_rad(),
    );
    if config.flight.start_high {
        flight.set_altitude(true);
    }

    let viewport = config.render.viewport();
    let mut settings = CullSettings::for_platform(config.render.platform, viewport);
    settings.map_mode = config.render.map_mode;
    settings.budget = config.render.budget();
    settings.stats_interval_frames = config.debug.stats_interval_frames;

    SessionSetup {
        flight,
        trails: TrailEmitter::new(config.trail.clone()),
        catalog: Arc::new(catalog),
        projector: Box::new(OrthographicGlobe::new(
            config.flight.spawn,
            config.render.globe_radius_px,
            &viewport,
        )),
        settings,
        error_queue_capacity: config.render.error_queue_capacity,
    }
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = resolve_config_dir(&args);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    skyway_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    info!("Skyway headless run");
    info!(
        "Viewport: {}x{} | platform={:?} | map mode={:?}",
        config.render.width, config.render.height, config.render.platform, config.render.map_mode
    );

    let catalog = load_catalog(&config);
    info!(
        "Catalog: {} features ({} borders, {} cities, {} rivers, {} airports)",
        catalog.len(),
        catalog.of_kind(KindTag::Border).len(),
        catalog.of_kind(KindTag::City).len(),
        catalog.of_kind(KindTag::River).len(),
        catalog.of_kind(KindTag::Airport).len(),
    );

    let mut world = create_world(session(&config, catalog));
    let mut schedules = FrameSchedules::new();
    let mut script = FlightScript::default();
    let mut totals = CullStats::default();
    let dt = args.dt;

    for frame in 0..args.frames {
        let elapsed = f64::from(frame) * dt;
        script.apply_due(elapsed, &mut world.resource_mut::<FlightInput>());
        run_frame(&mut world, &mut schedules, dt);

        for notice in world.resource_mut::<AltitudeNotices>().0.drain(..) {
            info!("Altitude {:?} -> {:?} at t={elapsed:.2}s", notice.from, notice.to);
        }
        totals += world.resource::<LatestFrame>().0.stats;
    }

    let state = world.resource::<Flight>().0.state().clone();
    info!(
        "Finished {} frames at {} heading {:.1} deg, blend {:.2}, {} trail particles",
        args.frames,
        state.position,
        state.heading_rad.to_degrees(),
        state.altitude_blend,
        world.resource::<Trails>().0.len(),
    );

    let last = &world.resource::<LatestFrame>().0;
    for category in Category::ALL {
        if let Some(out) = last.category(category) {
            info!(
                "  {:<10} active={:<5} opacity={:.2} drawn={}",
                category.name(),
                out.active,
                out.opacity,
                out.candidates.len()
            );
        }
    }
    info!(
        "Totals: considered={} coarse_rejected={} occluded={} off_screen={} truncated={} kept={}",
        totals.considered,
        totals.coarse_rejected,
        totals.occluded,
        totals.off_screen,
        totals.truncated,
        totals.kept
    );

    let tally = world.resource::<ErrorTally>();
    if tally.total > 0 {
        warn!("{} render failures, last: {:?}", tally.total, tally.last);
    }
    if !script.is_finished() {
        info!("Run ended before the flight script completed");
    }
}
