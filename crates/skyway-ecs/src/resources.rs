//! World resources shared between the tick and render schedules.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use skyway_catalog::FeatureCatalog;
use skyway_cull::{
    ErrorReport, ErrorSink, MapMode, Platform, RenderBudget, RenderFrame, Viewport,
    ViewportProjector,
};
use skyway_flight::{AltitudeChanged, FlightModel, TrailEmitter};

/// Timing of the frame being run.
#[derive(Resource, Debug, Clone, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub delta: f64,
    /// Seconds since the session started.
    pub elapsed: f64,
    /// Index of the current frame, starting at 1 for the first run.
    pub frame: u64,
}

/// Control commands collected since the last tick. Consumed by
/// [`apply_input_system`](crate::apply_input_system).
#[derive(Resource, Debug, Clone, Default)]
pub struct FlightInput {
    pub turn: Option<f64>,
    pub release: bool,
    pub altitude_high: Option<bool>,
    pub fuel_boost: Option<f64>,
}

impl FlightInput {
    pub fn steer(&mut self, turn: f64) {
        self.turn = Some(turn);
        self.release = false;
    }

    pub fn release(&mut self) {
        self.turn = None;
        self.release = true;
    }

    pub fn set_altitude(&mut self, high: bool) {
        self.altitude_high = Some(high);
    }

    pub fn set_fuel_boost(&mut self, multiplier: f64) {
        self.fuel_boost = Some(multiplier);
    }
}

#[derive(Resource, Debug)]
pub struct Flight(pub FlightModel);

#[derive(Resource, Debug)]
pub struct Trails(pub TrailEmitter);

/// Altitude transitions raised during the current frame. Cleared at the
/// start of the next tick.
#[derive(Resource, Debug, Default)]
pub struct AltitudeNotices(pub Vec<AltitudeChanged>);

#[derive(Resource, Clone)]
pub struct Catalog(pub Arc<FeatureCatalog>);

#[derive(Resource)]
pub struct Projector(pub Box<dyn ViewportProjector + Send + Sync>);

#[derive(Resource, Debug, Clone)]
pub struct CullSettings {
    pub platform: Platform,
    pub map_mode: MapMode,
    pub viewport: Viewport,
    pub budget: RenderBudget,
    /// Log a culling summary every this many frames; 0 disables it.
    pub stats_interval_frames: u32,
}

impl CullSettings {
    pub fn for_platform(platform: Platform, viewport: Viewport) -> Self {
        Self {
            platform,
            map_mode: MapMode::Standard,
            viewport,
            budget: RenderBudget::for_platform(platform),
            stats_interval_frames: 0,
        }
    }
}

#[derive(Resource)]
pub struct Errors(pub ErrorSink);

/// Render-path failures seen so far.
#[derive(Resource, Debug, Default)]
pub struct ErrorTally {
    pub total: u64,
    pub last: Option<ErrorReport>,
}

/// Output of the most recent render pass.
#[derive(Resource, Debug, Default)]
pub struct LatestFrame(pub RenderFrame);
