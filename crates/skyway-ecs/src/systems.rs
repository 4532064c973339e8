//! Systems for the tick and render schedules.

use bevy_ecs::prelude::*;
use skyway_cull::{CullInput, ViewportProjector, render_frame};

use crate::resources::{
    AltitudeNotices, Catalog, CullSettings, ErrorTally, Errors, Flight, FlightInput, FrameTime,
    LatestFrame, Projector, Trails,
};

/// Hand pending commands to the flight model. [`AltitudeNotices`] is
/// replaced with this frame's transitions.
pub fn apply_input_system(
    mut input: ResMut<'_, FlightInput>,
    mut flight: ResMut<'_, Flight>,
    mut notices: ResMut<'_, AltitudeNotices>,
) {
    let input = &mut *input;
    if let Some(turn) = input.turn.take() {
        flight.0.set_turn_input(turn);
    } else if std::mem::take(&mut input.release) {
        flight.0.release_turn();
    }
    if let Some(high) = input.altitude_high.take() {
        flight.0.set_altitude(high);
    }
    if let Some(multiplier) = input.fuel_boost.take() {
        flight.0.set_fuel_boost(multiplier);
    }
    notices.0.clear();
    notices.0.extend(flight.0.drain_events());
}

pub fn flight_tick_system(time: Res<'_, FrameTime>, mut flight: ResMut<'_, Flight>) {
    flight.0.tick(time.delta);
}

pub fn trail_tick_system(
    time: Res<'_, FrameTime>,
    flight: Res<'_, Flight>,
    mut trails: ResMut<'_, Trails>,
) {
    trails.0.tick(time.delta, flight.0.state());
}

/// Keep the camera over the craft. Runs in the tick phase so the render
/// phase sees a fixed camera.
pub fn camera_follow_system(flight: Res<'_, Flight>, mut projector: ResMut<'_, Projector>) {
    projector.0.set_camera(flight.0.state().position);
}

/// Cull every category against the current craft state.
pub fn cull_render_system(
    time: Res<'_, FrameTime>,
    flight: Res<'_, Flight>,
    catalog: Res<'_, Catalog>,
    projector: Res<'_, Projector>,
    settings: Res<'_, CullSettings>,
    errors: Res<'_, Errors>,
    mut latest: ResMut<'_, LatestFrame>,
) {
    let input = CullInput {
        craft: flight.0.state(),
        viewport: settings.viewport,
        map_mode: settings.map_mode,
        budget: &settings.budget,
        frame: time.frame,
    };
    let projector: &dyn ViewportProjector = &*projector.0;
    latest.0 = render_frame(&catalog.0, projector, &input, &errors.0);

    let interval = u64::from(settings.stats_interval_frames);
    if interval > 0 && time.frame % interval == 0 {
        let stats = latest.0.stats;
        tracing::debug!(
            frame = time.frame,
            considered = stats.considered,
            kept = stats.kept,
            occluded = stats.occluded,
            off_screen = stats.off_screen,
            truncated = stats.truncated,
            "culling summary"
        );
    }
}

pub fn drain_errors_system(errors: Res<'_, Errors>, mut tally: ResMut<'_, ErrorTally>) {
    let reports = errors.0.drain();
    tally.total += reports.len() as u64;
    if let Some(last) = reports.into_iter().last() {
        tally.last = Some(last);
    }
}
