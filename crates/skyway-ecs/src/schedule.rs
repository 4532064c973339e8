//! The two per-frame schedules and the frame runner.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;

use crate::resources::FrameTime;
use crate::systems::{
    apply_input_system, camera_follow_system, cull_render_system, drain_errors_system,
    flight_tick_system, trail_tick_system,
};

/// `tick` mutates simulation state; `render` only reads it.
pub struct FrameSchedules {
    pub tick: Schedule,
    pub render: Schedule,
}

impl FrameSchedules {
    pub fn new() -> Self {
        let mut tick = Schedule::default();
        tick.set_executor_kind(ExecutorKind::SingleThreaded);
        tick.add_systems(
            (
                apply_input_system,
                flight_tick_system,
                trail_tick_system,
                camera_follow_system,
            )
                .chain(),
        );

        let mut render = Schedule::default();
        render.set_executor_kind(ExecutorKind::SingleThreaded);
        render.add_systems((cull_render_system, drain_errors_system).chain());

        Self { tick, render }
    }
}

impl Default for FrameSchedules {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the session by `dt` seconds: update [`FrameTime`], run `tick`,
/// then `render`. Negative or non-finite `dt` counts as zero.
pub fn run_frame(world: &mut World, schedules: &mut FrameSchedules, dt: f64) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    {
        let mut time = world.get_resource_or_insert_with(FrameTime::default);
        time.delta = dt;
        time.elapsed += dt;
        time.frame += 1;
    }
    schedules.tick.run(world);
    schedules.render.run(world);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec2;
    use skyway_catalog::{Feature, FeatureCatalog, FeatureKind};
    use skyway_cull::{
        Category, OrthographicGlobe, Platform, ProjectError, Projection, Viewport,
        ViewportProjector,
    };
    use skyway_flight::{AltitudeMode, FlightModel, FlightParams, TrailEmitter, TrailParams};
    use skyway_geodesy::GeoPoint;

    use super::*;
    use crate::resources::{
        AltitudeNotices, CullSettings, ErrorTally, Flight, FlightInput, LatestFrame, Projector,
        Trails,
    };
    use crate::world::{SessionSetup, create_world};

    struct BrokenCamera;

    impl ViewportProjector for BrokenCamera {
        fn project(&self, _p: GeoPoint) -> Result<Projection, ProjectError> {
            Err(ProjectError::Camera("device lost".into()))
        }
    }

    fn cities_near(origin: GeoPoint) -> FeatureCatalog {
        FeatureCatalog::new((0..5).map(|i| {
            Feature::new(
                format!("town {i}"),
                FeatureKind::City {
                    position: GeoPoint::new(origin.lon + 0.2 * i as f64, origin.lat),
                    capital: false,
                    population: 1_000,
                },
            )
        }))
    }

    fn setup(projector: Box<dyn ViewportProjector + Send + Sync>) -> SessionSetup {
        let spawn = GeoPoint::new(0.0, 0.0);
        let viewport = Viewport::new(800.0, 600.0, 16.0);
        SessionSetup {
            flight: FlightModel::new(FlightParams::default(), spawn, 0.0),
            trails: TrailEmitter::new(TrailParams::default()),
            catalog: Arc::new(cities_near(spawn)),
            projector,
            settings: CullSettings::for_platform(Platform::Native, viewport),
            error_queue_capacity: 16,
        }
    }

    fn globe() -> Box<dyn ViewportProjector + Send + Sync> {
        let viewport = Viewport::new(800.0, 600.0, 16.0);
        Box::new(OrthographicGlobe::new(GeoPoint::default(), 2000.0, &viewport))
    }

    #[test]
    fn test_schedules_are_single_threaded() {
        let schedules = FrameSchedules::new();
        assert_eq!(schedules.tick.get_executor_kind(), ExecutorKind::SingleThreaded);
        assert_eq!(schedules.render.get_executor_kind(), ExecutorKind::SingleThreaded);
    }

    #[test]
    fn test_render_sees_this_frames_tick() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        for _ in 0..3 {
            run_frame(&mut world, &mut schedules, 1.0 / 60.0);
        }
        let time = world.resource::<FrameTime>();
        assert_eq!(time.frame, 3);
        assert!((time.elapsed - 0.05).abs() < 1e-12);
        assert_eq!(world.resource::<LatestFrame>().0.frame, 3);
    }

    #[test]
    fn test_cities_rendered_through_world() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        run_frame(&mut world, &mut schedules, 1.0 / 60.0);

        let frame = &world.resource::<LatestFrame>().0;
        let cities = frame.category(Category::Cities).unwrap();
        assert_eq!(cities.candidates.len(), 5);
        let center = Vec2::new(400.0, 300.0);
        assert!(cities.candidates[0].screen.distance(center) < 50.0);
        assert_eq!(world.resource::<ErrorTally>().total, 0);
    }

    #[test]
    fn test_input_steers_and_trails_accumulate() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        world.resource_mut::<FlightInput>().steer(1.0);
        for _ in 0..31 {
            run_frame(&mut world, &mut schedules, 1.0 / 60.0);
        }
        let heading = world.resource::<Flight>().0.state().heading_rad;
        assert!(heading != 0.0);
        assert!(world.resource::<Flight>().0.is_controlled());
        // Just over 0.5 s at a 0.05 s interval: ten pairs.
        assert_eq!(world.resource::<Trails>().0.len(), 20);

        world.resource_mut::<FlightInput>().release();
        run_frame(&mut world, &mut schedules, 1.0 / 60.0);
        assert!(!world.resource::<Flight>().0.is_controlled());
    }

    #[test]
    fn test_altitude_notice_once_per_transition() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        world.resource_mut::<FlightInput>().set_altitude(true);
        run_frame(&mut world, &mut schedules, 0.1);
        {
            let notices = &world.resource::<AltitudeNotices>().0;
            assert_eq!(notices.len(), 1);
            assert_eq!(notices[0].to, AltitudeMode::High);
        }

        world.resource_mut::<FlightInput>().set_altitude(true);
        run_frame(&mut world, &mut schedules, 0.1);
        assert!(world.resource::<AltitudeNotices>().0.is_empty());
        assert!(world.resource::<Flight>().0.state().altitude_blend > 0.0);
    }

    #[test]
    fn test_altitude_notices_do_not_accumulate() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        for i in 0..50 {
            world.resource_mut::<FlightInput>().set_altitude(i % 2 == 0);
            run_frame(&mut world, &mut schedules, 1.0 / 60.0);
            assert!(world.resource::<AltitudeNotices>().0.len() <= 1);
        }
    }

    #[test]
    fn test_camera_failure_reported_each_frame() {
        let mut world = create_world(setup(Box::new(BrokenCamera)));
        let mut schedules = FrameSchedules::new();
        run_frame(&mut world, &mut schedules, 1.0 / 60.0);
        run_frame(&mut world, &mut schedules, 1.0 / 60.0);

        let frame = &world.resource::<LatestFrame>().0;
        assert!(frame.category(Category::Cities).unwrap().candidates.is_empty());
        let tally = world.resource::<ErrorTally>();
        // Only the city category has features to project.
        assert_eq!(tally.total, 2);
        assert_eq!(tally.last.as_ref().map(|r| r.context.frame), Some(2));
    }

    #[test]
    fn test_degenerate_dt_is_ignored() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        let before = world.resource::<Flight>().0.state().position;
        run_frame(&mut world, &mut schedules, f64::NAN);
        run_frame(&mut world, &mut schedules, -1.0);
        assert_eq!(world.resource::<Flight>().0.state().position, before);
        assert_eq!(world.resource::<FrameTime>().elapsed, 0.0);
    }

    #[test]
    fn test_projector_follows_craft() {
        let mut world = create_world(setup(globe()));
        let mut schedules = FrameSchedules::new();
        for _ in 0..120 {
            run_frame(&mut world, &mut schedules, 1.0 / 60.0);
        }
        let craft = world.resource::<Flight>().0.state().position;
        let projected = world.resource::<Projector>().0.project(craft).unwrap();
        match projected {
            Projection::Visible(p) => assert!(p.distance(Vec2::new(400.0, 300.0)) < 1e-2),
            Projection::Occluded => panic!("craft occluded"),
        }
    }
}
