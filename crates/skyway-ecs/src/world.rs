//! World factory for one flight session.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use skyway_catalog::FeatureCatalog;
use skyway_cull::{ErrorSink, ViewportProjector};
use skyway_flight::{FlightModel, TrailEmitter};

use crate::resources::{
    AltitudeNotices, Catalog, CullSettings, ErrorTally, Errors, Flight, FlightInput, FrameTime,
    LatestFrame, Projector, Trails,
};

/// Everything a session needs before its first frame.
pub struct SessionSetup {
    pub flight: FlightModel,
    pub trails: TrailEmitter,
    pub catalog: Arc<FeatureCatalog>,
    pub projector: Box<dyn ViewportProjector + Send + Sync>,
    pub settings: CullSettings,
    pub error_queue_capacity: usize,
}

/// Create a world holding every resource the frame schedules use.
pub fn create_world(setup: SessionSetup) -> World {
    let mut world = World::new();
    world.insert_resource(FrameTime::default());
    world.insert_resource(FlightInput::default());
    world.insert_resource(AltitudeNotices::default());
    world.insert_resource(Flight(setup.flight));
    world.insert_resource(Trails(setup.trails));
    world.insert_resource(Catalog(setup.catalog));
    world.insert_resource(Projector(setup.projector));
    world.insert_resource(setup.settings);
    world.insert_resource(Errors(ErrorSink::new(setup.error_queue_capacity)));
    world.insert_resource(ErrorTally::default());
    world.insert_resource(LatestFrame::default());
    world
}
