//! bevy_ecs frame driver for the flight core.
//!
//! One frame is one `tick` schedule (the only writer of flight and trail
//! state) followed by one `render` schedule that reads them. Both schedules
//! run on the single-threaded executor and never overlap.

mod resources;
mod schedule;
mod systems;
mod world;

pub use resources::{
    AltitudeNotices, Catalog, CullSettings, ErrorTally, Errors, Flight, FlightInput, FrameTime,
    LatestFrame, Projector, Trails,
};
pub use schedule::{FrameSchedules, run_frame};
pub use systems::{
    apply_input_system, camera_follow_system, cull_render_system, drain_errors_system,
    flight_tick_system, trail_tick_system,
};
pub use world::{SessionSetup, create_world};
