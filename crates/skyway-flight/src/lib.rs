//! Craft kinematics and exhaust trails.
//!
//! [`FlightModel`] owns the single mutable [`CraftState`] and integrates it
//! once per simulation tick. [`TrailEmitter`] reads that state on a fixed
//! cadence and lays down wingtip particles using exact spherical offsets.

mod craft;
mod model;
mod trail;

pub use craft::{AltitudeMode, CraftState};
pub use model::{AltitudeChanged, FlightModel, FlightParams};
pub use trail::{MAX_BURST_PAIRS, TrailEmitter, TrailParams, TrailParticle, trail_points};
