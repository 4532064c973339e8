//! Kinematic state machine: turn decay, bank and altitude smoothing, and
//! the per-tick position step.
//!
//! Every continuous quantity is integrated with time-based factors
//! (`exp(-k·dt)` or `min(1, k·dt)`), so the result depends on elapsed time
//! and not on how that time was split into frames.

use serde::{Deserialize, Serialize};
use skyway_geodesy::{GeoPoint, normalize_angle};

use crate::craft::{AltitudeMode, CraftState};

/// Tuning constants for the flight model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightParams {
    /// Maximum bank angle in radians.
    pub max_bank_rad: f64,
    /// Exponential decay rate of the turn input while uncontrolled (1/s).
    pub decay_rate: f64,
    /// Below this magnitude a decaying turn input snaps to 0.
    pub turn_epsilon: f64,
    /// Bank low-pass rate (1/s).
    pub bank_smoothing_rate: f64,
    /// Altitude blend low-pass rate (1/s).
    pub altitude_smoothing_rate: f64,
    /// Cruise speed at high altitude, degrees of arc per second.
    pub base_speed_deg_s: f64,
    /// Speed factor applied in [`AltitudeMode::Low`].
    pub low_speed_multiplier: f64,
    /// Heading change rate at full bank, radians per second.
    pub turn_rate_rad_s: f64,
}

impl Default for FlightParams {
    fn default() -> Self {
        Self {
            max_bank_rad: 35f64.to_radians(),
            decay_rate: 3.0,
            turn_epsilon: 0.01,
            bank_smoothing_rate: 6.0,
            altitude_smoothing_rate: 1.5,
            base_speed_deg_s: 0.5,
            low_speed_multiplier: 0.6,
            turn_rate_rad_s: 1.2,
        }
    }
}

/// Emitted exactly once for each real altitude transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AltitudeChanged {
    pub from: AltitudeMode,
    pub to: AltitudeMode,
}

/// Owner of the craft state and the only writer to it.
#[derive(Clone, Debug)]
pub struct FlightModel {
    params: FlightParams,
    state: CraftState,
    /// `true` between `set_turn_input` and `release_turn`.
    controlled: bool,
    events: Vec<AltitudeChanged>,
}

impl FlightModel {
    /// Spawn a craft at `position` with the given heading.
    pub fn new(params: FlightParams, position: GeoPoint, heading_rad: f64) -> Self {
        Self {
            params,
            state: CraftState::spawn(position, heading_rad),
            controlled: false,
            events: Vec::new(),
        }
    }

    /// Read-only view of the craft.
    pub fn state(&self) -> &CraftState {
        &self.state
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    /// Whether a steering input is currently held.
    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// Store a steering input (clamped to `[-1, 1]`, NaN reads as 0) and
    /// hold it until [`release_turn`](Self::release_turn).
    pub fn set_turn_input(&mut self, x: f64) {
        self.state.turn_input = if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) };
        self.controlled = true;
    }

    /// Let go of the stick; the input decays from the next tick on.
    pub fn release_turn(&mut self) {
        self.controlled = false;
    }

    /// Command an altitude mode. Returns the transition, or `None` when the
    /// craft is already in that mode.
    pub fn set_altitude(&mut self, high: bool) -> Option<AltitudeChanged> {
        let to = if high {
            AltitudeMode::High
        } else {
            AltitudeMode::Low
        };
        let from = self.state.altitude_mode;
        if from == to {
            return None;
        }
        self.state.altitude_mode = to;
        let event = AltitudeChanged { from, to };
        self.events.push(event);
        log::debug!("altitude mode {from:?} -> {to:?}");
        Some(event)
    }

    /// Flip between low and high altitude.
    pub fn toggle_altitude(&mut self) -> Option<AltitudeChanged> {
        let high = self.state.altitude_mode.toggled() == AltitudeMode::High;
        self.set_altitude(high)
    }

    /// Hand out queued altitude events; each is returned once.
    pub fn drain_events(&mut self) -> Vec<AltitudeChanged> {
        std::mem::take(&mut self.events)
    }

    /// Set the fuel boost. Values below 1 (and NaN) are raised to 1.
    pub fn set_fuel_boost(&mut self, multiplier: f64) {
        self.state.fuel_boost_multiplier = if multiplier.is_nan() {
            1.0
        } else {
            multiplier.max(1.0)
        };
    }

    /// Current ground speed in degrees of arc per second.
    pub fn speed(&self) -> f64 {
        let mode_factor = match self.state.altitude_mode {
            AltitudeMode::High => 1.0,
            AltitudeMode::Low => self.params.low_speed_multiplier,
        };
        self.params.base_speed_deg_s * mode_factor * self.state.fuel_boost_multiplier
    }

    /// Advance the simulation by `dt` seconds. Negative or non-finite `dt`
    /// is treated as zero.
    pub fn tick(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let p = &self.params;
        let s = &mut self.state;

        if !self.controlled {
            s.turn_input *= (-p.decay_rate * dt).exp();
            if s.turn_input.abs() < p.turn_epsilon {
                s.turn_input = 0.0;
            }
        }
        s.turn_input = s.turn_input.clamp(-1.0, 1.0);

        let max_bank = p.max_bank_rad.abs();
        let bank_target = s.turn_input * max_bank;
        s.bank_rad += (bank_target - s.bank_rad) * smoothing_factor(dt, p.bank_smoothing_rate);
        s.bank_rad = s.bank_rad.clamp(-max_bank, max_bank);

        let alt_target = s.altitude_mode.target_blend();
        s.altitude_blend +=
            (alt_target - s.altitude_blend) * smoothing_factor(dt, p.altitude_smoothing_rate);
        s.altitude_blend = s.altitude_blend.clamp(0.0, 1.0);

        // Turn rate follows the smoothed bank, not the raw input.
        let bank_fraction = if max_bank > 0.0 {
            s.bank_rad / max_bank
        } else {
            0.0
        };
        s.heading_rad = normalize_angle(s.heading_rad - p.turn_rate_rad_s * bank_fraction * dt);

        let step = self.speed() * dt;
        let s = &mut self.state;
        let (sin_h, cos_h) = s.heading_rad.sin_cos();
        // Flat local-tangent step in degrees, not a geodesic. Longitude is
        // not scaled by latitude.
        s.position = GeoPoint::new(
            s.position.lon - sin_h * step,
            s.position.lat + cos_h * step,
        );
    }
}

/// First-order low-pass blend factor `min(1, dt·rate)`, kept in `[0, 1]`.
fn smoothing_factor(dt: f64, rate: f64) -> f64 {
    (dt * rate).clamp(0.0, 1.0)
}
