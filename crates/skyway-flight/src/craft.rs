//! The craft's continuous control state.

use serde::{Deserialize, Serialize};
use skyway_geodesy::GeoPoint;

/// Discrete altitude command. Everything continuous is driven by
/// [`CraftState::altitude_blend`], which chases this mode over time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AltitudeMode {
    #[default]
    Low,
    High,
}

impl AltitudeMode {
    /// Value `altitude_blend` converges toward in this mode.
    pub fn target_blend(self) -> f64 {
        match self {
            AltitudeMode::Low => 0.0,
            AltitudeMode::High => 1.0,
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            AltitudeMode::Low => AltitudeMode::High,
            AltitudeMode::High => AltitudeMode::Low,
        }
    }
}

/// Snapshot of the simulated craft. Only [`FlightModel`](crate::FlightModel)
/// mutates it; everything else gets a shared reference.
#[derive(Clone, Debug, PartialEq)]
pub struct CraftState {
    /// Current position. Longitude in `(-180, 180]`, latitude in `[-90, 90]`.
    pub position: GeoPoint,
    /// Heading in radians: 0 = north, positive = counter-clockwise.
    pub heading_rad: f64,
    /// Steering input in `[-1, 1]`. Positive turns right.
    pub turn_input: f64,
    /// Smoothed bank angle; `|bank_rad| <= max_bank_rad`.
    pub bank_rad: f64,
    /// Commanded altitude mode.
    pub altitude_mode: AltitudeMode,
    /// Smoothed altitude in `[0, 1]` (0 = low, 1 = high).
    pub altitude_blend: f64,
    /// Externally supplied speed multiplier, always `>= 1`.
    pub fuel_boost_multiplier: f64,
}

impl CraftState {
    /// A craft spawned at `position`, level, at low altitude.
    pub fn spawn(position: GeoPoint, heading_rad: f64) -> Self {
        Self {
            position: position.normalized(),
            heading_rad: skyway_geodesy::normalize_angle(heading_rad),
            turn_input: 0.0,
            bank_rad: 0.0,
            altitude_mode: AltitudeMode::Low,
            altitude_blend: 0.0,
            fuel_boost_multiplier: 1.0,
        }
    }

    /// Heading expressed as a navigation bearing (clockwise from north).
    pub fn bearing_rad(&self) -> f64 {
        skyway_geodesy::heading_to_bearing(self.heading_rad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_defaults() {
        let s = CraftState::spawn(GeoPoint::new(2.35, 48.85), 0.0);
        assert_eq!(s.altitude_mode, AltitudeMode::Low);
        assert_eq!(s.altitude_blend, 0.0);
        assert_eq!(s.fuel_boost_multiplier, 1.0);
        assert_eq!(s.turn_input, 0.0);
    }

    #[test]
    fn test_spawn_normalizes_position() {
        let s = CraftState::spawn(GeoPoint { lon: 200.0, lat: 95.0 }, -1.0);
        assert!((s.position.lon - -160.0).abs() < 1e-9);
        assert_eq!(s.position.lat, 90.0);
        assert!(s.heading_rad >= 0.0);
    }

    #[test]
    fn test_altitude_mode_targets() {
        assert_eq!(AltitudeMode::Low.target_blend(), 0.0);
        assert_eq!(AltitudeMode::High.target_blend(), 1.0);
        assert_eq!(AltitudeMode::Low.toggled(), AltitudeMode::High);
    }
}
