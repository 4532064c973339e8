//! Exhaust trail particles laid down at the wingtips.
//!
//! Particles are fixed in world space once spawned; the craft flying away
//! from them is what draws the trail. Spawning runs off an accumulator so
//! the emission cadence is independent of the frame rate.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use skyway_geodesy::{GeoPoint, destination};

use crate::craft::CraftState;

/// Trail tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailParams {
    /// Emit a particle pair every this many seconds.
    pub spawn_interval_s: f64,
    /// Lifetime of each particle in seconds.
    pub max_life_s: f64,
    /// Sideways offset of each wingtip, degrees of arc.
    pub wing_angular_distance_deg: f64,
    /// Additional offset behind the wingtip, degrees of arc.
    pub aft_angular_distance_deg: f64,
    /// Cosmetic particle size in pixels.
    pub particle_size: f32,
    pub enabled: bool,
}

impl Default for TrailParams {
    fn default() -> Self {
        Self {
            spawn_interval_s: 0.05,
            max_life_s: 1.5,
            wing_angular_distance_deg: 0.03,
            aft_angular_distance_deg: 0.015,
            particle_size: 3.0,
            enabled: true,
        }
    }
}

/// A single trail particle.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailParticle {
    /// World position, fixed at spawn.
    pub position: GeoPoint,
    /// Remaining life in seconds.
    pub life: f64,
    pub max_life: f64,
    pub size: f32,
}

impl TrailParticle {
    /// Fade factor in `[0, 1]`: 1 at spawn, 0 when expired.
    pub fn opacity(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0) as f32
    }
}

/// Left and right trail emission points for the craft's current pose.
///
/// Each point is one geodesic step sideways (bearing ∓ 90°) followed by a
/// second step aft (bearing + 180°).
pub fn trail_points(craft: &CraftState, params: &TrailParams) -> (GeoPoint, GeoPoint) {
    let bearing = craft.bearing_rad();
    let wing = params.wing_angular_distance_deg.to_radians();
    let aft = params.aft_angular_distance_deg.to_radians();

    let left = destination(craft.position, bearing - FRAC_PI_2, wing);
    let right = destination(craft.position, bearing + FRAC_PI_2, wing);
    (
        destination(left, bearing + PI, aft),
        destination(right, bearing + PI, aft),
    )
}

/// Upper bound on pairs emitted by a single tick, whatever the lifetime.
pub const MAX_BURST_PAIRS: usize = 256;

/// Owns the live particle list.
#[derive(Clone, Debug, Default)]
pub struct TrailEmitter {
    params: TrailParams,
    accumulator: f64,
    particles: Vec<TrailParticle>,
}

impl TrailEmitter {
    pub fn new(params: TrailParams) -> Self {
        Self {
            params,
            accumulator: 0.0,
            particles: Vec::new(),
        }
    }

    pub fn params(&self) -> &TrailParams {
        &self.params
    }

    /// Age existing particles by `dt`, drop the expired ones, then emit one
    /// pair per spawn interval that elapsed.
    pub fn tick(&mut self, dt: f64, craft: &CraftState) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for particle in &mut self.particles {
            particle.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        let interval = self.params.spawn_interval_s;
        let life = self.params.max_life_s;
        let bad_interval = interval.is_nan() || interval <= 0.0;
        let bad_life = !life.is_finite() || life <= 0.0;
        if !self.params.enabled || bad_interval || bad_life {
            self.accumulator = 0.0;
            return;
        }

        self.accumulator += dt;
        let due = (self.accumulator / interval).floor();
        if due < 1.0 {
            return;
        }
        self.accumulator -= due * interval;
        if !self.accumulator.is_finite() {
            self.accumulator = 0.0;
        }

        // A frame spike can cover many intervals; anything beyond one
        // lifetime's worth would be born already expired.
        let max_pairs = (life / interval).ceil().clamp(1.0, MAX_BURST_PAIRS as f64);
        let pairs = due.min(max_pairs) as usize;
        if pairs < due as usize {
            log::trace!("trail emission capped at {pairs} pairs (due {due})");
        }

        let (left, right) = trail_points(craft, &self.params);
        for _ in 0..pairs {
            self.spawn(left);
            self.spawn(right);
        }
    }

    fn spawn(&mut self, position: GeoPoint) {
        self.particles.push(TrailParticle {
            position,
            life: self.params.max_life_s,
            max_life: self.params.max_life_s,
            size: self.params.particle_size,
        });
    }

    /// Live particles, oldest first.
    pub fn snapshot(&self) -> &[TrailParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drop every particle and reset the cadence.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyway_geodesy::haversine_distance_rad;

    fn params(interval: f64, life: f64) -> TrailParams {
        TrailParams {
            spawn_interval_s: interval,
            max_life_s: life,
            ..TrailParams::default()
        }
    }

    fn craft_at_origin() -> CraftState {
        CraftState::spawn(GeoPoint::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn test_equator_trail_points_example() {
        let craft = craft_at_origin();
        let (left, right) = trail_points(&craft, &TrailParams::default());

        // Symmetric about the origin's meridian.
        assert!((left.lon + right.lon).abs() < 1e-12);
        assert!((left.lat - right.lat).abs() < 1e-12);

        // Within 1% of the flat offsets at the equator.
        assert!(((left.lon - -0.03) / 0.03).abs() < 0.01);
        assert!(((right.lon - 0.03) / 0.03).abs() < 0.01);
        assert!(((left.lat - -0.015) / 0.015).abs() < 0.01);
    }

    #[test]
    fn test_trail_points_follow_heading() {
        let mut craft = craft_at_origin();
        // Heading +90 degrees counter-clockwise faces west.
        craft.heading_rad = FRAC_PI_2;
        let (left, right) = trail_points(&craft, &TrailParams::default());
        // Facing west, the left wing points south and aft is east.
        assert!(left.lat < 0.0 && right.lat > 0.0);
        assert!(left.lon > 0.0 && right.lon > 0.0);
    }

    #[test]
    fn test_trail_points_stay_finite_near_pole() {
        let mut craft = CraftState::spawn(GeoPoint::new(45.0, 89.95), 0.0);
        craft.heading_rad = 1.0;
        let p = TrailParams::default();
        let (left, right) = trail_points(&craft, &p);
        let wing = p.wing_angular_distance_deg.to_radians();
        let aft = p.aft_angular_distance_deg.to_radians();
        for tip in [left, right] {
            assert!(tip.is_finite());
            let d = haversine_distance_rad(craft.position, tip);
            assert!(d <= wing + aft + 1e-12);
            assert!(d >= (wing - aft).abs() - 1e-12);
        }
        assert!(haversine_distance_rad(left, right) > wing);
    }

    #[test]
    fn test_k_intervals_give_2k_particles() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.25, 10.0));
        for k in 1..=8 {
            trail.tick(0.25, &craft);
            assert_eq!(trail.len(), 2 * k);
            for p in trail.snapshot() {
                assert!(p.life > 0.0 && p.life <= p.max_life);
            }
        }
    }

    #[test]
    fn test_cadence_independent_of_frame_rate() {
        let craft = craft_at_origin();
        let mut fast = TrailEmitter::new(params(0.25, 10.0));
        let mut slow = TrailEmitter::new(params(0.25, 10.0));
        for _ in 0..64 {
            fast.tick(1.0 / 64.0, &craft);
        }
        for _ in 0..4 {
            slow.tick(0.25, &craft);
        }
        assert_eq!(fast.len(), 8);
        assert_eq!(slow.len(), 8);
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.5, 10.0));
        trail.tick(0.75, &craft);
        assert_eq!(trail.len(), 2);
        // 0.25 carried over + 0.25 crosses the next interval.
        trail.tick(0.25, &craft);
        assert_eq!(trail.len(), 4);
    }

    #[test]
    fn test_particles_expire() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.5, 1.0));
        trail.tick(0.5, &craft);
        assert_eq!(trail.len(), 2);
        trail.tick(0.5, &craft);
        assert_eq!(trail.len(), 4);
        // First pair reaches life 0 and is pruned; a new pair spawns.
        trail.tick(0.5, &craft);
        assert_eq!(trail.len(), 4);
        assert!(trail.snapshot().iter().all(|p| p.life > 0.0));
    }

    #[test]
    fn test_steady_state_count_is_bounded() {
        let craft = craft_at_origin();
        let p = params(0.25, 1.0);
        let per_side = (p.max_life_s / p.spawn_interval_s) as usize;
        let mut trail = TrailEmitter::new(p);
        for _ in 0..200 {
            trail.tick(1.0 / 60.0, &craft);
            assert!(trail.len() <= 2 * per_side + 2);
        }
    }

    #[test]
    fn test_frame_spike_is_capped() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.25, 1.0));
        trail.tick(1_000.0, &craft);
        assert_eq!(trail.len(), 8);
    }

    #[test]
    fn test_non_positive_life_emits_nothing() {
        let craft = craft_at_origin();
        for life in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut trail = TrailEmitter::new(params(0.1, life));
            trail.tick(0.1, &craft);
            trail.tick(0.5, &craft);
            assert!(trail.is_empty(), "life {life} emitted {}", trail.len());
        }
    }

    #[test]
    fn test_long_life_spike_is_bounded() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.01, 1.0e9));
        trail.tick(1.0e6, &craft);
        assert_eq!(trail.len(), 2 * MAX_BURST_PAIRS);
        assert!(trail.snapshot().iter().all(|p| p.life > 0.0 && p.life <= p.max_life));
    }

    #[test]
    fn test_particles_stay_where_spawned() {
        let mut craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.25, 10.0));
        trail.tick(0.25, &craft);
        let first = trail.snapshot()[0].position;
        craft.position = GeoPoint::new(10.0, 10.0);
        trail.tick(0.1, &craft);
        assert_eq!(trail.snapshot()[0].position, first);
    }

    #[test]
    fn test_disabled_emits_nothing() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(TrailParams {
            enabled: false,
            ..TrailParams::default()
        });
        trail.tick(5.0, &craft);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_opacity_fades() {
        let p = TrailParticle {
            position: GeoPoint::default(),
            life: 0.5,
            max_life: 2.0,
            size: 1.0,
        };
        assert!((p.opacity() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_clear() {
        let craft = craft_at_origin();
        let mut trail = TrailEmitter::new(params(0.25, 10.0));
        trail.tick(1.0, &craft);
        assert!(!trail.is_empty());
        trail.clear();
        assert!(trail.is_empty());
    }
}
