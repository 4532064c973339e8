//! Great-circle formulas on the unit sphere.
//!
//! All trigonometry runs in radians; the public surface takes and returns
//! [`GeoPoint`]s in degrees. Arguments to `asin` are clamped to `[-1, 1]`
//! first so floating-point overshoot near the poles never yields NaN.

use crate::angle::normalize_angle;
use crate::point::GeoPoint;

/// Point reached after travelling `angular_distance_rad` along the great
/// circle that leaves `origin` on `bearing_rad` (clockwise from north).
///
/// Exact on a sphere at every latitude, poles included. A non-finite
/// bearing or distance is a caller bug; the origin is returned unchanged
/// so a render path never sees NaN.
pub fn destination(origin: GeoPoint, bearing_rad: f64, angular_distance_rad: f64) -> GeoPoint {
    if !bearing_rad.is_finite() || !angular_distance_rad.is_finite() || !origin.is_finite() {
        return origin.normalized();
    }

    let (lon1, lat1) = origin.to_radians();
    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_d, cos_d) = angular_distance_rad.sin_cos();
    let (sin_b, cos_b) = bearing_rad.sin_cos();

    let sin_lat2 = (sin_lat1 * cos_d + cos_lat1 * sin_d * cos_b).clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let lon2 = lon1 + (sin_b * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * sin_lat2);

    GeoPoint::from_radians(lon2, lat2)
}

/// [`destination`] with bearing and distance given in degrees.
pub fn destination_deg(origin: GeoPoint, bearing_deg: f64, angular_distance_deg: f64) -> GeoPoint {
    destination(
        origin,
        bearing_deg.to_radians(),
        angular_distance_deg.to_radians(),
    )
}

/// Central angle between two points (haversine form), in radians.
pub fn haversine_distance_rad(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lon1, lat1) = a.to_radians();
    let (lon2, lat2) = b.to_radians();
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial bearing (forward azimuth) from `a` toward `b`, radians in `[0, 2π)`.
pub fn initial_bearing_rad(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lon1, lat1) = a.to_radians();
    let (lon2, lat2) = b.to_radians();
    let dlon = lon2 - lon1;

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_angle(x.atan2(y))
}
