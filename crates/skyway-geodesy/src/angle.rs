//! Heading and bearing conventions.
//!
//! The flight model keeps a *heading* in the mathematical convention:
//! 0 points north along the local meridian and positive angles turn
//! counter-clockwise (toward west). Navigation code and the geodesy
//! formulas use a *bearing*: clockwise from north. The two differ only in
//! sign.

use std::f64::consts::TAU;

/// Wrap an angle into `[0, 2π)`. Non-finite input returns 0.
pub fn normalize_angle(rad: f64) -> f64 {
    if !rad.is_finite() {
        return 0.0;
    }
    let a = rad.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Convert an internal heading to a navigation bearing in `[0, 2π)`.
pub fn heading_to_bearing(heading_rad: f64) -> f64 {
    normalize_angle(-heading_rad)
}

/// Convert a navigation bearing to an internal heading in `[0, 2π)`.
pub fn bearing_to_heading(bearing_rad: f64) -> f64 {
    normalize_angle(-bearing_rad)
}
