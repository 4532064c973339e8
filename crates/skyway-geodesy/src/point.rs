//! Geographic points and boxes in degrees.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position on the sphere in degrees.
///
/// Points built through [`GeoPoint::new`] are normalized: longitude lies in
/// `(-180, 180]` and latitude in `[-90, 90]`. Deserialized points are taken
/// as-is; callers that read external data should pass them through
/// [`GeoPoint::normalized`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees. Positive = east.
    pub lon: f64,
    /// Latitude in degrees. Positive = north.
    pub lat: f64,
}

impl GeoPoint {
    /// Create a normalized point. Non-finite components collapse to 0.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon: wrap_longitude(lon),
            lat: clamp_latitude(lat),
        }
    }

    /// Build a point from radians (longitude, latitude).
    pub fn from_radians(lon_rad: f64, lat_rad: f64) -> Self {
        Self::new(lon_rad.to_degrees(), lat_rad.to_degrees())
    }

    /// Longitude and latitude in radians.
    pub fn to_radians(self) -> (f64, f64) {
        (self.lon.to_radians(), self.lat.to_radians())
    }

    /// This point with longitude wrapped and latitude clamped.
    pub fn normalized(self) -> Self {
        Self::new(self.lon, self.lat)
    }

    /// `true` when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Coarse "square radius" test: both the latitude difference and the
    /// shortest longitude difference are within `radius_deg`.
    pub fn within_square(&self, center: GeoPoint, radius_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= radius_deg
            && longitude_delta(center.lon, self.lon).abs() <= radius_deg
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_dir = if self.lat >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.lon >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.3}\u{00B0}{}, {:.3}\u{00B0}{}",
            self.lat.abs(),
            lat_dir,
            self.lon.abs(),
            lon_dir,
        )
    }
}

/// Axis-aligned box in longitude/latitude degrees.
///
/// A box that crosses the antimeridian keeps `min_lon` in `(-180, 180]` and
/// carries `max_lon` past 180, so `max_lon - min_lon` is always the width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Degenerate box around a single point.
    pub fn point(p: GeoPoint) -> Self {
        Self {
            min_lon: p.lon,
            max_lon: p.lon,
            min_lat: p.lat,
            max_lat: p.lat,
        }
    }

    /// Smallest box enclosing every point, or `None` for an empty input.
    ///
    /// The longitude span is the complement of the widest gap between
    /// neighbouring longitudes on the circle, so a shape straddling the
    /// antimeridian gets a narrow box rather than one around the globe.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut lons = vec![wrap_longitude(first.lon)];
        let mut bounds = iter.fold(Self::point(first), |mut b, p| {
            lons.push(wrap_longitude(p.lon));
            b.min_lat = b.min_lat.min(p.lat);
            b.max_lat = b.max_lat.max(p.lat);
            b
        });

        lons.sort_by(f64::total_cmp);
        let (lo, hi) = (lons[0], lons[lons.len() - 1]);
        bounds.min_lon = lo;
        bounds.max_lon = hi;
        let mut widest_gap = 360.0 - (hi - lo);
        for pair in lons.windows(2) {
            let gap = pair[1] - pair[0];
            if gap > widest_gap {
                widest_gap = gap;
                bounds.min_lon = pair[1];
                bounds.max_lon = pair[0] + 360.0;
            }
        }
        Some(bounds)
    }

    /// Centre of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lon + self.max_lon) * 0.5,
            (self.min_lat + self.max_lat) * 0.5,
        )
    }

    /// Whether the box overlaps the square of half-size `radius_deg` around
    /// `center`. Longitude is compared through the shortest wrap-around
    /// difference, so boxes near the antimeridian are handled.
    pub fn intersects_square(&self, center: GeoPoint, radius_deg: f64) -> bool {
        let half_lon = (self.max_lon - self.min_lon) * 0.5;
        let half_lat = (self.max_lat - self.min_lat) * 0.5;
        let mid = self.center();
        (mid.lat - center.lat).abs() <= radius_deg + half_lat
            && longitude_delta(center.lon, mid.lon).abs() <= radius_deg + half_lon
    }
}

/// Wrap a longitude into `(-180, 180]`. Non-finite input returns 0.
pub fn wrap_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return 0.0;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { 180.0 } else { wrapped }
}

/// Clamp a latitude into `[-90, 90]`. Non-finite input returns 0.
pub fn clamp_latitude(lat: f64) -> f64 {
    if !lat.is_finite() {
        return 0.0;
    }
    lat.clamp(-90.0, 90.0)
}

/// Shortest signed longitude difference `to - from`, in `(-180, 180]`.
pub fn longitude_delta(from: f64, to: f64) -> f64 {
    wrap_longitude(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude_range() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), 180.0);
        assert!((wrap_longitude(190.0) - -170.0).abs() < 1e-9);
        assert!((wrap_longitude(-190.0) - 170.0).abs() < 1e-9);
        assert!((wrap_longitude(720.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_longitude_sampled_inputs_stay_in_range() {
        let mut lon = -1000.0;
        while lon < 1000.0 {
            let w = wrap_longitude(lon);
            assert!(w > -180.0 && w <= 180.0, "{lon} wrapped to {w}");
            lon += 7.3;
        }
    }

    #[test]
    fn test_clamp_latitude() {
        assert_eq!(clamp_latitude(95.0), 90.0);
        assert_eq!(clamp_latitude(-91.0), -90.0);
        assert_eq!(clamp_latitude(45.0), 45.0);
    }

    #[test]
    fn test_non_finite_collapses_to_zero() {
        let p = GeoPoint::new(f64::NAN, f64::INFINITY);
        assert_eq!(p, GeoPoint::new(0.0, 0.0));
        assert!(!GeoPoint { lon: f64::NAN, lat: 0.0 }.is_finite());
    }

    #[test]
    fn test_longitude_delta_across_antimeridian() {
        assert!((longitude_delta(179.0, -179.0) - 2.0).abs() < 1e-9);
        assert!((longitude_delta(-179.0, 179.0) - -2.0).abs() < 1e-9);
    }

    #[test]
    fn test_within_square_wraps() {
        let center = GeoPoint::new(179.5, 10.0);
        assert!(GeoPoint::new(-179.5, 10.5).within_square(center, 2.0));
        assert!(!GeoPoint::new(-175.0, 10.0).within_square(center, 2.0));
        assert!(!GeoPoint::new(179.5, 13.0).within_square(center, 2.0));
    }

    #[test]
    fn test_bounds_from_points() {
        let pts = [
            GeoPoint::new(1.0, 2.0),
            GeoPoint::new(-3.0, 5.0),
            GeoPoint::new(4.0, -1.0),
        ];
        let b = GeoBounds::from_points(&pts).unwrap();
        assert_eq!(b.min_lon, -3.0);
        assert_eq!(b.max_lon, 4.0);
        assert_eq!(b.min_lat, -1.0);
        assert_eq!(b.max_lat, 5.0);
        assert_eq!(b.center(), GeoPoint::new(0.5, 2.0));
        assert!(GeoBounds::from_points(&[] as &[GeoPoint]).is_none());
    }

    #[test]
    fn test_bounds_across_antimeridian_stay_narrow() {
        let ring = [
            GeoPoint::new(170.0, 60.0),
            GeoPoint::new(-170.0, 60.0),
            GeoPoint::new(-170.0, 70.0),
            GeoPoint::new(170.0, 70.0),
        ];
        let b = GeoBounds::from_points(&ring).unwrap();
        assert_eq!(b.min_lon, 170.0);
        assert_eq!(b.max_lon, 190.0);

        let c = b.center();
        assert_eq!(c.lon, 180.0);
        assert_eq!(c.lat, 65.0);

        assert!(b.intersects_square(GeoPoint::new(-175.0, 65.0), 1.0));
        assert!(!b.intersects_square(GeoPoint::new(0.0, 65.0), 60.0));
    }

    #[test]
    fn test_bounds_intersects_square() {
        let b = GeoBounds {
            min_lon: 10.0,
            max_lon: 20.0,
            min_lat: 40.0,
            max_lat: 50.0,
        };
        // Box edge is 5 degrees east of the centre.
        assert!(b.intersects_square(GeoPoint::new(5.0, 45.0), 5.0));
        assert!(!b.intersects_square(GeoPoint::new(4.0, 45.0), 5.0));
        assert!(!b.intersects_square(GeoPoint::new(15.0, 30.0), 5.0));
    }

    #[test]
    fn test_display() {
        let p = GeoPoint::new(-122.5, 45.25);
        assert_eq!(p.to_string(), "45.250\u{00B0}N, 122.500\u{00B0}W");
    }
}
