//! Spherical geodesy for the flight core: geographic points, the forward
//! destination-point formula, and heading/bearing conventions.

mod angle;
mod point;
mod sphere;

pub use angle::{bearing_to_heading, heading_to_bearing, normalize_angle};
pub use point::{GeoBounds, GeoPoint, clamp_latitude, longitude_delta, wrap_longitude};
pub use sphere::{destination, destination_deg, haversine_distance_rad, initial_bearing_rad};
