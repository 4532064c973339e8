//! Injected world-to-screen projection.

use glam::Vec2;
use skyway_geodesy::GeoPoint;

/// Screen rectangle in pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Extra pixels around the edges inside which candidates still count as
    /// on-screen, so labels do not pop at the border.
    pub margin: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// `true` if `p` lies inside the viewport expanded by the margin.
    /// Non-finite points are never contained.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= -self.margin
            && p.x <= self.width + self.margin
            && p.y >= -self.margin
            && p.y <= self.height + self.margin
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 32.0)
    }
}

/// Outcome of projecting one world point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Visible(Vec2),
    /// Behind the globe or outside the camera frustum.
    Occluded,
}

/// A projection that could not be computed at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectError {
    /// This one point is unusable; the caller skips it and carries on.
    #[error("cannot project {point}: {reason}")]
    Candidate {
        point: GeoPoint,
        reason: &'static str,
    },

    /// The camera itself is unusable; nothing can be projected this frame.
    #[error("camera unavailable: {0}")]
    Camera(String),
}

/// World-to-screen capability supplied by the renderer.
///
/// Implementations must be deterministic for a given camera state and must
/// report hidden points as [`Projection::Occluded`], not as errors.
pub trait ViewportProjector {
    fn project(&self, point: GeoPoint) -> Result<Projection, ProjectError>;

    /// Re-aim the camera at `target`. Fixed cameras ignore this.
    fn set_camera(&mut self, _target: GeoPoint) {}
}

/// Orthographic view of the globe centred on a geographic point, as seen
/// from infinitely far away. The far hemisphere is occluded.
#[derive(Clone, Debug)]
pub struct OrthographicGlobe {
    center: GeoPoint,
    radius_px: f32,
    screen_center: Vec2,
}

impl OrthographicGlobe {
    /// `radius_px` is the on-screen globe radius, i.e. pixels per radian of
    /// arc at the centre of the view.
    pub fn new(center: GeoPoint, radius_px: f32, viewport: &Viewport) -> Self {
        Self {
            center: center.normalized(),
            radius_px,
            screen_center: viewport.center(),
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_px(&self) -> f32 {
        self.radius_px
    }
}

impl ViewportProjector for OrthographicGlobe {
    fn project(&self, point: GeoPoint) -> Result<Projection, ProjectError> {
        if !(self.radius_px.is_finite() && self.radius_px > 0.0) {
            return Err(ProjectError::Camera(format!(
                "globe radius must be positive, got {}",
                self.radius_px
            )));
        }
        if !point.is_finite() {
            return Err(ProjectError::Candidate {
                point,
                reason: "non-finite coordinate",
            });
        }

        let (lon0, lat0) = self.center.to_radians();
        let (lon, lat) = point.to_radians();
        let dlon = lon - lon0;

        let cos_c = lat0.sin() * lat.sin() + lat0.cos() * lat.cos() * dlon.cos();
        if cos_c < 0.0 {
            return Ok(Projection::Occluded);
        }

        let x = lat.cos() * dlon.sin();
        let y = lat0.cos() * lat.sin() - lat0.sin() * lat.cos() * dlon.cos();
        // Screen y grows downward.
        let offset = Vec2::new(x as f32, -(y as f32)) * self.radius_px;
        Ok(Projection::Visible(self.screen_center + offset))
    }

    fn set_camera(&mut self, target: GeoPoint) {
        self.center = target.normalized();
    }
}
