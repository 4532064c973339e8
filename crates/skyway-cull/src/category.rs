//! Render categories and their altitude rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use skyway_catalog::{Feature, KindTag};

/// A group of features that is culled and budgeted on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Borders,
    Cities,
    /// National capitals, drawn from city entries with the capital flag.
    Capitals,
    Rivers,
    Lakes,
    Peaks,
    Volcanoes,
    Airports,
    NavLines,
}

impl Category {
    pub const COUNT: usize = 9;

    pub const ALL: [Category; Self::COUNT] = [
        Category::Borders,
        Category::Cities,
        Category::Capitals,
        Category::Rivers,
        Category::Lakes,
        Category::Peaks,
        Category::Volcanoes,
        Category::Airports,
        Category::NavLines,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog kind this category draws from.
    pub fn kind(self) -> KindTag {
        match self {
            Category::Borders => KindTag::Border,
            Category::Cities | Category::Capitals => KindTag::City,
            Category::Rivers => KindTag::River,
            Category::Lakes => KindTag::Lake,
            Category::Peaks => KindTag::Peak,
            Category::Volcanoes => KindTag::Volcano,
            Category::Airports => KindTag::Airport,
            Category::NavLines => KindTag::NavLine,
        }
    }

    /// Whether `feature` (already of [`kind`](Self::kind)) belongs here.
    pub fn accepts(self, feature: &Feature) -> bool {
        match self {
            Category::Capitals => feature.is_capital(),
            _ => feature.tag() == self.kind(),
        }
    }

    /// Proximity radius, altitude band and opacity ramp for this category.
    pub fn rules(self) -> CategoryRules {
        use AltitudeBand::{Above, Always, Below};
        let (coarse_radius_deg, band, opacity) = match self {
            Category::Borders => (60.0, Always, OpacityCurve::new(0.0, 0.4, 1.0, 1.0)),
            Category::Cities => (25.0, Below(0.8), OpacityCurve::new(0.3, 1.0, 0.8, 0.0)),
            Category::Capitals => (90.0, Above(0.95), OpacityCurve::new(0.95, 0.0, 1.0, 1.0)),
            Category::Rivers => (12.0, Below(0.6), OpacityCurve::new(0.3, 1.0, 0.6, 0.0)),
            Category::Lakes => (12.0, Below(0.65), OpacityCurve::new(0.35, 1.0, 0.65, 0.0)),
            Category::Peaks => (15.0, Below(0.5), OpacityCurve::new(0.2, 1.0, 0.5, 0.0)),
            Category::Volcanoes => (20.0, Below(0.5), OpacityCurve::new(0.2, 1.0, 0.5, 0.0)),
            Category::Airports => (10.0, Below(0.4), OpacityCurve::new(0.1, 1.0, 0.4, 0.0)),
            Category::NavLines => (90.0, Above(0.5), OpacityCurve::new(0.5, 0.0, 0.8, 1.0)),
        };
        CategoryRules {
            coarse_radius_deg,
            band,
            opacity,
            always_in_navigation: self == Category::NavLines,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Borders => "borders",
            Category::Cities => "cities",
            Category::Capitals => "capitals",
            Category::Rivers => "rivers",
            Category::Lakes => "lakes",
            Category::Peaks => "peaks",
            Category::Volcanoes => "volcanoes",
            Category::Airports => "airports",
            Category::NavLines => "nav_lines",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Alternate map presentation chosen by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapMode {
    #[default]
    Standard,
    /// Navigation overlay: nav lines are always drawn at full opacity.
    Navigation,
}

/// Range of altitude blend in which a category is drawn at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AltitudeBand {
    Always,
    /// Drawn while the blend is strictly below the threshold.
    Below(f64),
    /// Drawn while the blend is strictly above the threshold.
    Above(f64),
}

impl AltitudeBand {
    /// A NaN blend is outside every bounded band.
    pub fn contains(self, blend: f64) -> bool {
        match self {
            AltitudeBand::Always => true,
            AltitudeBand::Below(x) => blend < x,
            AltitudeBand::Above(x) => blend > x,
        }
    }
}

/// Linear ramp from `(x0, y0)` to `(x1, y1)`, flat outside that range and
/// clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityCurve {
    pub x0: f64,
    pub y0: f32,
    pub x1: f64,
    pub y1: f32,
}

impl OpacityCurve {
    pub const fn new(x0: f64, y0: f32, x1: f64, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub fn eval(&self, x: f64) -> f32 {
        if x.is_nan() {
            return 0.0;
        }
        let span = self.x1 - self.x0;
        let t = if span.abs() <= f64::EPSILON {
            if x < self.x0 { 0.0 } else { 1.0 }
        } else {
            ((x - self.x0) / span).clamp(0.0, 1.0)
        };
        let y = self.y0 + (self.y1 - self.y0) * t as f32;
        if y.is_nan() { 0.0 } else { y.clamp(0.0, 1.0) }
    }
}

/// Per-category constants consumed by the generic culling routine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryRules {
    /// Half-width, in degrees, of the square around the craft outside which
    /// features are skipped before projection.
    pub coarse_radius_deg: f64,
    pub band: AltitudeBand,
    pub opacity: OpacityCurve,
    /// Ignore the band and draw fully opaque in [`MapMode::Navigation`].
    pub always_in_navigation: bool,
}

impl CategoryRules {
    pub fn is_active(&self, blend: f64, mode: MapMode) -> bool {
        (self.always_in_navigation && mode == MapMode::Navigation) || self.band.contains(blend)
    }

    pub fn opacity_at(&self, blend: f64, mode: MapMode) -> f32 {
        if self.always_in_navigation && mode == MapMode::Navigation {
            1.0
        } else {
            self.opacity.eval(blend)
        }
    }
}
