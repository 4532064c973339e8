//! Tagged catalog entries.

use serde::{Deserialize, Serialize};
use skyway_geodesy::{GeoBounds, GeoPoint, destination, haversine_distance_rad, initial_bearing_rad};

/// Discriminant of a [`FeatureKind`], usable as a table index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KindTag {
    Border,
    City,
    River,
    Lake,
    Peak,
    Volcano,
    Airport,
    NavLine,
}

impl KindTag {
    /// Number of kinds.
    pub const COUNT: usize = 8;

    /// Every kind, in table order.
    pub const ALL: [KindTag; Self::COUNT] = [
        KindTag::Border,
        KindTag::City,
        KindTag::River,
        KindTag::Lake,
        KindTag::Peak,
        KindTag::Volcano,
        KindTag::Airport,
        KindTag::NavLine,
    ];

    /// Position in [`KindTag::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Kind-specific payload of a catalog feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Country outline as one or more closed rings.
    Border {
        code: String,
        rings: Vec<Vec<GeoPoint>>,
    },
    City {
        position: GeoPoint,
        #[serde(default)]
        capital: bool,
        #[serde(default)]
        population: u64,
    },
    River {
        path: Vec<GeoPoint>,
    },
    Lake {
        position: GeoPoint,
    },
    Peak {
        position: GeoPoint,
        #[serde(default)]
        elevation_m: f32,
    },
    Volcano {
        position: GeoPoint,
        #[serde(default)]
        elevation_m: f32,
    },
    Airport {
        position: GeoPoint,
        #[serde(default)]
        iata: String,
    },
    /// Great-circle navigation leg between two fixes.
    NavLine {
        from: GeoPoint,
        to: GeoPoint,
    },
}

/// A named catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
}

impl Feature {
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn tag(&self) -> KindTag {
        match self.kind {
            FeatureKind::Border { .. } => KindTag::Border,
            FeatureKind::City { .. } => KindTag::City,
            FeatureKind::River { .. } => KindTag::River,
            FeatureKind::Lake { .. } => KindTag::Lake,
            FeatureKind::Peak { .. } => KindTag::Peak,
            FeatureKind::Volcano { .. } => KindTag::Volcano,
            FeatureKind::Airport { .. } => KindTag::Airport,
            FeatureKind::NavLine { .. } => KindTag::NavLine,
        }
    }

    /// `true` for cities flagged as national capitals.
    pub fn is_capital(&self) -> bool {
        matches!(self.kind, FeatureKind::City { capital: true, .. })
    }

    /// Single representative point used for ranking: the position of point
    /// features, the bounding-box centre of outlines and rivers, and the
    /// great-circle midpoint of nav lines.
    pub fn anchor(&self) -> GeoPoint {
        match &self.kind {
            FeatureKind::City { position, .. }
            | FeatureKind::Lake { position }
            | FeatureKind::Peak { position, .. }
            | FeatureKind::Volcano { position, .. }
            | FeatureKind::Airport { position, .. } => *position,
            FeatureKind::Border { .. } | FeatureKind::River { .. } => self.bounds().center(),
            FeatureKind::NavLine { from, to } => {
                let half = haversine_distance_rad(*from, *to) * 0.5;
                destination(*from, initial_bearing_rad(*from, *to), half)
            }
        }
    }

    /// Bounding box for the coarse proximity filter.
    pub fn bounds(&self) -> GeoBounds {
        match &self.kind {
            FeatureKind::Border { rings, .. } => GeoBounds::from_points(rings.iter().flatten())
                .unwrap_or_else(|| GeoBounds::point(GeoPoint::default())),
            FeatureKind::River { path } => GeoBounds::from_points(path)
                .unwrap_or_else(|| GeoBounds::point(GeoPoint::default())),
            FeatureKind::NavLine { from, to } => {
                GeoBounds::from_points([from, to]).unwrap_or(GeoBounds::point(*from))
            }
            _ => GeoBounds::point(self.anchor()),
        }
    }

    /// Call `f` once per polyline of a shape feature (each border ring, the
    /// river path, the nav leg). Point features have no polylines.
    pub fn visit_polylines(&self, mut f: impl FnMut(&[GeoPoint])) {
        match &self.kind {
            FeatureKind::Border { rings, .. } => rings.iter().for_each(|r| f(r.as_slice())),
            FeatureKind::River { path } => f(path.as_slice()),
            FeatureKind::NavLine { from, to } => f(&[*from, *to]),
            _ => {}
        }
    }

    /// `true` when the feature is drawn as lines rather than a marker.
    pub fn is_shape(&self) -> bool {
        matches!(
            self.kind,
            FeatureKind::Border { .. } | FeatureKind::River { .. } | FeatureKind::NavLine { .. }
        )
    }

    /// Every coordinate the feature carries.
    fn points_mut(&mut self) -> Vec<&mut GeoPoint> {
        match &mut self.kind {
            FeatureKind::Border { rings, .. } => rings.iter_mut().flatten().collect(),
            FeatureKind::River { path } => path.iter_mut().collect(),
            FeatureKind::NavLine { from, to } => vec![from, to],
            FeatureKind::City { position, .. }
            | FeatureKind::Lake { position }
            | FeatureKind::Peak { position, .. }
            | FeatureKind::Volcano { position, .. }
            | FeatureKind::Airport { position, .. } => vec![position],
        }
    }

    /// Validate and normalize a feature read from external data.
    ///
    /// Returns `None` when any coordinate is non-finite, when a river has
    /// fewer than two points, or when a border keeps no ring after rings
    /// shorter than `min_ring_points` are dropped.
    pub fn sanitized(mut self, min_ring_points: usize) -> Option<Self> {
        for p in self.points_mut() {
            if !p.is_finite() {
                return None;
            }
            *p = p.normalized();
        }

        match &mut self.kind {
            FeatureKind::Border { rings, .. } => {
                rings.retain(|r| r.len() >= min_ring_points);
                if rings.is_empty() {
                    return None;
                }
            }
            FeatureKind::River { path } if path.len() < 2 => return None,
            _ => {}
        }
        Some(self)
    }
}
