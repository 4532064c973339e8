//! The generic per-category culling routine and the frame driver around it.

use std::any::Any;
use std::cmp::Ordering;
use std::ops::AddAssign;
use std::panic::{self, AssertUnwindSafe};

use glam::Vec2;
use skyway_catalog::{Feature, FeatureCatalog};
use skyway_flight::CraftState;
use skyway_geodesy::GeoPoint;

use crate::budget::RenderBudget;
use crate::category::{Category, MapMode};
use crate::projector::{ProjectError, Projection, Viewport, ViewportProjector};
use crate::sink::{ErrorSink, FrameContext};

/// A feature that survived culling this frame, ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureCandidate {
    /// Position in the catalog's list for the category's kind.
    pub index: usize,
    /// Representative world point (the feature anchor).
    pub world: GeoPoint,
    /// Screen position used for ranking.
    pub screen: Vec2,
    /// Squared pixel distance from the viewport centre.
    pub distance_sq: f32,
    /// Projected vertices of shape features. `None` marks an occluded
    /// vertex or the end of a polyline; empty for point features.
    pub path: Vec<Option<Vec2>>,
}

impl FeatureCandidate {
    /// Pixel distance from the viewport centre.
    pub fn distance(&self) -> f32 {
        self.distance_sq.sqrt()
    }
}

/// Counters for one category, or a whole frame once merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CullStats {
    pub considered: usize,
    pub coarse_rejected: usize,
    pub occluded: usize,
    pub off_screen: usize,
    /// Candidates skipped because their projection failed.
    pub failed: usize,
    /// Candidates cut by the render budget.
    pub truncated: usize,
    pub kept: usize,
    /// Categories that rendered nothing because the loop itself failed.
    pub failed_categories: usize,
}

impl AddAssign for CullStats {
    fn add_assign(&mut self, rhs: Self) {
        self.considered += rhs.considered;
        self.coarse_rejected += rhs.coarse_rejected;
        self.occluded += rhs.occluded;
        self.off_screen += rhs.off_screen;
        self.failed += rhs.failed;
        self.truncated += rhs.truncated;
        self.kept += rhs.kept;
        self.failed_categories += rhs.failed_categories;
    }
}

/// Read-only frame state shared by every category.
#[derive(Clone, Copy, Debug)]
pub struct CullInput<'a> {
    pub craft: &'a CraftState,
    pub viewport: Viewport,
    pub map_mode: MapMode,
    pub budget: &'a RenderBudget,
    pub frame: u64,
}

/// Result of one category for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryOutput {
    pub category: Category,
    /// `false` when the altitude band (or map mode) hides the category.
    pub active: bool,
    /// Visibility scalar in `[0, 1]`.
    pub opacity: f32,
    /// Kept candidates, closest to the viewport centre first.
    pub candidates: Vec<FeatureCandidate>,
    pub stats: CullStats,
}

impl CategoryOutput {
    fn empty(category: Category, active: bool, opacity: f32) -> Self {
        Self {
            category,
            active,
            opacity,
            candidates: Vec::new(),
            stats: CullStats::default(),
        }
    }
}

/// Everything the renderer needs for one frame. Owns its data so it can
/// outlive the catalog borrow it was built from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    pub frame: u64,
    /// One entry per category, in [`Category::ALL`] order.
    pub categories: Vec<CategoryOutput>,
    pub stats: CullStats,
}

impl RenderFrame {
    pub fn category(&self, category: Category) -> Option<&CategoryOutput> {
        self.categories.get(category.index())
    }
}

fn by_distance(a: &FeatureCandidate, b: &FeatureCandidate) -> Ordering {
    a.distance_sq
        .total_cmp(&b.distance_sq)
        .then(a.index.cmp(&b.index))
}

/// Keep the `budget` candidates closest to the viewport centre, sorted
/// ascending by distance.
pub fn truncate_to_budget(candidates: &mut Vec<FeatureCandidate>, budget: usize) {
    if budget == 0 {
        candidates.clear();
        return;
    }
    if candidates.len() > budget {
        candidates.select_nth_unstable_by(budget - 1, by_distance);
        candidates.truncate(budget);
    }
    candidates.sort_unstable_by(by_distance);
}

enum Placement {
    Kept { screen: Vec2, path: Vec<Option<Vec2>> },
    Occluded,
    OffScreen,
}

/// Project one feature. Shape features whose anchor is not on screen are
/// still kept when one of their vertices is, ranked by the vertex nearest
/// the centre.
fn place(
    feature: &Feature,
    anchor: GeoPoint,
    projector: &dyn ViewportProjector,
    viewport: &Viewport,
) -> Result<Placement, ProjectError> {
    let anchor_projection = projector.project(anchor)?;

    let mut path = Vec::new();
    if feature.is_shape() {
        let mut camera_error = None;
        feature.visit_polylines(|line| {
            if camera_error.is_some() {
                return;
            }
            for &vertex in line {
                match projector.project(vertex) {
                    Ok(Projection::Visible(p)) => path.push(Some(p)),
                    Ok(Projection::Occluded) | Err(ProjectError::Candidate { .. }) => {
                        path.push(None)
                    }
                    Err(err) => {
                        camera_error = Some(err);
                        return;
                    }
                }
            }
            path.push(None);
        });
        if let Some(err) = camera_error {
            return Err(err);
        }
    }

    let center = viewport.center();
    let screen = match anchor_projection {
        Projection::Visible(p) if viewport.contains(p) => Some(p),
        _ => path
            .iter()
            .flatten()
            .copied()
            .filter(|p| viewport.contains(*p))
            .min_by(|a, b| {
                a.distance_squared(center)
                    .total_cmp(&b.distance_squared(center))
            }),
    };

    Ok(match screen {
        Some(screen) => Placement::Kept { screen, path },
        None => {
            let any_visible = matches!(anchor_projection, Projection::Visible(_))
                || path.iter().any(Option::is_some);
            if any_visible {
                Placement::OffScreen
            } else {
                Placement::Occluded
            }
        }
    })
}

/// Cull, project, rank and truncate one category.
///
/// `features` is the catalog list for `category.kind()`. A
/// [`ProjectError::Candidate`] skips that one feature; a
/// [`ProjectError::Camera`] aborts the whole category.
pub fn cull_category(
    category: Category,
    features: &[Feature],
    projector: &dyn ViewportProjector,
    input: &CullInput<'_>,
    stats: &mut CullStats,
) -> Result<Vec<FeatureCandidate>, ProjectError> {
    let rules = category.rules();
    let craft_position = input.craft.position;
    let screen_center = input.viewport.center();
    let mut candidates = Vec::new();

    for (index, feature) in features.iter().enumerate() {
        if !category.accepts(feature) {
            continue;
        }
        stats.considered += 1;

        let near = if feature.is_shape() {
            feature
                .bounds()
                .intersects_square(craft_position, rules.coarse_radius_deg)
        } else {
            feature
                .anchor()
                .within_square(craft_position, rules.coarse_radius_deg)
        };
        if !near {
            stats.coarse_rejected += 1;
            continue;
        }

        let world = feature.anchor();
        match place(feature, world, projector, &input.viewport) {
            Ok(Placement::Kept { screen, path }) => candidates.push(FeatureCandidate {
                index,
                world,
                screen,
                distance_sq: screen.distance_squared(screen_center),
                path,
            }),
            Ok(Placement::Occluded) => stats.occluded += 1,
            Ok(Placement::OffScreen) => stats.off_screen += 1,
            Err(err @ ProjectError::Candidate { .. }) => {
                stats.failed += 1;
                tracing::trace!(%category, feature = %feature.name, "skipping candidate: {err}");
            }
            Err(err) => return Err(err),
        }
    }

    let before = candidates.len();
    truncate_to_budget(&mut candidates, input.budget.limit(category));
    stats.truncated += before - candidates.len();
    stats.kept += candidates.len();
    Ok(candidates)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run one category behind its failure boundary.
///
/// Camera errors and panics inside the loop are reported once to `sink`
/// and leave the category empty for this frame. Nothing propagates.
pub fn render_category(
    category: Category,
    catalog: &FeatureCatalog,
    projector: &dyn ViewportProjector,
    input: &CullInput<'_>,
    sink: &ErrorSink,
) -> CategoryOutput {
    let rules = category.rules();
    let blend = input.craft.altitude_blend;
    let active = rules.is_active(blend, input.map_mode);
    let mut output = CategoryOutput::empty(category, active, rules.opacity_at(blend, input.map_mode));
    if !active {
        return output;
    }

    let features = catalog.of_kind(category.kind());
    let mut stats = CullStats::default();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        cull_category(category, features, projector, input, &mut stats)
    }));

    let context = FrameContext {
        frame: input.frame,
        category,
    };
    // A failed category discards its partial counts along with its work.
    let failed = CullStats {
        failed_categories: 1,
        ..CullStats::default()
    };
    output.stats = match result {
        Ok(Ok(candidates)) => {
            output.candidates = candidates;
            stats
        }
        Ok(Err(err)) => {
            tracing::debug!(%context, "category dropped for this frame: {err}");
            sink.report(&err, context);
            failed
        }
        Err(payload) => {
            let message = format!("panic in culling loop: {}", panic_message(payload.as_ref()));
            tracing::debug!(%context, "{message}");
            sink.report(&message, context);
            failed
        }
    };
    output
}

/// Run every category independently for one frame.
pub fn render_frame(
    catalog: &FeatureCatalog,
    projector: &dyn ViewportProjector,
    input: &CullInput<'_>,
    sink: &ErrorSink,
) -> RenderFrame {
    let mut frame = RenderFrame {
        frame: input.frame,
        categories: Vec::with_capacity(Category::COUNT),
        stats: CullStats::default(),
    };
    for category in Category::ALL {
        let output = render_category(category, catalog, projector, input, sink);
        frame.stats += output.stats;
        frame.categories.push(output);
    }
    tracing::trace!(frame = frame.frame, stats = ?frame.stats, "frame culled");
    frame
}
