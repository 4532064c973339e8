//! Per-frame culling and render-budget pipeline.
//!
//! Every feature category runs the same steps independently:
//!
//! 1. **Coarse filter**: drop features outside a category-specific square
//!    radius around the craft.
//! 2. **Project**: ask the injected [`ViewportProjector`] for a screen
//!    position and drop occluded or off-viewport candidates.
//! 3. **Rank**: squared distance from the viewport centre.
//! 4. **Truncate**: keep the `N` closest, where `N` comes from the
//!    platform's [`RenderBudget`].
//! 5. **Opacity**: an altitude-driven visibility scalar in `[0, 1]`.
//!
//! Failures stay inside their category. A bad candidate is skipped; a
//! failing camera or a panic empties the category for one frame and is
//! reported to the [`ErrorSink`].

mod budget;
mod category;
mod pipeline;
mod projector;
mod sink;

pub use budget::{Platform, RenderBudget};
pub use category::{AltitudeBand, Category, CategoryRules, MapMode, OpacityCurve};
pub use pipeline::{
    CategoryOutput, CullInput, CullStats, FeatureCandidate, RenderFrame, cull_category,
    render_category, render_frame, truncate_to_budget,
};
pub use projector::{OrthographicGlobe, ProjectError, Projection, Viewport, ViewportProjector};
pub use sink::{ErrorReport, ErrorSink, FrameContext};
