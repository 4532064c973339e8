//! Static geographic feature catalogs.
//!
//! Catalog data is supplied from outside the flight core and never mutated
//! by it. Every entry is a tagged [`Feature`] so one culling routine can
//! handle all feature kinds.

mod catalog;
mod error;
mod feature;

pub use catalog::{CatalogFile, FeatureCatalog, MIN_RING_POINTS};
pub use error::CatalogError;
pub use feature::{Feature, FeatureKind, KindTag};
