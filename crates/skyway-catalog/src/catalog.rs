//! Immutable feature catalog and RON loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::feature::{Feature, KindTag};

/// Border rings with fewer points than this are treated as slivers and
/// dropped at load time.
pub const MIN_RING_POINTS: usize = 4;

/// On-disk catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogFile {
    pub features: Vec<Feature>,
}

/// Read-only collection of features grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    by_kind: [Vec<Feature>; KindTag::COUNT],
    rejected: usize,
}

impl FeatureCatalog {
    /// Build a catalog, sanitizing every entry. Invalid entries are dropped
    /// with a warning and counted in [`rejected`](Self::rejected).
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut catalog = Self::default();
        for feature in features {
            let name = feature.name.clone();
            match feature.sanitized(MIN_RING_POINTS) {
                Some(clean) => catalog.by_kind[clean.tag().index()].push(clean),
                None => {
                    log::warn!("Dropping catalog feature {name:?}: degenerate geometry");
                    catalog.rejected += 1;
                }
            }
        }
        catalog
    }

    /// Parse a RON [`CatalogFile`] document.
    pub fn from_ron_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = ron::from_str(source).map_err(CatalogError::ParseError)?;
        Ok(Self::new(file.features))
    }

    /// Load a RON catalog from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(CatalogError::ReadError)?;
        let catalog = Self::from_ron_str(&contents)?;
        log::info!(
            "Loaded {} catalog features from {} ({} rejected)",
            catalog.len(),
            path.display(),
            catalog.rejected
        );
        Ok(catalog)
    }

    /// Features of one kind, in load order.
    pub fn of_kind(&self, tag: KindTag) -> &[Feature] {
        &self.by_kind[tag.index()]
    }

    /// Total number of accepted features.
    pub fn len(&self) -> usize {
        self.by_kind.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries dropped during construction.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Iterate over every feature, grouped by kind.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.by_kind.iter().flatten()
    }
}
