//! Platform-specific per-category render budgets.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Host class. Constrained hosts (browsers, low-end mobile) get smaller
/// budgets to leave frame-time headroom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    Native,
    Constrained,
}

/// Maximum number of features drawn per category in one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderBudget {
    limits: [usize; Category::COUNT],
}

impl RenderBudget {
    /// Default budgets for a platform, indexed like [`Category::ALL`].
    pub fn for_platform(platform: Platform) -> Self {
        let limits = match platform {
            Platform::Native => [200, 120, 60, 80, 60, 50, 40, 60, 40],
            Platform::Constrained => [80, 40, 30, 30, 20, 20, 15, 25, 20],
        };
        Self { limits }
    }

    /// Platform defaults with selected categories replaced.
    #[must_use]
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a Category, &'a usize)>,
    ) -> Self {
        for (category, limit) in overrides {
            self.set_limit(*category, *limit);
        }
        self
    }

    pub fn limit(&self, category: Category) -> usize {
        self.limits[category.index()]
    }

    pub fn set_limit(&mut self, category: Category, limit: usize) {
        self.limits[category.index()] = limit;
    }
}

impl Default for RenderBudget {
    fn default() -> Self {
        Self::for_platform(Platform::Native)
    }
}
