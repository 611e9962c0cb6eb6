//! Fee lookup
//!
//! Thin view over [`RecipeSource`]. A missing recipe is an expected outcome
//! (the catalyst does not fit this item), never a fault.

use crate::engine::RecipeSource;
use crate::types::{ItemId, Recipe};
use std::sync::Arc;

/// Resolves the material fee for (item type, catalyst)
#[derive(Clone)]
pub struct FeeResolver {
    recipes: Arc<dyn RecipeSource>,
}

impl FeeResolver {
    /// Create resolver over recipe data
    #[inline]
    #[must_use]
    pub fn new(recipes: Arc<dyn RecipeSource>) -> Self {
        Self { recipes }
    }

    /// Recipe for this catalyst on this item type
    #[must_use]
    pub fn resolve(&self, item: ItemId, catalyst: ItemId) -> Option<Recipe> {
        self.recipes
            .recipes_for(item)
            .into_iter()
            .find(|r| r.catalyst == catalyst)
    }

    /// Whether any catalyst applies to this item type
    #[must_use]
    pub fn has_recipes(&self, item: ItemId) -> bool {
        !self.recipes.recipes_for(item).is_empty()
    }
}

impl std::fmt::Debug for FeeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeResolver").finish_non_exhaustive()
    }
}
