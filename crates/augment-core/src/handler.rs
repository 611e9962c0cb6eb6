//! Item handler surface
//!
//! The host engine dispatches "use item" to handlers registered per item id.
//! [`AutoAugment`] registers itself for every configured catalyst.

use crate::config::AugmentConfig;
use crate::coordinator::AutoAugment;
use crate::engine::Collaborators;
use crate::error::EngineError;
use crate::types::{Actor, CatalystRef, ItemId};
use std::path::Path;
use std::sync::Arc;

/// Handler invoked when an actor uses an item
#[async_trait::async_trait]
pub trait ItemHandler: Send + Sync {
    /// Item ids this handler wants to receive
    fn item_ids(&self) -> Vec<ItemId>;

    /// Handle one use; `false` lets the engine fall through to other handlers
    async fn use_item(&self, actor: Actor, item: CatalystRef, force_use: bool) -> bool;
}

/// Host-side registry of item handlers
pub trait ItemHandlerRegistry: Send + Sync {
    /// Register a handler for one item id
    ///
    /// # Errors
    /// Returns `EngineError` if the host refuses the registration
    fn register(&self, item: ItemId, handler: Arc<dyn ItemHandler>) -> Result<(), EngineError>;
}

#[async_trait::async_trait]
impl ItemHandler for AutoAugment {
    fn item_ids(&self) -> Vec<ItemId> {
        self.config().catalysts.iter().copied().collect()
    }

    async fn use_item(&self, actor: Actor, item: CatalystRef, _force_use: bool) -> bool {
        self.use_catalyst(actor, item).await.outcome.handled()
    }
}

impl AutoAugment {
    /// Load configuration, build the workflow and register it
    ///
    /// Configuration problems fall back to defaults. A refused registration
    /// is logged and skipped; the remaining ids are still registered.
    #[must_use]
    pub fn on_load(
        config_path: impl AsRef<Path>,
        collaborators: Collaborators,
        registry: &dyn ItemHandlerRegistry,
    ) -> Self {
        let config = AugmentConfig::load_or_default(config_path);
        let workflow = Self::new(config, collaborators);
        let registered = workflow.register(registry);

        tracing::info!(
            catalysts = workflow.config().catalysts.len(),
            registered,
            credit_mode = workflow.config().credit_mode,
            confirm = workflow.config().confirm.enabled,
            "Auto-augment loaded"
        );
        workflow
    }

    /// Register this workflow for every configured catalyst, returning how
    /// many registrations the host accepted
    pub fn register(&self, registry: &dyn ItemHandlerRegistry) -> usize {
        let handler: Arc<dyn ItemHandler> = Arc::new(self.clone());
        handler
            .item_ids()
            .into_iter()
            .filter(|id| match registry.register(*id, Arc::clone(&handler)) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(item = %id, "Handler registration failed: {}", e);
                    false
                }
            })
            .count()
    }
}
