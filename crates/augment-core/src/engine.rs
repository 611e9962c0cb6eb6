//! External collaborator boundary
//!
//! The workflow owns no item state. Everything it reads or mutates goes
//! through these traits, implemented by the host game server:
//! - [`Inventory`] for counts, lookups, equip state and direct writes
//! - [`RefineEngine`] for the official refine / cancel-refine operations
//! - [`RecipeSource`] and [`OptionCatalog`] for read-only data
//! - [`Notifier`] and [`ConfirmationTransport`] for the actor's client

use crate::error::{EngineError, NotifyError};
use crate::types::{
    ActorId, Answer, ConfirmPrompt, ItemId, ItemSnapshot, ObjectId, OptionId, PaperdollSlot,
    Recipe, Shortcut, SystemNotice, Variation,
};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Inventory queries and low-level mutations
pub trait Inventory: Send + Sync {
    /// Item worn in a paperdoll slot
    fn paperdoll(&self, actor: ActorId, slot: PaperdollSlot) -> Option<ItemSnapshot>;

    /// Item instance in the actor's inventory
    fn item(&self, actor: ActorId, object: ObjectId) -> Option<ItemSnapshot>;

    /// Total count of an item template held by the actor
    fn count_of(&self, actor: ActorId, item: ItemId) -> u64;

    /// Stack instance of a stackable template the actor holds right now
    fn stack_of(&self, actor: ActorId, item: ItemId) -> Option<ObjectId>;

    /// Equip an item instance
    fn equip(&self, actor: ActorId, object: ObjectId) -> Result<(), EngineError>;

    /// Unequip an item instance
    fn unequip(&self, actor: ActorId, object: ObjectId) -> Result<(), EngineError>;

    /// Overwrite both modifier slots without going through the engine
    fn write_variation(&self, object: ObjectId, variation: Variation) -> Result<(), EngineError>;

    /// Persist an item instance
    fn persist(&self, object: ObjectId) -> Result<(), EngineError>;

    /// Add items silently (no client message)
    fn grant(&self, actor: ActorId, item: ItemId, count: u64) -> Result<(), EngineError>;

    /// Destroy items by template
    fn destroy(&self, actor: ActorId, item: ItemId, count: u64) -> Result<(), EngineError>;

    /// Quick-access bindings of the actor
    fn shortcuts(&self, actor: ActorId) -> Vec<Shortcut>;
}

/// The engine's refine operations
///
/// Return values are advisory. Success is judged by observing inventory
/// state before and after the call.
#[async_trait::async_trait]
pub trait RefineEngine: Send + Sync {
    /// Apply a catalyst and material fee to an item
    async fn refine(
        &self,
        actor: ActorId,
        item: ObjectId,
        catalyst: ObjectId,
        material: ItemId,
        material_count: u64,
    ) -> Result<(), EngineError>;

    /// Remove an item's augment through the official (paying) path
    async fn cancel_refine(&self, actor: ActorId, item: ObjectId) -> Result<(), EngineError>;
}

/// Recipe data: which catalysts apply to an item type, and at what fee
pub trait RecipeSource: Send + Sync {
    /// All recipes for an item template (empty when the item has no group)
    fn recipes_for(&self, item: ItemId) -> Vec<Recipe>;
}

/// Read-only capability view of a modifier option template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionTraits {
    /// Number of skills granted
    pub skills: usize,
    /// Number of chance triggers
    pub triggers: usize,
    /// Textual rendering of the template
    pub description: String,
}

impl OptionTraits {
    /// Whether the option grants any skill
    #[inline]
    #[must_use]
    pub fn has_skills(&self) -> bool {
        self.skills > 0
    }

    /// Whether the option carries any trigger
    #[inline]
    #[must_use]
    pub fn has_triggers(&self) -> bool {
        self.triggers > 0
    }
}

/// Modifier option template lookup
pub trait OptionCatalog: Send + Sync {
    /// Traits of an option, `None` when unknown
    fn traits(&self, option: OptionId) -> Option<OptionTraits>;
}

/// Client-facing notifications
pub trait Notifier: Send + Sync {
    /// Chat line to the actor
    fn message(&self, actor: ActorId, text: &str) -> Result<(), NotifyError>;

    /// Built-in system notice
    fn notice(&self, actor: ActorId, notice: SystemNotice) -> Result<(), NotifyError>;

    /// Inventory delta for one item
    fn inventory_update(&self, actor: ActorId, item: ObjectId) -> Result<(), NotifyError>;

    /// Re-send one shortcut binding
    fn shortcut_register(&self, actor: ActorId, shortcut: &Shortcut) -> Result<(), NotifyError>;
}

/// Yes/no dialog transport
///
/// The transport owns `reply` until the actor answers. Dropping it without
/// sending counts as "no".
pub trait ConfirmationTransport: Send + Sync {
    /// Show a prompt and register the continuation
    fn ask(
        &self,
        actor: ActorId,
        prompt: &ConfirmPrompt,
        reply: oneshot::Sender<Answer>,
    ) -> Result<(), NotifyError>;
}

/// Bundle of collaborator handles wired into the workflow
#[derive(Clone)]
pub struct Collaborators {
    /// Inventory access
    pub inventory: Arc<dyn Inventory>,
    /// Refine engine
    pub engine: Arc<dyn RefineEngine>,
    /// Recipe data
    pub recipes: Arc<dyn RecipeSource>,
    /// Option templates
    pub options: Arc<dyn OptionCatalog>,
    /// Client notifications
    pub notifier: Arc<dyn Notifier>,
    /// Confirmation dialogs
    pub prompts: Arc<dyn ConfirmationTransport>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Run an engine call, turning a panic into [`EngineError::Panicked`]
pub(crate) async fn contained<F>(call: F) -> Result<(), EngineError>
where
    F: Future<Output = Result<(), EngineError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(EngineError::Panicked(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_traits_capabilities() {
        let plain = OptionTraits::default();
        assert!(!plain.has_skills());
        assert!(!plain.has_triggers());

        let skilled = OptionTraits {
            skills: 1,
            ..OptionTraits::default()
        };
        assert!(skilled.has_skills());
    }

    #[tokio::test]
    async fn contained_passes_results_through() {
        assert_eq!(contained(async { Ok(()) }).await, Ok(()));
        assert_eq!(
            contained(async { Err(EngineError::Refused("no".into())) }).await,
            Err(EngineError::Refused("no".into()))
        );
    }

    #[tokio::test]
    async fn contained_maps_panics() {
        let result = contained(async {
            if true {
                panic!("engine exploded");
            }
            Ok(())
        })
        .await;
        assert_eq!(result, Err(EngineError::Panicked("engine exploded".into())));
    }
}
