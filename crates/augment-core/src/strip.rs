//! Augment removal
//!
//! Tries the engine's official cancel-refine first (the actor pays the usual
//! fee). If the engine leaves the item augmented, falls back to a forced
//! reset: unequip, zero both slots, persist, re-equip, refresh the client.
//! Never fails outward; the outcome only reports which path ran.

use crate::engine::{contained, Inventory, RefineEngine};
use crate::notify::Outbox;
use crate::types::{ActorId, ObjectId, Variation};
use std::sync::Arc;

/// Which removal path ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripOutcome {
    /// Nothing to remove, no calls made
    AlreadyClean,
    /// Official cancel-refine cleared the item
    Cancelled,
    /// Forced reset cleared the item
    Forced,
    /// Item still augmented after both paths
    Incomplete,
    /// Item not found in the actor's inventory
    Missing,
}

impl StripOutcome {
    /// Whether the item is known to be clean afterwards
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::AlreadyClean | Self::Cancelled | Self::Forced)
    }
}

/// Removes an existing augment from an item
#[derive(Clone)]
pub struct StripOperator {
    inventory: Arc<dyn Inventory>,
    engine: Arc<dyn RefineEngine>,
    outbox: Outbox,
}

impl StripOperator {
    /// Create strip operator
    #[inline]
    #[must_use]
    pub fn new(inventory: Arc<dyn Inventory>, engine: Arc<dyn RefineEngine>, outbox: Outbox) -> Self {
        Self {
            inventory,
            engine,
            outbox,
        }
    }

    /// Remove the item's augment if it has one
    pub async fn strip_if_present(&self, actor: ActorId, object: ObjectId) -> StripOutcome {
        let Some(item) = self.inventory.item(actor, object) else {
            return StripOutcome::Missing;
        };
        if !item.variation.is_augmented() {
            return StripOutcome::AlreadyClean;
        }

        if let Err(e) = contained(self.engine.cancel_refine(actor, object)).await {
            tracing::debug!(%actor, %object, "Cancel-refine failed: {}", e);
        }

        let Some(item) = self.inventory.item(actor, object) else {
            return StripOutcome::Missing;
        };
        if !item.variation.is_augmented() {
            self.outbox.refresh_item(actor, object);
            return StripOutcome::Cancelled;
        }

        tracing::warn!(
            %actor,
            %object,
            variation = %item.variation,
            "Engine kept the augment, forcing reset"
        );
        self.force_reset(actor, object, item.equipped);

        match self.inventory.item(actor, object) {
            Some(item) if !item.variation.is_augmented() => StripOutcome::Forced,
            Some(item) => {
                tracing::warn!(%actor, %object, variation = %item.variation, "Forced reset did not stick");
                StripOutcome::Incomplete
            }
            None => StripOutcome::Missing,
        }
    }

    fn force_reset(&self, actor: ActorId, object: ObjectId, was_equipped: bool) {
        if was_equipped {
            if let Err(e) = self.inventory.unequip(actor, object) {
                tracing::debug!(%actor, %object, "Unequip before reset failed: {}", e);
            }
        }

        if let Err(e) = self.inventory.write_variation(object, Variation::EMPTY) {
            tracing::warn!(%actor, %object, "Variation reset failed: {}", e);
        }
        if let Err(e) = self.inventory.persist(object) {
            tracing::warn!(%actor, %object, "Persist after reset failed: {}", e);
        }

        if was_equipped {
            if let Err(e) = self.inventory.equip(actor, object) {
                tracing::warn!(%actor, %object, "Re-equip after reset failed: {}", e);
            }
        }

        self.outbox.refresh_item(actor, object);
        self.outbox
            .refresh_shortcuts(self.inventory.as_ref(), actor, object);
    }
}

impl std::fmt::Debug for StripOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripOperator").finish_non_exhaustive()
    }
}
