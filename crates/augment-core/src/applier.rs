//! Transactional apply with credit compensation
//!
//! The engine's refine is opaque: it may accept the call and do nothing. The
//! applier therefore records a baseline, optionally advances missing
//! material on credit, calls the engine, and judges success only from
//! observable state. Any advance that was not consumed by a successful
//! apply is destroyed again.
//!
//! # Invariant
//!
//! On every failure path the actor's material count returns to its value
//! before the advance. Reversal never removes more than was advanced, and
//! never more than is still present above the pre-advance baseline.

use crate::engine::{contained, Inventory, RefineEngine};
use crate::error::{ApplyError, RejectReason};
use crate::fee::FeeResolver;
use crate::notify::Outbox;
use crate::strip::StripOperator;
use crate::types::{ActorId, CatalystRef, ItemId, ObjectId, Recipe, SystemNotice, Variation};
use std::sync::Arc;

/// Successful apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Recipe charged
    pub recipe: Recipe,
    /// Slots before the engine call
    pub before: Variation,
    /// Slots after the engine call
    pub after: Variation,
    /// Material advanced on credit (and consumed)
    pub advanced: u64,
}

/// Refine with baseline comparison and credit reconciliation
#[derive(Clone)]
pub struct TransactionalApplier {
    inventory: Arc<dyn Inventory>,
    engine: Arc<dyn RefineEngine>,
    fees: FeeResolver,
    strip: StripOperator,
    outbox: Outbox,
    credit_mode: bool,
}

impl TransactionalApplier {
    /// Create applier
    #[must_use]
    pub fn new(
        inventory: Arc<dyn Inventory>,
        engine: Arc<dyn RefineEngine>,
        fees: FeeResolver,
        strip: StripOperator,
        outbox: Outbox,
    ) -> Self {
        Self {
            inventory,
            engine,
            fees,
            strip,
            outbox,
            credit_mode: false,
        }
    }

    /// With credit mode
    #[inline]
    #[must_use]
    pub fn with_credit_mode(mut self, enabled: bool) -> Self {
        self.credit_mode = enabled;
        self
    }

    /// Apply a catalyst to an item
    ///
    /// # Errors
    /// - `ApplyError::ItemUnavailable` if the item is gone
    /// - `ApplyError::RecipeNotAllowed` if the catalyst does not fit the item
    /// - `ApplyError::InsufficientMaterial` if the fee is not met
    /// - `ApplyError::EngineRejected` if the engine failed or changed nothing
    pub async fn apply(
        &self,
        actor: ActorId,
        object: ObjectId,
        catalyst: CatalystRef,
    ) -> Result<Applied, ApplyError> {
        let item = self
            .inventory
            .item(actor, object)
            .ok_or(ApplyError::ItemUnavailable(object))?;

        let recipe = self
            .fees
            .resolve(item.item_id, catalyst.item_id)
            .ok_or(ApplyError::RecipeNotAllowed {
                item: item.item_id,
                catalyst: catalyst.item_id,
            })?;

        if item.variation.is_augmented() {
            self.strip.strip_if_present(actor, object).await;
        }

        let before = self
            .inventory
            .item(actor, object)
            .ok_or(ApplyError::ItemUnavailable(object))?
            .variation;
        let material = recipe.material;
        let required = recipe.material_count;
        let material_real = self.inventory.count_of(actor, material);

        let advanced = if self.credit_mode && material_real < required {
            self.advance(actor, material, required - material_real, material_real)
        } else {
            0
        };

        let material_before = self.inventory.count_of(actor, material);
        let catalysts_before = self.inventory.count_of(actor, catalyst.item_id);
        if material_before < required || catalysts_before < 1 {
            self.reverse_advance(actor, material, advanced, material_real);
            return Err(ApplyError::InsufficientMaterial {
                material,
                required,
                available: material_real,
                catalysts: catalysts_before,
            });
        }

        let call = self
            .engine
            .refine(actor, object, catalyst.object_id, material, required);
        if let Err(e) = contained(call).await {
            tracing::warn!(%actor, %object, "Refine call failed: {}", e);
            self.reverse_advance(actor, material, advanced, material_real);
            return Err(ApplyError::EngineRejected(RejectReason::Failed(e)));
        }

        let after = self
            .inventory
            .item(actor, object)
            .map_or(before, |i| i.variation);
        let material_after = self.inventory.count_of(actor, material);
        let catalysts_after = self.inventory.count_of(actor, catalyst.item_id);

        let consumed = material_after < material_before && catalysts_after < catalysts_before;
        let changed = after != before;
        if !(consumed && changed) {
            tracing::warn!(%actor, %object, consumed, changed, "Refine had no observable effect");
            self.reverse_advance(actor, material, advanced, material_real);
            return Err(ApplyError::EngineRejected(RejectReason::NoObservableEffect {
                consumed,
                changed,
            }));
        }

        self.outbox.notice(actor, SystemNotice::AugmentSucceeded);
        self.outbox.refresh_item(actor, object);
        tracing::info!(%actor, %object, %before, %after, advanced, "Augment applied");

        Ok(Applied {
            recipe,
            before,
            after,
            advanced,
        })
    }

    /// Grant the shortfall silently, returning what actually arrived
    fn advance(&self, actor: ActorId, material: ItemId, shortfall: u64, baseline: u64) -> u64 {
        if let Err(e) = self.inventory.grant(actor, material, shortfall) {
            tracing::warn!(%actor, %material, shortfall, "Credit advance failed: {}", e);
        }
        let advanced = self
            .inventory
            .count_of(actor, material)
            .saturating_sub(baseline)
            .min(shortfall);
        tracing::debug!(%actor, %material, advanced, "Material advanced on credit");
        advanced
    }

    /// Destroy whatever part of the advance is still present
    fn reverse_advance(&self, actor: ActorId, material: ItemId, advanced: u64, baseline: u64) {
        if advanced == 0 {
            return;
        }
        let still_added = self
            .inventory
            .count_of(actor, material)
            .saturating_sub(baseline);
        let amount = advanced.min(still_added);
        if amount == 0 {
            return;
        }
        match self.inventory.destroy(actor, material, amount) {
            Ok(()) => tracing::info!(%actor, %material, amount, "Credit advance reversed"),
            Err(e) => tracing::warn!(%actor, %material, amount, "Credit reversal failed: {}", e),
        }
    }
}

impl std::fmt::Debug for TransactionalApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionalApplier")
            .field("credit_mode", &self.credit_mode)
            .finish_non_exhaustive()
    }
}
