//! Workflow coordinator
//!
//! Entry point for one catalyst use. Sequences the components:
//! - Validates actor, catalyst and equipped weapon (no lock, no mutation)
//! - Takes the actor's lock, re-checks ownership, classifies the augment
//! - Either proceeds directly or asks for confirmation
//! - Strips, then applies, still under the lock
//!
//! While a prompt is outstanding the lock is released. The continuation runs
//! on its own task, re-acquires the lock and re-validates from identifiers
//! before touching anything. Every completion sends exactly one outcome line
//! to the actor.

use crate::applier::{Applied, TransactionalApplier};
use crate::classifier::Classifier;
use crate::config::AugmentConfig;
use crate::engine::{Collaborators, Inventory};
use crate::error::{ApplyError, AugmentError, NotifyError, ValidationError};
use crate::fee::FeeResolver;
use crate::gate::{ConfirmationGate, GateDecision, PendingAnswer, PendingConfirmation, Resolution};
use crate::lock::LockRegistry;
use crate::notify::Outbox;
use crate::strip::StripOperator;
use crate::types::{Actor, ActorId, CatalystRef, ItemSnapshot, ObjectId, PaperdollSlot, PromptId};
use crate::workflow::{WorkflowState, WorkflowTrace};
use std::sync::Arc;
use tokio::task::JoinHandle;

const MSG_APPLIED: &str = "Your weapon has been augmented.";
const MSG_DECLINED: &str = "Augmentation cancelled. Your weapon was not changed.";
const MSG_TIMED_OUT: &str = "No answer received. Your weapon was not changed.";
const MSG_PROMPT_FAILED: &str = "Could not ask for confirmation. Your weapon was not changed.";

/// Outcome of the synchronous part of a catalyst use
#[derive(Debug)]
pub enum UseOutcome {
    /// Not ours to handle (foreign actor or item), no message sent
    NotHandled,
    /// Validation failed before any mutation
    Rejected(ValidationError),
    /// Ran to completion without a prompt
    Completed(Result<Applied, ApplyError>),
    /// Prompt issued; the continuation finishes the run
    Deferred(PromptId),
    /// Prompt could not be shown, nothing changed
    PromptFailed(NotifyError),
}

impl UseOutcome {
    /// Handled flag reported back to the item engine
    #[must_use]
    pub fn handled(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Deferred(_) | Self::PromptFailed(_)
        )
    }

    /// Whether an augment was applied synchronously
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Completed(Ok(_)))
    }

    /// Collapse into a result; `Ok(None)` when nothing ran to completion
    ///
    /// # Errors
    /// Returns the validation or apply failure as an `AugmentError`
    pub fn into_result(self) -> Result<Option<Applied>, AugmentError> {
        match self {
            Self::NotHandled | Self::Deferred(_) | Self::PromptFailed(_) => Ok(None),
            Self::Rejected(e) => Err(e.into()),
            Self::Completed(result) => result.map(Some).map_err(Into::into),
        }
    }
}

/// Outcome of a confirmation continuation
#[derive(Debug)]
pub enum ResumeOutcome {
    /// Actor said no
    Declined,
    /// No answer within the timeout
    TimedOut,
    /// Transport dropped the prompt
    Abandoned,
    /// Accepted, but state no longer matched
    Invalidated(ValidationError),
    /// Accepted and ran to completion
    Completed(Result<Applied, ApplyError>),
}

impl ResumeOutcome {
    /// Whether an augment was applied
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Completed(Ok(_)))
    }
}

/// Result of a confirmation continuation
#[derive(Debug)]
pub struct ResumeReport {
    /// Prompt this continuation answered
    pub prompt: PromptId,
    /// How it ended
    pub outcome: ResumeOutcome,
    /// States visited after the prompt
    pub trace: WorkflowTrace,
}

/// Result of one catalyst use
#[derive(Debug)]
pub struct WorkflowRun {
    /// Synchronous outcome
    pub outcome: UseOutcome,
    /// States visited synchronously
    pub trace: WorkflowTrace,
    /// Continuation task, present when a prompt was issued
    pub continuation: Option<JoinHandle<ResumeReport>>,
}

impl WorkflowRun {
    fn finished(outcome: UseOutcome, trace: WorkflowTrace) -> Self {
        Self {
            outcome,
            trace,
            continuation: None,
        }
    }
}

struct Inner {
    config: AugmentConfig,
    inventory: Arc<dyn Inventory>,
    fees: FeeResolver,
    classifier: Classifier,
    strip: StripOperator,
    applier: TransactionalApplier,
    gate: ConfirmationGate,
    locks: LockRegistry,
    outbox: Outbox,
}

/// Auto-augment workflow coordinator
///
/// Cheap to clone; clones share locks and outstanding prompts.
#[derive(Clone)]
pub struct AutoAugment {
    inner: Arc<Inner>,
}

impl AutoAugment {
    /// Wire the workflow over the given collaborators
    #[must_use]
    pub fn new(config: AugmentConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            inventory,
            engine,
            recipes,
            options,
            notifier,
            prompts,
        } = collaborators;

        let outbox = Outbox::new(notifier);
        let fees = FeeResolver::new(recipes);
        let strip = StripOperator::new(Arc::clone(&inventory), Arc::clone(&engine), outbox.clone());
        let applier = TransactionalApplier::new(
            Arc::clone(&inventory),
            engine,
            fees.clone(),
            strip.clone(),
            outbox.clone(),
        )
        .with_credit_mode(config.credit_mode);

        Self {
            inner: Arc::new(Inner {
                classifier: Classifier::new(&config.protect, options),
                gate: ConfirmationGate::new(prompts, config.confirm.clone()),
                locks: LockRegistry::new(),
                config,
                inventory,
                fees,
                strip,
                applier,
                outbox,
            }),
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AugmentConfig {
        &self.inner.config
    }

    /// Per-actor lock registry
    #[inline]
    #[must_use]
    pub fn locks(&self) -> &LockRegistry {
        &self.inner.locks
    }

    /// Number of prompts awaiting an answer
    #[inline]
    #[must_use]
    pub fn outstanding_prompts(&self) -> usize {
        self.inner.gate.outstanding()
    }

    /// Run the workflow for one catalyst use
    pub async fn use_catalyst(&self, actor: Actor, catalyst: CatalystRef) -> WorkflowRun {
        let mut trace = WorkflowTrace::new();
        step(&mut trace, WorkflowState::Validating);

        let weapon = match self.validate(actor, catalyst) {
            Ok(weapon) => weapon,
            Err(e) => {
                step(&mut trace, WorkflowState::Done);
                return WorkflowRun::finished(self.reject(actor.id, e), trace);
            }
        };

        let id = actor.id;
        let guard = self.inner.locks.lock(id).await;
        step(&mut trace, WorkflowState::Classifying);

        let (item, catalyst) = match self.recheck(id, weapon.object_id, catalyst) {
            Ok(fresh) => fresh,
            Err(e) => {
                step(&mut trace, WorkflowState::Done);
                return WorkflowRun::finished(self.reject(id, e), trace);
            }
        };

        let classification = self.inner.classifier.classify(item.variation);
        tracing::debug!(actor = %id, item = %item.object_id, ?classification, "Augment classified");

        match self
            .inner
            .gate
            .gate(id, item.object_id, catalyst, classification.is_protected())
        {
            Ok(GateDecision::Proceed) => {
                let result = self
                    .strip_and_apply(&mut trace, id, item.object_id, catalyst)
                    .await;
                drop(guard);
                WorkflowRun::finished(UseOutcome::Completed(result), trace)
            }
            Ok(GateDecision::Deferred(pending)) => {
                step(&mut trace, WorkflowState::Confirming);
                drop(guard);

                let prompt = pending.confirmation().id;
                let this = self.clone();
                let continuation = tokio::spawn(async move { this.resume(pending).await });
                WorkflowRun {
                    outcome: UseOutcome::Deferred(prompt),
                    trace,
                    continuation: Some(continuation),
                }
            }
            Err(e) => {
                tracing::warn!(actor = %id, "Confirmation prompt failed: {}", e);
                step(&mut trace, WorkflowState::Done);
                drop(guard);
                self.inner.outbox.say(id, MSG_PROMPT_FAILED);
                WorkflowRun::finished(UseOutcome::PromptFailed(e), trace)
            }
        }
    }

    /// Continuation after the actor answered (or did not)
    async fn resume(&self, pending: PendingAnswer) -> ResumeReport {
        let mut trace = WorkflowTrace::resumed();
        let (confirmation, resolution) = pending.wait().await;
        let actor = confirmation.actor;

        let outcome = match resolution {
            Resolution::Declined => {
                self.inner.outbox.say(actor, MSG_DECLINED);
                ResumeOutcome::Declined
            }
            Resolution::TimedOut => {
                self.inner.outbox.say(actor, MSG_TIMED_OUT);
                ResumeOutcome::TimedOut
            }
            Resolution::Abandoned => {
                self.inner.outbox.say(actor, MSG_DECLINED);
                ResumeOutcome::Abandoned
            }
            Resolution::Accepted => {
                let _guard = self.inner.locks.lock(actor).await;
                match self.revalidate(&confirmation) {
                    Ok(catalyst) => {
                        let result = self
                            .strip_and_apply(&mut trace, actor, confirmation.item, catalyst)
                            .await;
                        ResumeOutcome::Completed(result)
                    }
                    Err(e) => {
                        tracing::info!(%actor, item = %confirmation.item, "Resume invalidated: {}", e);
                        self.inner.outbox.say(actor, e.user_message());
                        ResumeOutcome::Invalidated(e)
                    }
                }
            }
        };

        if trace.current() != WorkflowState::Done {
            step(&mut trace, WorkflowState::Done);
        }
        ResumeReport {
            prompt: confirmation.id,
            outcome,
            trace,
        }
    }

    /// Strip then apply, reporting the single outcome line
    async fn strip_and_apply(
        &self,
        trace: &mut WorkflowTrace,
        actor: ActorId,
        object: ObjectId,
        catalyst: CatalystRef,
    ) -> Result<Applied, ApplyError> {
        step(trace, WorkflowState::Stripping);
        let stripped = self.inner.strip.strip_if_present(actor, object).await;
        tracing::debug!(%actor, %object, ?stripped, "Strip finished");

        step(trace, WorkflowState::Applying);
        let result = self.inner.applier.apply(actor, object, catalyst).await;
        step(trace, WorkflowState::Done);

        match &result {
            Ok(_) => self.inner.outbox.say(actor, MSG_APPLIED),
            Err(e) => {
                tracing::info!(%actor, %object, "Augment not applied: {}", e);
                self.inner.outbox.say(actor, e.user_message());
            }
        }
        result
    }

    /// Lock-free checks before anything else happens
    fn validate(&self, actor: Actor, catalyst: CatalystRef) -> Result<ItemSnapshot, ValidationError> {
        if !actor.is_player() {
            return Err(ValidationError::NotAPlayer);
        }
        if !self.inner.config.is_catalyst(catalyst.item_id) {
            return Err(ValidationError::CatalystNotRecognized(catalyst.item_id));
        }

        let weapon = self
            .equipped_weapon(actor.id)
            .ok_or(ValidationError::NoWeaponEquipped)?;
        if weapon.owner != actor.id {
            return Err(ValidationError::WrongOwner {
                item: weapon.object_id,
                owner: weapon.owner,
                actor: actor.id,
            });
        }
        if !self.is_augmentable(&weapon) {
            return Err(ValidationError::NotAugmentable(weapon.object_id));
        }
        Ok(weapon)
    }

    /// Ownership re-check under the lock
    ///
    /// Returns the item and the catalyst stack the actor holds now, which may
    /// differ from the one used if stacks were merged, split or replaced.
    fn recheck(
        &self,
        actor: ActorId,
        object: ObjectId,
        catalyst: CatalystRef,
    ) -> Result<(ItemSnapshot, CatalystRef), ValidationError> {
        let item = self
            .inner
            .inventory
            .item(actor, object)
            .ok_or(ValidationError::ItemMissing(object))?;
        if item.owner != actor {
            return Err(ValidationError::WrongOwner {
                item: object,
                owner: item.owner,
                actor,
            });
        }
        if self.inner.inventory.count_of(actor, catalyst.item_id) == 0 {
            return Err(ValidationError::CatalystMissing(catalyst.object_id));
        }
        let stack = self
            .inner
            .inventory
            .stack_of(actor, catalyst.item_id)
            .ok_or(ValidationError::CatalystMissing(catalyst.object_id))?;
        if stack != catalyst.object_id {
            tracing::debug!(%actor, used = %catalyst.object_id, held = %stack, "Catalyst stack moved");
        }
        Ok((
            item,
            CatalystRef {
                object_id: stack,
                item_id: catalyst.item_id,
            },
        ))
    }

    /// Re-validation after "yes", from identifiers only
    ///
    /// Returns the catalyst stack to refine with; the one captured at prompt
    /// time is never reused.
    fn revalidate(&self, confirmation: &PendingConfirmation) -> Result<CatalystRef, ValidationError> {
        let actor = confirmation.actor;
        let (item, catalyst) = self.recheck(actor, confirmation.item, confirmation.catalyst)?;

        let still_wielded = self
            .equipped_weapon(actor)
            .is_some_and(|w| w.object_id == item.object_id);
        if !still_wielded || !item.variation.is_augmented() {
            return Err(ValidationError::StateChanged(item.object_id));
        }
        Ok(catalyst)
    }

    fn equipped_weapon(&self, actor: ActorId) -> Option<ItemSnapshot> {
        self.inner
            .inventory
            .paperdoll(actor, PaperdollSlot::RightHand)
            .or_else(|| self.inner.inventory.paperdoll(actor, PaperdollSlot::TwoHanded))
    }

    fn is_augmentable(&self, item: &ItemSnapshot) -> bool {
        let flags = item.flags;
        if flags.hero || flags.cursed || flags.shadow {
            return false;
        }
        if !flags.weapon && !flags.equipable {
            return false;
        }
        self.inner.fees.has_recipes(item.item_id)
    }

    fn reject(&self, actor: ActorId, error: ValidationError) -> UseOutcome {
        if error.is_silent() {
            tracing::debug!(%actor, "Catalyst use not handled: {}", error);
            return UseOutcome::NotHandled;
        }
        tracing::info!(%actor, "Catalyst use rejected: {}", error);
        self.inner.outbox.say(actor, error.user_message());
        UseOutcome::Rejected(error)
    }
}

impl std::fmt::Debug for AutoAugment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoAugment")
            .field("config", &self.inner.config)
            .field("locks", &self.inner.locks.len())
            .field("gate", &self.inner.gate)
            .finish_non_exhaustive()
    }
}

fn step(trace: &mut WorkflowTrace, next: WorkflowState) {
    if let Err(e) = trace.enter(next) {
        tracing::error!("Workflow transition rejected: {}", e);
    }
}
