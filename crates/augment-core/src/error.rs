//! Error types for the augment workflow
//!
//! Every failure the workflow can observe maps to one of these kinds:
//! - Validation failures before any lock or mutation
//! - Recipe, material and engine failures during apply
//! - Collaborator failures (engine, notification transport)
//! - Configuration failures, recovered with defaults

use crate::types::{ActorId, ItemId, ObjectId};
use std::path::PathBuf;

/// Umbrella error for one workflow completion
#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    /// Pre-condition failed, nothing was touched
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Apply sequence failed
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AugmentError {
    /// Human-readable text sent to the actor
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.user_message().to_string(),
            Self::Apply(e) => e.user_message().to_string(),
            Self::Config(_) => "Augmentation is temporarily unavailable.".to_string(),
        }
    }

    /// Whether the failure happened before any mutation could occur
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Config(_) => true,
            Self::Apply(e) => e.is_rejection(),
        }
    }
}

/// Pre-condition failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Only players may augment
    #[error("actor is not a player")]
    NotAPlayer,

    /// The used item is not a configured catalyst
    #[error("item {0} is not a recognized catalyst")]
    CatalystNotRecognized(ItemId),

    /// Nothing in the weapon slots
    #[error("no weapon equipped")]
    NoWeaponEquipped,

    /// Hero, cursed, shadow or otherwise ineligible item
    #[error("item {0} cannot be augmented")]
    NotAugmentable(ObjectId),

    /// Item belongs to someone else
    #[error("item {item} is owned by {owner}, not {actor}")]
    WrongOwner {
        /// Item checked
        item: ObjectId,
        /// Actual owner
        owner: ActorId,
        /// Actor running the workflow
        actor: ActorId,
    },

    /// Item is no longer in the actor's inventory
    #[error("item {0} is no longer available")]
    ItemMissing(ObjectId),

    /// Catalyst stack is gone
    #[error("catalyst {0} is no longer available")]
    CatalystMissing(ObjectId),

    /// State changed while waiting for the actor's answer
    #[error("item {0} changed while awaiting confirmation")]
    StateChanged(ObjectId),
}

impl ValidationError {
    /// Human-readable text sent to the actor
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotAPlayer | Self::CatalystNotRecognized(_) => "This item cannot be used here.",
            Self::NoWeaponEquipped => "You must equip a weapon first.",
            Self::NotAugmentable(_) => "This weapon cannot be augmented.",
            Self::WrongOwner { .. } | Self::ItemMissing(_) => "That weapon is no longer yours.",
            Self::CatalystMissing(_) => "The life stone is no longer in your inventory.",
            Self::StateChanged(_) => {
                "Your weapon changed while you were deciding. Use the stone again."
            }
        }
    }

    /// Whether the use should be reported back as "not handled"
    ///
    /// Foreign actors and foreign items are left to other handlers without a
    /// message.
    #[inline]
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NotAPlayer | Self::CatalystNotRecognized(_))
    }
}

/// Apply sequence failures
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// Catalyst is valid in general but not for this item type
    #[error("catalyst {catalyst} is not allowed for item {item}")]
    RecipeNotAllowed {
        /// Item template
        item: ItemId,
        /// Catalyst template
        catalyst: ItemId,
    },

    /// Fee not met (after any credit attempt)
    #[error("insufficient material {material}: need {required}, have {available}")]
    InsufficientMaterial {
        /// Material template
        material: ItemId,
        /// Quantity the recipe requires
        required: u64,
        /// Quantity on hand at the check
        available: u64,
        /// Catalysts on hand at the check
        catalysts: u64,
    },

    /// Item disappeared before the engine was called
    #[error("item {0} is unavailable")]
    ItemUnavailable(ObjectId),

    /// Engine failed or produced no observable effect
    #[error("engine rejected refine: {0}")]
    EngineRejected(RejectReason),
}

impl ApplyError {
    /// Human-readable text sent to the actor
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RecipeNotAllowed { .. } => "This life stone cannot be used on this weapon.",
            Self::InsufficientMaterial { .. } => "You do not have enough materials.",
            Self::ItemUnavailable(_) => "That weapon is no longer available.",
            Self::EngineRejected(RejectReason::Failed(_)) => "The augmentation failed.",
            Self::EngineRejected(RejectReason::NoObservableEffect { .. }) => {
                "The augmentation was refused."
            }
        }
    }

    /// Whether the engine was never invoked
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::EngineRejected(_))
    }
}

/// Why the engine's refine was treated as rejected
#[derive(Debug, thiserror::Error)]
pub enum RejectReason {
    /// The call itself failed
    #[error("{0}")]
    Failed(#[from] EngineError),

    /// The call returned but state did not move
    #[error("no observable effect (consumed: {consumed}, changed: {changed})")]
    NoObservableEffect {
        /// Material and catalyst counts both dropped
        consumed: bool,
        /// A modifier slot changed
        changed: bool,
    },
}

/// Failures reported by the external item engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Engine declined the request
    #[error("refused: {0}")]
    Refused(String),

    /// Engine or inventory not reachable for this actor
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Engine code panicked while handling the call
    #[error("panicked: {0}")]
    Panicked(String),
}

/// Failures delivering something to the actor's client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// Client is gone
    #[error("actor {0} is disconnected")]
    Disconnected(ActorId),

    /// Transport-level failure
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config schema
    #[error("invalid config in {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// Semantically invalid value
    #[error("invalid value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Illegal workflow state transition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal workflow transition {from} -> {to}")]
pub struct TransitionError {
    /// State left
    pub from: &'static str,
    /// State requested
    pub to: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augment_error_display() {
        let err = AugmentError::from(ValidationError::NoWeaponEquipped);
        assert!(err.to_string().contains("no weapon equipped"));
    }

    #[test]
    fn rejection_classification() {
        assert!(AugmentError::from(ValidationError::NoWeaponEquipped).is_rejection());

        let insufficient = ApplyError::InsufficientMaterial {
            material: ItemId(9000),
            required: 50,
            available: 10,
            catalysts: 1,
        };
        assert!(AugmentError::from(insufficient).is_rejection());

        let engine = ApplyError::EngineRejected(RejectReason::Failed(EngineError::Refused(
            "busy".into(),
        )));
        assert!(!AugmentError::from(engine).is_rejection());
    }

    #[test]
    fn silent_validation_errors() {
        assert!(ValidationError::NotAPlayer.is_silent());
        assert!(ValidationError::CatalystNotRecognized(ItemId(1)).is_silent());
        assert!(!ValidationError::NoWeaponEquipped.is_silent());
    }

    #[test]
    fn reject_reason_messages_differ() {
        let failed = ApplyError::EngineRejected(RejectReason::Failed(EngineError::Panicked(
            "boom".into(),
        )));
        let noop = ApplyError::EngineRejected(RejectReason::NoObservableEffect {
            consumed: false,
            changed: false,
        });
        assert_ne!(failed.user_message(), noop.user_message());
        assert!(noop.to_string().contains("consumed: false"));
    }
}
