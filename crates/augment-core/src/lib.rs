//! Augment Core - auto-augment workflow
//!
//! Replaces the augment on an actor's equipped weapon when a catalyst is
//! used, on top of an item engine this crate does not own:
//! - Serializes workflows per actor
//! - Classifies the existing augment and asks before overwriting a valuable one
//! - Strips the old augment (official cancel first, forced reset as fallback)
//! - Applies the catalyst, optionally advancing the material fee on credit,
//!   and reverses the advance whenever the engine does not observably succeed
//!
//! # Example
//!
//! ```rust,ignore
//! use augment_core::{Actor, AugmentConfig, AutoAugment, CatalystRef, Collaborators};
//!
//! # async fn example(collaborators: Collaborators) {
//! let workflow = AutoAugment::new(AugmentConfig::new(), collaborators);
//!
//! let run = workflow
//!     .use_catalyst(Actor::player(1), CatalystRef::new(500, 8723))
//!     .await;
//! println!("handled: {}", run.outcome.handled());
//! # }
//! ```

// Core modules
pub mod applier;
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod fee;
pub mod gate;
pub mod handler;
pub mod lock;
pub mod notify;
pub mod strip;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use applier::{Applied, TransactionalApplier};
pub use classifier::{Classification, Classifier, ProtectReason};
pub use config::{AugmentConfig, ConfirmPolicy, ProtectPolicy, DEFAULT_CONFIG_PATH};
pub use coordinator::{AutoAugment, ResumeOutcome, ResumeReport, UseOutcome, WorkflowRun};
pub use engine::{
    Collaborators, ConfirmationTransport, Inventory, Notifier, OptionCatalog, OptionTraits,
    RecipeSource, RefineEngine,
};
pub use error::{
    ApplyError, AugmentError, ConfigError, EngineError, NotifyError, RejectReason,
    TransitionError, ValidationError,
};
pub use fee::FeeResolver;
pub use gate::{ConfirmationGate, GateDecision, PendingAnswer, PendingConfirmation, Resolution};
pub use handler::{ItemHandler, ItemHandlerRegistry};
pub use lock::{ActorGuard, LockRegistry, LockToken};
pub use notify::{Outbox, CHAT_PREFIX};
pub use strip::{StripOperator, StripOutcome};
pub use types::{
    Actor, ActorId, ActorKind, Answer, CatalystRef, ConfirmPrompt, ItemFlags, ItemId,
    ItemSnapshot, ObjectId, OptionId, PaperdollSlot, PromptId, Recipe, Shortcut, ShortcutKind,
    SystemNotice, Variation,
};
pub use workflow::{WorkflowState, WorkflowTrace};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring and driving the workflow
    pub use crate::{
        Actor, ActorId, AugmentConfig, AutoAugment, CatalystRef, Collaborators, ItemHandler,
        ItemHandlerRegistry, ObjectId, UseOutcome, Variation,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
