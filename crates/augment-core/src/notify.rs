//! Best-effort client notifications
//!
//! Cosmetic side effects never decide the outcome of a workflow. Every
//! failure is logged and dropped here, so callers can fire and forget.

use crate::engine::{Inventory, Notifier};
use crate::types::{ActorId, ObjectId, SystemNotice};
use std::sync::Arc;

/// Prefix for chat lines sent by the workflow
pub const CHAT_PREFIX: &str = "[AutoAugment]";

/// Fire-and-forget wrapper around a [`Notifier`]
#[derive(Clone)]
pub struct Outbox {
    notifier: Arc<dyn Notifier>,
}

impl Outbox {
    /// Wrap a notifier
    #[inline]
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Send a prefixed chat line
    pub fn say(&self, actor: ActorId, text: &str) {
        let line = format!("{CHAT_PREFIX} {text}");
        if let Err(e) = self.notifier.message(actor, &line) {
            tracing::debug!(%actor, "Message dropped: {}", e);
        }
    }

    /// Send a system notice
    pub fn notice(&self, actor: ActorId, notice: SystemNotice) {
        if let Err(e) = self.notifier.notice(actor, notice) {
            tracing::debug!(%actor, ?notice, "Notice dropped: {}", e);
        }
    }

    /// Refresh one item in the actor's inventory view
    pub fn refresh_item(&self, actor: ActorId, item: ObjectId) {
        if let Err(e) = self.notifier.inventory_update(actor, item) {
            tracing::debug!(%actor, %item, "Inventory update dropped: {}", e);
        }
    }

    /// Re-send every shortcut bound to the item
    pub fn refresh_shortcuts(&self, inventory: &dyn Inventory, actor: ActorId, item: ObjectId) {
        for shortcut in inventory
            .shortcuts(actor)
            .iter()
            .filter(|s| s.targets_item(item))
        {
            if let Err(e) = self.notifier.shortcut_register(actor, shortcut) {
                tracing::debug!(%actor, %item, "Shortcut refresh dropped: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::types::Shortcut;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Notifier for Recorder {
        fn message(&self, actor: ActorId, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Disconnected(actor));
            }
            self.lines.lock().push(text.to_string());
            Ok(())
        }

        fn notice(&self, actor: ActorId, _notice: SystemNotice) -> Result<(), NotifyError> {
            Err(NotifyError::Disconnected(actor))
        }

        fn inventory_update(&self, _actor: ActorId, _item: ObjectId) -> Result<(), NotifyError> {
            Ok(())
        }

        fn shortcut_register(&self, _actor: ActorId, _s: &Shortcut) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[test]
    fn say_prefixes_lines() {
        let recorder = Arc::new(Recorder::default());
        let outbox = Outbox::new(recorder.clone());

        outbox.say(ActorId(1), "hello");

        assert_eq!(recorder.lines.lock().as_slice(), ["[AutoAugment] hello"]);
    }

    #[test]
    fn failures_are_swallowed() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let outbox = Outbox::new(recorder.clone());

        outbox.say(ActorId(1), "lost");
        outbox.notice(ActorId(1), SystemNotice::AugmentSucceeded);

        assert!(recorder.lines.lock().is_empty());
    }
}
