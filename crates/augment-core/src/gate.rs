//! Confirmation gate
//!
//! When the current augment is protected and confirmation is enabled, the
//! gate shows a yes/no prompt and hands back a [`PendingAnswer`]. The caller
//! releases the actor's lock and awaits the answer on its own task; the wait
//! never blocks a worker thread. A missing answer within the timeout counts
//! as "no", and so does a transport that drops the reply handle.
//!
//! A [`PendingConfirmation`] carries identifiers only. Whoever resumes must
//! re-fetch and re-validate item state under a freshly acquired lock.

use crate::config::ConfirmPolicy;
use crate::engine::ConfirmationTransport;
use crate::error::NotifyError;
use crate::types::{ActorId, Answer, CatalystRef, ConfirmPrompt, ObjectId, PromptId};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Identifiers captured for an outstanding prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConfirmation {
    /// Prompt identity
    pub id: PromptId,
    /// Actor asked
    pub actor: ActorId,
    /// Item to overwrite
    pub item: ObjectId,
    /// Catalyst to apply
    pub catalyst: CatalystRef,
}

/// How an outstanding prompt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Actor said yes
    Accepted,
    /// Actor said no
    Declined,
    /// No answer within the timeout
    TimedOut,
    /// Transport dropped the reply handle
    Abandoned,
}

impl Resolution {
    /// Whether the workflow may resume
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Gate decision for one run
#[derive(Debug)]
pub enum GateDecision {
    /// Continue synchronously under the held lock
    Proceed,
    /// Prompt issued; resume on the answer
    Deferred(PendingAnswer),
}

/// Answer handle for one outstanding prompt
#[derive(Debug)]
pub struct PendingAnswer {
    confirmation: PendingConfirmation,
    reply: oneshot::Receiver<Answer>,
    timeout: Duration,
    outstanding: Arc<DashMap<PromptId, PendingConfirmation>>,
}

impl PendingAnswer {
    /// Identifiers captured at prompt time
    #[inline]
    #[must_use]
    pub fn confirmation(&self) -> &PendingConfirmation {
        &self.confirmation
    }

    /// Wait for the answer or the timeout, whichever comes first
    pub async fn wait(self) -> (PendingConfirmation, Resolution) {
        let Self {
            confirmation,
            reply,
            timeout,
            outstanding,
        } = self;

        let resolution = match tokio::time::timeout(timeout, reply).await {
            Ok(Ok(Answer::Yes)) => Resolution::Accepted,
            Ok(Ok(Answer::No)) => Resolution::Declined,
            Ok(Err(_)) => Resolution::Abandoned,
            Err(_) => Resolution::TimedOut,
        };
        outstanding.remove(&confirmation.id);

        tracing::debug!(
            actor = %confirmation.actor,
            prompt = %confirmation.id,
            ?resolution,
            "Confirmation resolved"
        );
        (confirmation, resolution)
    }
}

/// Yes/no gate in front of protected overwrites
pub struct ConfirmationGate {
    transport: Arc<dyn ConfirmationTransport>,
    policy: ConfirmPolicy,
    outstanding: Arc<DashMap<PromptId, PendingConfirmation>>,
}

impl ConfirmationGate {
    /// Create gate
    #[must_use]
    pub fn new(transport: Arc<dyn ConfirmationTransport>, policy: ConfirmPolicy) -> Self {
        Self {
            transport,
            policy,
            outstanding: Arc::new(DashMap::new()),
        }
    }

    /// Decide whether to proceed now or ask first
    ///
    /// # Errors
    /// Returns `NotifyError` if the prompt could not be shown; nothing is
    /// left outstanding in that case.
    pub fn gate(
        &self,
        actor: ActorId,
        item: ObjectId,
        catalyst: CatalystRef,
        protected: bool,
    ) -> Result<GateDecision, NotifyError> {
        if !protected || !self.policy.enabled {
            return Ok(GateDecision::Proceed);
        }

        let prompt = ConfirmPrompt {
            id: PromptId::new(),
            text: self.policy.text.clone(),
            timeout: self.policy.timeout(),
        };
        let confirmation = PendingConfirmation {
            id: prompt.id,
            actor,
            item,
            catalyst,
        };
        let (tx, rx) = oneshot::channel();

        self.outstanding.insert(prompt.id, confirmation);
        if let Err(e) = self.transport.ask(actor, &prompt, tx) {
            self.outstanding.remove(&prompt.id);
            return Err(e);
        }

        tracing::info!(%actor, %item, prompt = %prompt.id, "Confirmation requested");
        Ok(GateDecision::Deferred(PendingAnswer {
            confirmation,
            reply: rx,
            timeout: prompt.timeout,
            outstanding: Arc::clone(&self.outstanding),
        }))
    }

    /// Number of prompts awaiting an answer
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Whether confirmation is enabled at all
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.policy.enabled
    }
}

impl std::fmt::Debug for ConfirmationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationGate")
            .field("policy", &self.policy)
            .field("outstanding", &self.outstanding.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Keeps reply handles so tests can answer later
    #[derive(Default)]
    struct Held {
        replies: Mutex<Vec<oneshot::Sender<Answer>>>,
        prompts: Mutex<Vec<ConfirmPrompt>>,
    }

    impl ConfirmationTransport for Held {
        fn ask(
            &self,
            _actor: ActorId,
            prompt: &ConfirmPrompt,
            reply: oneshot::Sender<Answer>,
        ) -> Result<(), NotifyError> {
            self.prompts.lock().push(prompt.clone());
            self.replies.lock().push(reply);
            Ok(())
        }
    }

    struct Broken;

    impl ConfirmationTransport for Broken {
        fn ask(
            &self,
            actor: ActorId,
            _prompt: &ConfirmPrompt,
            _reply: oneshot::Sender<Answer>,
        ) -> Result<(), NotifyError> {
            Err(NotifyError::Disconnected(actor))
        }
    }

    fn catalyst() -> CatalystRef {
        CatalystRef::new(500, 8723)
    }

    #[test]
    fn unprotected_proceeds() {
        let gate = ConfirmationGate::new(Arc::new(Held::default()), ConfirmPolicy::default());
        let decision = gate.gate(ActorId(1), ObjectId(10), catalyst(), false).unwrap();
        assert!(matches!(decision, GateDecision::Proceed));
    }

    #[test]
    fn disabled_gate_proceeds_even_when_protected() {
        let policy = ConfirmPolicy {
            enabled: false,
            ..ConfirmPolicy::default()
        };
        let gate = ConfirmationGate::new(Arc::new(Held::default()), policy);
        let decision = gate.gate(ActorId(1), ObjectId(10), catalyst(), true).unwrap();
        assert!(matches!(decision, GateDecision::Proceed));
    }

    #[tokio::test]
    async fn yes_is_accepted() {
        let transport = Arc::new(Held::default());
        let gate = ConfirmationGate::new(transport.clone(), ConfirmPolicy::default());

        let GateDecision::Deferred(pending) =
            gate.gate(ActorId(1), ObjectId(10), catalyst(), true).unwrap()
        else {
            panic!("expected a prompt");
        };
        assert_eq!(gate.outstanding(), 1);
        assert_eq!(transport.prompts.lock()[0].timeout, Duration::from_secs(15));

        transport.replies.lock().pop().unwrap().send(Answer::Yes).unwrap();
        let (confirmation, resolution) = pending.wait().await;

        assert_eq!(resolution, Resolution::Accepted);
        assert_eq!(confirmation.item, ObjectId(10));
        assert_eq!(gate.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn silence_times_out() {
        let transport = Arc::new(Held::default());
        let gate = ConfirmationGate::new(transport.clone(), ConfirmPolicy::default());

        let GateDecision::Deferred(pending) =
            gate.gate(ActorId(1), ObjectId(10), catalyst(), true).unwrap()
        else {
            panic!("expected a prompt");
        };
        let (_, resolution) = pending.wait().await;

        assert_eq!(resolution, Resolution::TimedOut);
        assert_eq!(gate.outstanding(), 0);
    }

    #[tokio::test]
    async fn dropped_reply_is_abandoned() {
        let transport = Arc::new(Held::default());
        let gate = ConfirmationGate::new(transport.clone(), ConfirmPolicy::default());

        let GateDecision::Deferred(pending) =
            gate.gate(ActorId(1), ObjectId(10), catalyst(), true).unwrap()
        else {
            panic!("expected a prompt");
        };
        transport.replies.lock().clear();

        let (_, resolution) = pending.wait().await;
        assert_eq!(resolution, Resolution::Abandoned);
        assert!(!resolution.is_accepted());
    }

    #[test]
    fn transport_failure_leaves_nothing_outstanding() {
        let gate = ConfirmationGate::new(Arc::new(Broken), ConfirmPolicy::default());
        let result = gate.gate(ActorId(1), ObjectId(10), catalyst(), true);

        assert!(matches!(result, Err(NotifyError::Disconnected(_))));
        assert_eq!(gate.outstanding(), 0);
    }
}
