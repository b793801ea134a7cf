//! Conversation controller: the submission protocol between the store and
//! the assistant gateway.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::events::Message;
use crate::gateway::AssistantGateway;
use crate::prompts;
use crate::store::{self, SharedStore};

/// Why a submission was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was blank after trimming
    EmptyInput,
    /// A previous submission is still waiting for its reply
    Pending,
}

/// Outcome of [`ConversationController::submit`]
#[derive(Debug)]
pub enum Submission {
    /// Nothing changed; the caller keeps its input
    Rejected(RejectReason),
    /// The user message is in the log and the reply is on its way.
    /// The caller should clear its input field.
    Accepted(JoinHandle<()>),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }

    /// Wait for the reply to land in the store; no-op for rejections
    pub async fn finished(self) {
        if let Submission::Accepted(handle) = self {
            if let Err(err) = handle.await {
                error!(error = %err, "submission task ended abnormally");
            }
        }
    }
}

/// Whether a reply to `input` is shown as a market report card.
///
/// Looks at what the user typed, not at the reply.
pub fn classify_report(input: &str) -> bool {
    let lowered = input.to_lowercase();
    prompts::REPORT_TRIGGERS
        .iter()
        .any(|trigger| lowered.contains(trigger))
}

/// Clears the pending flag when dropped, whether the exchange finished,
/// failed, panicked or was aborted.
struct PendingGuard {
    store: SharedStore,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        store::lock(&self.store).set_pending(false);
    }
}

/// Sole mutator of the conversation store and sole caller of the gateway
pub struct ConversationController {
    store: SharedStore,
    gateway: Arc<AssistantGateway>,
}

impl ConversationController {
    pub fn new(store: SharedStore, gateway: Arc<AssistantGateway>) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn gateway(&self) -> &AssistantGateway {
        &self.gateway
    }

    pub fn is_pending(&self) -> bool {
        store::lock(&self.store).is_pending()
    }

    /// Submit one user utterance.
    ///
    /// Must be called from within a tokio runtime; the gateway call runs on
    /// a spawned task. The user message is appended and the pending flag set
    /// before this returns.
    pub fn submit(&self, raw_input: &str) -> Submission {
        let guard = {
            let mut state = store::lock(&self.store);
            if raw_input.trim().is_empty() {
                debug!("ignoring blank submission");
                return Submission::Rejected(RejectReason::EmptyInput);
            }
            if state.is_pending() {
                debug!("ignoring submission while a reply is pending");
                return Submission::Rejected(RejectReason::Pending);
            }

            state.append_message(Message::user(raw_input));
            state.set_pending(true);
            PendingGuard {
                store: Arc::clone(&self.store),
            }
        };

        let gateway = Arc::clone(&self.gateway);
        let store = Arc::clone(&self.store);
        let input = raw_input.to_string();

        let handle = tokio::spawn(async move {
            let _pending = guard;
            let reply = match gateway.send_message(&input).await {
                Ok(text) => Message::model(text, classify_report(&input)),
                Err(err) => {
                    error!(error = %err, "gateway call failed");
                    Message::model(prompts::GATEWAY_FAILURE_FALLBACK, false)
                }
            };
            store::lock(&store).append_message(reply);
        });

        Submission::Accepted(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Role;
    use crate::gateway::testing::{Scripted, ScriptedBackend};
    use crate::store::ConversationStore;

    fn controller(backend: Arc<ScriptedBackend>) -> ConversationController {
        let gateway = AssistantGateway::new(backend);
        ConversationController::new(ConversationStore::shared(), Arc::new(gateway))
    }

    fn snapshot(controller: &ConversationController) -> Vec<Message> {
        store::lock(controller.store()).messages().to_vec()
    }

    #[test]
    fn classifies_on_trigger_words() {
        assert!(classify_report("시장 분석 해줘"));
        assert!(classify_report("주간 리포트"));
        assert!(classify_report("BTC 분석 리포트 보여줘"));
        assert!(!classify_report("안녕"));
        assert!(!classify_report("report please"));
    }

    #[tokio::test]
    async fn round_trip_produces_report() {
        let backend = ScriptedBackend::new([Scripted::Reply("BTC is up 3%.")]);
        let controller = controller(backend.clone());
        assert_eq!(snapshot(&controller).len(), 1);

        controller.submit("BTC 분석 리포트 보여줘").finished().await;

        let log = snapshot(&controller);
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].role, Role::User);
        assert_eq!(log[1].text, "BTC 분석 리포트 보여줘");
        assert!(!log[1].is_report);
        assert_eq!(log[2].role, Role::Model);
        assert_eq!(log[2].text, "BTC is up 3%.");
        assert!(log[2].is_report);
        assert!(!controller.is_pending());
        assert_eq!(backend.calls(), ["BTC 분석 리포트 보여줘"]);
    }

    #[tokio::test]
    async fn plain_question_is_not_a_report() {
        let controller = controller(ScriptedBackend::new([Scripted::Reply("안녕하세요")]));
        controller.submit("안녕").finished().await;

        let log = snapshot(&controller);
        assert_eq!(log[2].text, "안녕하세요");
        assert!(!log[2].is_report);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let backend = ScriptedBackend::new(Vec::<Scripted>::new());
        let controller = controller(backend.clone());

        for input in ["", "   ", "\n\t"] {
            let submission = controller.submit(input);
            assert!(matches!(submission, Submission::Rejected(RejectReason::EmptyInput)));
        }

        assert_eq!(snapshot(&controller).len(), 1);
        assert!(!controller.is_pending());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn user_message_lands_before_gateway_answers() {
        let backend = ScriptedBackend::gated([Scripted::Reply("later")]);
        let controller = controller(backend.clone());

        let submission = controller.submit("BTC?");
        assert!(submission.is_accepted());

        let log = snapshot(&controller);
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].text, "BTC?");
        assert!(controller.is_pending());

        backend.release();
        submission.finished().await;
        assert_eq!(snapshot(&controller).len(), 3);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn submissions_while_pending_are_rejected() {
        let backend = ScriptedBackend::gated([Scripted::Reply("first answer")]);
        let controller = controller(backend.clone());

        let first = controller.submit("first");
        let second = controller.submit("second");

        assert!(matches!(second, Submission::Rejected(RejectReason::Pending)));
        assert_eq!(snapshot(&controller).len(), 2);

        backend.release();
        first.finished().await;

        assert_eq!(backend.calls(), ["first"]);
        assert_eq!(snapshot(&controller).len(), 3);
    }

    #[tokio::test]
    async fn failure_appends_fixed_fallback() {
        let controller = controller(ScriptedBackend::new([Scripted::Fail(500)]));
        controller.submit("시장 분석 해줘").finished().await;

        let log = snapshot(&controller);
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].role, Role::Model);
        assert_eq!(log[2].text, prompts::GATEWAY_FAILURE_FALLBACK);
        assert!(!log[2].is_report);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn empty_reply_keeps_classification() {
        let controller = controller(ScriptedBackend::new([Scripted::Empty]));
        controller.submit("리포트 줘").finished().await;

        let log = snapshot(&controller);
        assert_eq!(log[2].text, prompts::EMPTY_REPLY_FALLBACK);
        assert!(log[2].is_report);
    }

    #[tokio::test]
    async fn repeated_failures_grow_log_by_two() {
        let backend = ScriptedBackend::new([Scripted::Fail(503), Scripted::Fail(503), Scripted::Fail(503)]);
        let controller = controller(backend.clone());

        for attempt in 1..=3 {
            controller.submit("same question").finished().await;
            let log = snapshot(&controller);
            assert_eq!(log.len(), 1 + 2 * attempt);
            assert_eq!(log[log.len() - 2].text, "same question");
            assert_eq!(log[log.len() - 1].text, prompts::GATEWAY_FAILURE_FALLBACK);
        }
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn aborted_submission_still_clears_pending() {
        let backend = ScriptedBackend::gated(Vec::<Scripted>::new());
        let controller = controller(backend);

        let Submission::Accepted(handle) = controller.submit("stuck") else {
            panic!("submission should be accepted");
        };
        assert!(controller.is_pending());

        handle.abort();
        let _ = handle.await;

        assert!(!controller.is_pending());
        assert_eq!(snapshot(&controller).len(), 2);
    }

    #[tokio::test]
    async fn input_is_stored_verbatim() {
        let controller = controller(ScriptedBackend::new([Scripted::Reply("ok")]));
        controller.submit("  ETH 가격?  ").finished().await;
        assert_eq!(snapshot(&controller)[1].text, "  ETH 가격?  ");
    }
}
