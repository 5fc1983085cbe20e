//! # Turn driver
//!
//! [`PendingTurn`] is the I/O half of a turn: the provider call, bounded by a
//! timeout. The TUI spawns it on a tokio task; [`run_turn`] awaits it inline
//! for one-shot mode and tests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::state::App;
use crate::inference::{CompletionProvider, CompletionRequest, ProviderError};

/// A provider call waiting to be made for an accepted submission.
pub struct PendingTurn {
    pub provider: Arc<dyn CompletionProvider>,
    /// Instruction prefix + user text.
    pub prompt: String,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for PendingTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTurn")
            .field("provider", &self.provider.name())
            .field("prompt_len", &self.prompt.len())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PendingTurn {
    /// Performs the call. A call that outlives `timeout` settles as
    /// [`ProviderError::Timeout`] so the conversation never stays pending.
    pub async fn run(self) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            prompt: &self.prompt,
            model: &self.model,
        };
        let started = std::time::Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.provider.complete(request)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} call timed out after {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                );
                Err(ProviderError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            }
        };
        info!(
            "{} call settled in {}ms (ok={})",
            self.provider.name(),
            started.elapsed().as_millis(),
            result.is_ok()
        );
        result
    }
}

/// What happened to one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty or whitespace-only input; nothing changed.
    Ignored,
    /// Another turn was in flight; nothing appended.
    Rejected,
    /// Assistant entry appended.
    Completed,
    /// Error entry appended.
    Failed,
}

/// Submits `raw` and awaits the reply, leaving the conversation settled.
pub async fn run_turn(app: &mut App, raw: &str) -> TurnOutcome {
    match update(app, Action::Submit(raw.to_string())) {
        Effect::SpawnRequest(turn) => {
            let result = turn.run().await;
            let outcome = if result.is_ok() {
                TurnOutcome::Completed
            } else {
                TurnOutcome::Failed
            };
            update(app, Action::TurnSettled(result));
            outcome
        }
        Effect::None | Effect::Quit if raw.trim().is_empty() => TurnOutcome::Ignored,
        Effect::None | Effect::Quit => TurnOutcome::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{Entry, Origin};
    use crate::test_support::{FailingProvider, HangingProvider, StubProvider, app_with};

    #[tokio::test]
    async fn test_run_turn_completes_with_rendered_entry() {
        let mut app = app_with(StubProvider::replying("**hi**"));

        let outcome = run_turn(&mut app, "hello").await;

        assert_eq!(outcome, TurnOutcome::Completed);
        let entries = app.conversation.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], Entry::user("hello".into()));
        assert_eq!(entries[1].origin, Origin::Assistant);
        assert_eq!(entries[1].content, "<p><strong>hi</strong></p>");
        assert!(!app.conversation.is_pending());
    }

    #[tokio::test]
    async fn test_run_turn_failure_appends_error_entry() {
        let mut app = app_with(FailingProvider);

        let outcome = run_turn(&mut app, "hello").await;

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(
            app.conversation.last().unwrap(),
            &Entry::error(app.renderer.as_ref())
        );
        assert!(!app.conversation.is_pending());
    }

    #[tokio::test]
    async fn test_run_turn_ignores_blank_input_without_calling_provider() {
        let provider = StubProvider::replying("unused");
        let calls = provider.calls();
        let mut app = app_with(provider);

        assert_eq!(run_turn(&mut app, "   ").await, TurnOutcome::Ignored);
        assert!(app.conversation.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out_and_clears_pending() {
        let mut app = app_with(HangingProvider);
        app.request_timeout = Duration::from_secs(30);

        let outcome = run_turn(&mut app, "hello").await;

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(app.conversation.last().unwrap().origin, Origin::SystemError);
        assert!(!app.conversation.is_pending());
    }

    #[test]
    fn test_pending_turn_run_reports_timeout_secs() {
        let turn = PendingTurn {
            provider: Arc::new(HangingProvider),
            prompt: "p".into(),
            model: "m".into(),
            timeout: Duration::from_millis(10),
        };
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let result = rt.block_on(turn.run());
        assert_eq!(result, Err(ProviderError::Timeout { secs: 0 }));
    }

    #[test]
    fn test_three_turns_in_order() {
        let mut app = app_with(StubProvider::echoing());
        tokio_test::block_on(async {
            for text in ["one", "two", "three"] {
                assert_eq!(run_turn(&mut app, text).await, TurnOutcome::Completed);
            }
        });

        let shape: Vec<(Origin, &str)> = app
            .conversation
            .entries()
            .iter()
            .map(|e| (e.origin, e.display_text()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Origin::User, "one"),
                (Origin::Assistant, "echo: one"),
                (Origin::User, "two"),
                (Origin::Assistant, "echo: two"),
                (Origin::User, "three"),
                (Origin::Assistant, "echo: three"),
            ]
        );
    }
}
