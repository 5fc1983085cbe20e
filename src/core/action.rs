//! # Actions
//!
//! Everything that can happen to a conversation becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The provider call settles? That's `Action::TurnSettled(result)`.
//!
//! `update()` applies an action to the state and returns an [`Effect`]
//! describing the I/O the caller has to perform. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! A turn moves through these states:
//!
//! ```text
//! composed ──Submit──▶ sent (user entry, pending) ──SpawnRequest──▶ awaiting
//!                                                                      │
//!                            rendered / error entry, idle ◀──TurnSettled
//! ```

use log::{debug, info, warn};

use crate::core::conversation::Entry;
use crate::core::state::App;
use crate::core::turn::PendingTurn;
use crate::inference::ProviderError;

pub const STATUS_SENDING: &str = "Sending...";
pub const STATUS_BUSY: &str = "Still waiting for the previous reply";
pub const STATUS_FAILED: &str = "Request failed, edit or resend to retry";

#[derive(Debug)]
pub enum Action {
    /// Input box contents changed.
    DraftChanged(String),
    /// User asked to send the text.
    Submit(String),
    /// The in-flight provider call finished.
    TurnSettled(Result<String, ProviderError>),
    Quit,
}

#[derive(Debug)]
pub enum Effect {
    None,
    /// Run the provider call and report back with `Action::TurnSettled`.
    SpawnRequest(PendingTurn),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::DraftChanged(text) => {
            app.conversation.set_draft(text);
            Effect::None
        }
        Action::Submit(raw) => submit(app, raw),
        Action::TurnSettled(result) => {
            settle(app, result);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, raw: String) -> Effect {
    if raw.trim().is_empty() {
        debug!("Ignoring empty submission");
        return Effect::None;
    }

    // One turn at a time; the draft stays so the user can resend later.
    if app.conversation.is_pending() {
        info!("Rejecting submission while a turn is in flight");
        app.conversation.set_draft(raw);
        app.status_message = STATUS_BUSY.to_string();
        return Effect::None;
    }

    let prompt = app.prompt.compose(&raw);
    app.conversation.append(Entry::user(raw));
    app.conversation.clear_draft();
    app.conversation.set_pending(true);
    app.status_message = STATUS_SENDING.to_string();

    info!(
        "Turn started: entries={}, prompt_len={}",
        app.conversation.len(),
        prompt.len()
    );

    Effect::SpawnRequest(PendingTurn {
        provider: app.provider.clone(),
        prompt,
        model: app.model_name.clone(),
        timeout: app.request_timeout,
    })
}

fn settle(app: &mut App, result: Result<String, ProviderError>) {
    if !app.conversation.is_pending() {
        warn!("Dropping settle with no turn in flight");
        return;
    }

    match result {
        Ok(text) => {
            debug!("Turn completed: {} bytes of model text", text.len());
            let entry = Entry::assistant(&text, app.renderer.as_ref());
            app.conversation.append(entry);
            app.status_message.clear();
        }
        Err(e) => {
            warn!("Turn failed: {}", e);
            app.conversation.append(Entry::error(app.renderer.as_ref()));
            app.status_message = STATUS_FAILED.to_string();
        }
    }

    app.conversation.set_pending(false);
}
