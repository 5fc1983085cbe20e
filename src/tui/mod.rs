//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, draws the UI, and turns
//! keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (turn in flight, copy feedback showing): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms and redraws only on events or when a
//!   background turn settles.
//!
//! Every conversation change bumps its revision; the message list compares
//! revisions between frames and snaps to the newest entry when it moved.

pub mod clipboard;
mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::state::App;
use crate::core::turn::PendingTurn;
use crate::inference::ProviderError;
use crate::render::transcript;
use crate::tui::clipboard::{Clipboard, Osc52Clipboard};
use crate::tui::component::EventHandler;
use crate::tui::components::{CopyTargets, InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// How long a copied block shows "copied!" instead of its label.
const COPY_FEEDBACK: Duration = Duration::from_millis(1500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub copy_targets: CopyTargets,
    /// Affordance number and when it was copied.
    copy_feedback: Option<(usize, Instant)>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            copy_targets: CopyTargets::new(),
            copy_feedback: None,
        }
    }

    /// Affordance currently showing copy feedback.
    pub fn copied(&self) -> Option<usize> {
        self.copy_feedback
            .filter(|(_, at)| at.elapsed() < COPY_FEEDBACK)
            .map(|(number, _)| number)
    }

    /// Drops expired feedback. Returns true if the label must be redrawn.
    fn expire_feedback(&mut self) -> bool {
        if self.copy_feedback.is_some() && self.copied().is_none() {
            self.copy_feedback = None;
            return true;
        }
        false
    }

    /// Copies block `number`, or the newest block, and returns a status line.
    fn copy(&mut self, number: Option<usize>, clipboard: &mut dyn Clipboard) -> String {
        let target = match number {
            Some(n) => self.copy_targets.get(n).map(|block| (n, block)),
            None => self.copy_targets.latest(),
        };
        let Some((n, block)) = target else {
            return match number {
                Some(n) => format!("No code block #{n}"),
                None => "No code blocks to copy".to_string(),
            };
        };

        match clipboard.copy(&block.code) {
            Ok(()) => {
                info!(
                    "Copied code block #{n} (entry {}, block {}, {} bytes)",
                    block.entry,
                    block.ordinal,
                    block.code.len()
                );
                self.copy_feedback = Some((n, Instant::now()));
                format!("Copied code block #{n}")
            }
            Err(e) => {
                warn!("Clipboard write failed: {}", e);
                format!("Copy failed: {e}")
            }
        }
    }
}

/// Result of dispatching one terminal event.
#[derive(Debug)]
enum Dispatch {
    Continue,
    Spawn(PendingTurn),
    Quit,
}

fn dispatch(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    clipboard: &mut dyn Clipboard,
) -> Dispatch {
    match event {
        TuiEvent::Resize => Dispatch::Continue,
        TuiEvent::ForceQuit => match update(app, Action::Quit) {
            Effect::Quit => Dispatch::Quit,
            _ => Dispatch::Continue,
        },
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            Dispatch::Continue
        }
        TuiEvent::CopyLatest => {
            app.status_message = tui.copy(None, clipboard);
            Dispatch::Continue
        }
        TuiEvent::CopyBlock(n) => {
            app.status_message = tui.copy(Some(n), clipboard);
            Dispatch::Continue
        }
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::ContentChanged) => {
                update(app, Action::DraftChanged(tui.input_box.text().to_string()));
                Dispatch::Continue
            }
            Some(InputEvent::Submit(text)) => match update(app, Action::Submit(text)) {
                Effect::SpawnRequest(turn) => {
                    // Accepted: the conversation cleared its draft, mirror that.
                    tui.input_box.clear();
                    Dispatch::Spawn(turn)
                }
                Effect::Quit => Dispatch::Quit,
                Effect::None => Dispatch::Continue,
            },
            None => Dispatch::Continue,
        },
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Keyboard enhancement lets Shift+Enter be told apart from Enter;
        // terminals without it ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // blink timer resets on every draw
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Runs the interactive chat until Ctrl+C.
///
/// Must be called from inside a tokio runtime: turns run on spawned tasks.
/// When `transcript_path` is set, the conversation is exported there as HTML
/// on exit.
pub fn run(mut app: App, transcript_path: Option<PathBuf>) -> io::Result<()> {
    let mut tui = TuiState::new();
    let mut clipboard = Osc52Clipboard::stdout();

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new();
    if let Err(e) = &terminal_mode_guard {
        warn!("Failed to enable terminal modes: {}", e);
    }

    // Settled turns come back through here
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    let result = loop {
        let animating = app.conversation.is_pending() || tui.copy_feedback.is_some();
        if tui.expire_feedback() || animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            if let Err(e) = terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame)) {
                break Err(e);
            }
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match dispatch(&mut app, &mut tui, event, &mut clipboard) {
                Dispatch::Continue => {}
                Dispatch::Spawn(turn) => spawn_request(turn, tx.clone()),
                Dispatch::Quit => {
                    should_quit = true;
                    break;
                }
            }
        }
        if should_quit {
            break Ok(());
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if let Effect::Quit = update(&mut app, action) {
                should_quit = true;
            }
        }
        if should_quit {
            break Ok(());
        }
    };

    drop(terminal_mode_guard);
    ratatui::restore();

    if let Some(path) = transcript_path {
        match transcript::write(&path, app.conversation.entries()) {
            Ok(()) => info!("Transcript written to {}", path.display()),
            Err(e) => warn!("Failed to write transcript to {}: {}", path.display(), e),
        }
    }

    info!("Exiting after {} entries", app.conversation.len());
    result
}

/// Runs the turn on a tokio task and reports back over `tx`.
///
/// The turn always settles: a task that panics or is cancelled reports
/// `ProviderError::Internal` so the conversation leaves the pending state.
fn spawn_request(turn: PendingTurn, tx: mpsc::Sender<Action>) {
    info!("Spawning API request: {:?}", turn);
    let handle = tokio::spawn(turn.run());
    tokio::spawn(async move {
        let result = handle.await.unwrap_or_else(|e| {
            warn!("Request task ended abnormally: {}", e);
            Err(ProviderError::Internal(e.to_string()))
        });
        if tx.send(Action::TurnSettled(result)).is_err() {
            warn!("Failed to send TurnSettled: receiver dropped");
        }
    });
}
