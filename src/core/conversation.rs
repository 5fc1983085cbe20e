//! # Conversation Store
//!
//! The ordered, append-only log of entries plus the single in-flight flag.
//!
//! ```text
//! Conversation
//! ├── history: Vec<Entry>   // chronological, never mutated after append
//! ├── pending: bool         // true while one turn awaits its reply
//! ├── draft: String         // text being composed, not yet submitted
//! └── revision: u64         // bumped on every history/pending change
//! ```
//!
//! The presentation layer compares `revision` between frames and re-renders
//! (and re-scrolls to the newest entry) when it moved.

use crate::render::Renderer;

/// Fixed Markdown shown when a turn fails. Never varies by failure cause.
pub const ERROR_MESSAGE: &str = "Oops, something went wrong while contacting the AI!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
    SystemError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub origin: Origin,
    /// Raw input for user entries, rendered HTML for assistant and error entries.
    pub content: String,
    /// Markdown the content was rendered from. `None` for user entries.
    pub source: Option<String>,
}

impl Entry {
    pub fn user(text: String) -> Self {
        Self {
            origin: Origin::User,
            content: text,
            source: None,
        }
    }

    /// Model reply: trimmed, then rendered.
    pub fn assistant(text: &str, renderer: &dyn Renderer) -> Self {
        let markdown = text.trim();
        Self {
            origin: Origin::Assistant,
            content: renderer.render(markdown),
            source: Some(markdown.to_string()),
        }
    }

    pub fn error(renderer: &dyn Renderer) -> Self {
        Self {
            origin: Origin::SystemError,
            content: renderer.render(ERROR_MESSAGE),
            source: Some(ERROR_MESSAGE.to_string()),
        }
    }

    /// Assistant or error: the entry that closes a turn.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.origin, Origin::User)
    }

    /// Text the terminal surface draws for this entry.
    pub fn display_text(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.content)
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    history: Vec<Entry>,
    pending: bool,
    draft: String,
    revision: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: Entry) {
        self.history.push(entry);
        self.revision += 1;
    }

    pub fn set_pending(&mut self, pending: bool) {
        if self.pending != pending {
            self.pending = pending;
            self.revision += 1;
        }
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.history
    }

    pub fn last(&self) -> Option<&Entry> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
