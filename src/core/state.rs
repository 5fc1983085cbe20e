//! # Application State
//!
//! Core business state for parley. No TUI types here; presentation state
//! lives in the `tui` module.
//!
//! ```text
//! App
//! ├── provider: Arc<dyn CompletionProvider>  // remote text generation
//! ├── renderer: Arc<dyn Renderer>            // Markdown → HTML
//! ├── conversation: Conversation             // history, pending, draft
//! ├── prompt: PromptTemplate                 // static instruction prefix
//! ├── model_name: String                     // model sent with each call
//! ├── request_timeout: Duration              // per-call deadline
//! └── status_message: String                 // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{DEFAULT_REQUEST_TIMEOUT_SECS, ResolvedConfig};
use crate::core::conversation::Conversation;
use crate::inference::{CompletionProvider, PromptTemplate};
use crate::render::{HtmlRenderer, Renderer};

pub const WELCOME_MESSAGE: &str = "Type a message and press Enter";

pub struct App {
    pub provider: Arc<dyn CompletionProvider>,
    pub renderer: Arc<dyn Renderer>,
    pub conversation: Conversation,
    pub prompt: PromptTemplate,
    pub model_name: String,
    pub request_timeout: Duration,
    pub status_message: String,
}

impl App {
    pub fn new(provider: Arc<dyn CompletionProvider>, model_name: String) -> Self {
        Self {
            provider,
            renderer: Arc::new(HtmlRenderer::new()),
            conversation: Conversation::new(),
            prompt: PromptTemplate::default(),
            model_name,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            status_message: String::from(WELCOME_MESSAGE),
        }
    }

    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(provider, config.model_name.clone());
        app.prompt = PromptTemplate::new(config.instruction.clone());
        app.request_timeout = Duration::from_secs(config.request_timeout_secs);
        app
    }
}
