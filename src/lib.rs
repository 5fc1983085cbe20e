//! parley: a terminal chat client for Gemini.
//!
//! - [`core`]: conversation state machine and turn pipeline
//! - [`inference`]: completion providers
//! - [`render`]: Markdown → HTML and transcript export
//! - [`tui`]: ratatui front end

pub mod core;
pub mod inference;
pub mod render;
pub mod tui;

#[cfg(test)]
pub mod test_support;
