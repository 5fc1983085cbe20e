//! # Core Application Logic
//!
//! The conversation state machine and the turn pipeline.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Conversation (store) │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect::SpawnRequest
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  one-shot  │      │   tests    │
//!     │  (spawns)  │      │ (run_turn) │      │ (run_turn) │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`conversation`]: `Entry`, `Origin`, and the append-only `Conversation` store
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`turn`]: The provider call for one turn and the awaitable `run_turn`
//! - [`config`]: Layered configuration

pub mod action;
pub mod config;
pub mod conversation;
pub mod state;
pub mod turn;
