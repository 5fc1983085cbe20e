//! # TUI Components
//!
//! ```text
//! components/
//! ├── title_bar.rs     one-line status bar (stateless)
//! ├── message.rs       a single entry, styled by origin (stateless)
//! ├── message_list.rs  scrollable history with layout cache
//! ├── input_box.rs     multi-line composer
//! └── code_blocks.rs   numbered copy targets for code blocks
//! ```
//!
//! Components get external data as props rather than reaching into `App`:
//!
//! ```rust,ignore
//! let mut bar = TitleBar::new(app.model_name.clone(), app.status_message.clone(), pending, unseen);
//! bar.render(frame, area);
//! ```

pub mod code_blocks;
pub mod input_box;
pub mod message;
pub mod message_list;
mod title_bar;

pub use code_blocks::CopyTargets;
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;
