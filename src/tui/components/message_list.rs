//! # MessageList Component
//!
//! Scrollable view of the conversation history.
//!
//! ## Responsibilities
//!
//! - Draw each entry through `Message`, with its copy labels
//! - Draw the pending indicator below the newest entry
//! - Snap to the newest entry whenever the conversation changes
//! - Cache entry heights so long histories stay cheap to lay out
//!
//! `MessageList` is transient (created each frame) and wraps the persistent
//! `&mut MessageListState`, mirroring ratatui's `StatefulWidget` pattern.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::conversation::Entry;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::code_blocks::CopyTargets;
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;
use crate::tui::markdown::CopyLabels;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const PENDING_LABEL: &str = "Loading...";
/// Rows reserved under the history for the pending indicator.
const PENDING_ROWS: u16 = 1;

/// Scroll and layout state, persisted in `TuiState`.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, keep the newest entry in view.
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Conversation revision seen by the last `observe`.
    seen_revision: Option<u64>,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            seen_revision: None,
        }
    }

    /// Re-pin to the bottom when the conversation revision moved.
    ///
    /// Returns true if it moved.
    pub fn observe(&mut self, revision: u64) -> bool {
        if self.seen_revision == Some(revision) {
            return false;
        }
        self.seen_revision = Some(revision);
        self.stick_to_bottom = true;
        true
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Clamp the scroll offset to the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// True when the user scrolled up and newer content sits below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub entries: &'a [Entry],
    pub copy_targets: &'a CopyTargets,
    /// Affordance number currently showing "copied!".
    pub copied: Option<usize>,
    pub is_pending: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        entries: &'a [Entry],
        copy_targets: &'a CopyTargets,
        is_pending: bool,
    ) -> Self {
        Self {
            state,
            entries,
            copy_targets,
            copied: None,
            is_pending,
            spinner_frame: 0,
        }
    }

    fn pending_line(&self) -> Line<'static> {
        let frame = SPINNER[self.spinner_frame % SPINNER.len()];
        Line::from(vec![
            Span::styled(format!("{frame} "), Style::default().fg(Color::Yellow)),
            Span::styled(
                PENDING_LABEL,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // scrollbar column

        // 1. Measure entries not yet in the cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.entries.len(), content_width);
        layout.heights.truncate(reusable);
        for entry in self.entries.iter().skip(reusable) {
            layout
                .heights
                .push(Message::calculate_height(entry, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(self.entries.len(), content_width);

        let total_height = self.state.layout.total_height();
        let pending_rows = if self.is_pending { PENDING_ROWS } else { 0 };
        let canvas_height = total_height.saturating_add(pending_rows);

        // 2. Follow the newest entry, or clamp to the content
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.scroll_state.set_offset(Position {
                x: 0,
                y: canvas_height.saturating_sub(area.height),
            });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Draw the visible entries
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = self.state.layout.top_of(visible.start);
        for index in visible {
            let height = self.state.layout.heights[index];
            let numbers = self.copy_targets.labels_for(index);
            let labels = CopyLabels {
                numbers: &numbers,
                copied: self.copied,
            };
            scroll_view.render_widget(
                Message::new(&self.entries[index], labels),
                Rect::new(0, y, content_width, height),
            );
            y += height;
        }

        if self.is_pending {
            scroll_view.render_widget(
                Paragraph::new(self.pending_line()),
                Rect::new(0, total_height, content_width, PENDING_ROWS),
            );
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Implemented on the persistent state: `MessageList` is rebuilt every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
            }
            _ => {}
        }
        None
    }
}

/// Cached entry heights.
///
/// Entries never change after they are appended, so a cached height stays
/// valid until the width changes.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    entry_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            entry_count: 0,
            content_width: 0,
        }
    }

    /// How many leading heights can be kept.
    pub fn reusable_count(&self, entry_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || entry_count < self.entry_count {
            return 0;
        }
        self.heights.len().min(entry_count)
    }

    pub fn update_metadata(&mut self, entry_count: usize, content_width: u16) {
        self.entry_count = entry_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Canvas row where entry `index` starts.
    pub fn top_of(&self, index: usize) -> u16 {
        index
            .checked_sub(1)
            .and_then(|i| self.prefix_heights.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Entries intersecting the viewport, padded by half a screen each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
