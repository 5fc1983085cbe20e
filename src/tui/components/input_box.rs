//! # InputBox Component
//!
//! Multi-line text field for composing the next message.
//!
//! The buffer is internal state; `pending` is a prop from the conversation.
//! Enter emits `Submit` but does NOT clear the buffer: the conversation
//! decides whether the submission was accepted and the parent clears the
//! box only then. A rejected submission keeps the text in place.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders (2) + padding (2).
const HORIZONTAL_OVERHEAD: u16 = 4;
const VERTICAL_OVERHEAD: u16 = 2;
/// Content rows before the box scrolls internally.
const MAX_VISIBLE_LINES: u16 = 5;

pub const PLACEHOLDER: &str = "Type a message...";
pub const SENDING_TITLE: &str = "Sending...";
const IDLE_TITLE: &str = "Message (Enter to send, Shift+Enter for newline)";

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    /// A turn is in flight (prop).
    pub pending: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            pending: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let lines = wrapped_lines(&self.buffer, inner_width(area_width)).len() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// (row, column) of the cursor within the wrapped text.
    fn cursor_row_col(&self, width: u16) -> (u16, u16) {
        let lines = wrapped_lines(&self.buffer[..self.cursor], width);
        let row = lines.len().saturating_sub(1) as u16;
        let col = lines.last().map_or(0, |l| l.width() as u16);
        (row, col)
    }

    fn insert(&mut self, text: &str) -> Option<InputEvent> {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
        Some(InputEvent::ContentChanged)
    }
}

fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD).max(1)
}

/// Wrap for display. A trailing newline yields a trailing empty line so the
/// cursor can sit on it.
fn wrapped_lines(text: &str, width: u16) -> Vec<String> {
    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    let mut lines: Vec<String> = text
        .split('\n')
        .flat_map(|paragraph| {
            let wrapped = textwrap::wrap(paragraph, &options);
            if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped.into_iter().map(|l| l.into_owned()).collect()
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn prev_boundary(text: &str, pos: usize) -> usize {
    text[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        let lines = wrapped_lines(&self.buffer, width);
        let (cursor_row, cursor_col) = self.cursor_row_col(width);
        let scroll = cursor_row.saturating_sub(MAX_VISIBLE_LINES - 1);

        let (title, border_style) = if self.pending {
            (
                SENDING_TITLE,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::DIM),
            )
        } else {
            (IDLE_TITLE, Style::default().fg(Color::Green))
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title)
            .padding(Padding::horizontal(1));

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(lines.join("\n"))
                .style(Style::default().fg(Color::Green))
                .scroll((scroll, 0))
        };
        frame.render_widget(paragraph.block(block), area);

        // border + padding
        let x = area.x + 2 + cursor_col.min(width.saturating_sub(1));
        let y = area.y + 1 + cursor_row - scroll;
        frame.set_cursor_position((x, y));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => self.insert(&text.replace("\r\n", "\n")),
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = prev_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = next_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                None
            }
            TuiEvent::Submit if !self.buffer.trim().is_empty() => {
                Some(InputEvent::Submit(self.buffer.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(input: &mut InputBox, s: &str) {
        for c in s.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
    }

    fn draw(input: &mut InputBox) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = InputBox::new();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        type_str(&mut input, "bc");
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.text(), "ab");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputBox::new();
        type_str(&mut input, "héllo");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.text(), "hllo");
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.text(), "hlo");
    }

    #[test]
    fn test_submit_keeps_buffer() {
        let mut input = InputBox::new();
        type_str(&mut input, "hello");

        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("hello".into()))
        );
        assert_eq!(input.text(), "hello");

        input.clear();
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_blank_submit_emits_nothing() {
        let mut input = InputBox::new();
        type_str(&mut input, "   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_home_end_within_line() {
        let mut input = InputBox::new();
        type_str(&mut input, "ab\ncd");
        input.handle_event(&TuiEvent::CursorHome);
        type_str(&mut input, "x");
        assert_eq!(input.text(), "ab\nxcd");
        input.handle_event(&TuiEvent::CursorEnd);
        type_str(&mut input, "y");
        assert_eq!(input.text(), "ab\nxcdy");
    }

    #[test]
    fn test_paste_normalizes_crlf() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\r\nb".into()));
        assert_eq!(input.text(), "a\nb");
    }

    #[test]
    fn test_height_grows_then_caps() {
        let mut input = InputBox::new();
        assert_eq!(input.calculate_height(40), 1 + VERTICAL_OVERHEAD);
        type_str(&mut input, "1\n2\n3");
        assert_eq!(input.calculate_height(40), 3 + VERTICAL_OVERHEAD);
        type_str(&mut input, "\n4\n5\n6\n7");
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_trailing_newline_counts_as_line() {
        assert_eq!(wrapped_lines("a\n", 10).len(), 2);
        assert_eq!(wrapped_lines("", 10).len(), 1);
    }

    #[test]
    fn test_render_titles() {
        let mut input = InputBox::new();
        let idle = draw(&mut input);
        assert!(idle.contains("Message"));
        assert!(idle.contains(PLACEHOLDER));

        input.pending = true;
        assert!(draw(&mut input).contains(SENDING_TITLE));
    }
}
