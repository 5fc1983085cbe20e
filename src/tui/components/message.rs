use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::conversation::{Entry, Origin};
use crate::tui::markdown::{self, CopyLabels};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

/// One conversation entry in a rounded box, styled by origin.
///
/// Transient: built each frame by `MessageList` for the visible entries.
/// Model and error entries are drawn from their Markdown source; user
/// entries are shown exactly as typed.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub entry: &'a Entry,
    pub labels: CopyLabels<'a>,
}

impl<'a> Message<'a> {
    pub fn new(entry: &'a Entry, labels: CopyLabels<'a>) -> Self {
        Self { entry, labels }
    }

    /// Rows needed at `width`, borders included.
    ///
    /// Uses the same `Paragraph` the widget draws, so measured and drawn
    /// heights cannot drift apart. Copy labels only change the border text,
    /// never the row count.
    pub fn calculate_height(entry: &Entry, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = body_paragraph(entry, CopyLabels::default()).line_count(content_width);
        let lines = u16::try_from(lines).unwrap_or(u16::MAX);
        lines.max(1).saturating_add(VERTICAL_OVERHEAD)
    }
}

fn origin_style(origin: Origin) -> Style {
    match origin {
        Origin::User => Style::default().fg(Color::Green),
        Origin::Assistant => Style::default().fg(Color::Blue),
        Origin::SystemError => Style::default().fg(Color::Red),
    }
}

fn origin_title(origin: Origin) -> &'static str {
    match origin {
        Origin::User => "you",
        Origin::Assistant => "ai",
        Origin::SystemError => "error",
    }
}

fn body_paragraph(entry: &Entry, labels: CopyLabels<'_>) -> Paragraph<'static> {
    let style = origin_style(entry.origin);
    let text = match entry.origin {
        Origin::User => Text::from(entry.content.clone()),
        Origin::Assistant | Origin::SystemError => {
            markdown::render(entry.display_text(), style.fg.unwrap_or(Color::Reset), labels)
        }
    };
    Paragraph::new(text).style(style).wrap(Wrap { trim: false })
}

impl Widget for Message<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = origin_style(self.entry.origin);
        let border_style = match self.entry.origin {
            Origin::SystemError => style.add_modifier(Modifier::BOLD),
            _ => style.add_modifier(Modifier::DIM),
        };

        let block = Block::bordered()
            .title(origin_title(self.entry.origin))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        body_paragraph(self.entry, self.labels).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlRenderer;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(entry: &Entry, labels: CopyLabels<'_>, width: u16) -> String {
        let height = Message::calculate_height(entry, width);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(Message::new(entry, labels), f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn height_of_single_line() {
        let entry = Entry::user("Hello".into());
        assert_eq!(Message::calculate_height(&entry, 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn height_wraps_at_width() {
        let entry = Entry::user("Hello world".into());
        // 9 - 4 overhead = 5 columns
        assert!(Message::calculate_height(&entry, 9) >= 2 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn height_degenerate_width() {
        let entry = Entry::user("Hello".into());
        assert_eq!(Message::calculate_height(&entry, HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn height_counts_code_block_frame() {
        let entry = Entry::assistant("```\na\nb\n```", &HtmlRenderer::new());
        // top border + 2 code lines + bottom border
        assert_eq!(Message::calculate_height(&entry, 40), 4 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn user_text_shown_verbatim() {
        let entry = Entry::user("**not bold**".into());
        let screen = draw(&entry, CopyLabels::default(), 40);
        assert!(screen.contains("**not bold**"));
        assert!(screen.contains("you"));
    }

    #[test]
    fn assistant_markdown_is_rendered() {
        let entry = Entry::assistant("**bold**", &HtmlRenderer::new());
        let screen = draw(&entry, CopyLabels::default(), 40);
        assert!(screen.contains("bold"));
        assert!(!screen.contains("**"));
        assert!(!screen.contains("<strong>"));
    }

    #[test]
    fn error_entry_titled_error() {
        let entry = Entry::error(&HtmlRenderer::new());
        let screen = draw(&entry, CopyLabels::default(), 80);
        assert!(screen.contains("error"));
        assert!(screen.contains("Oops"));
    }

    #[test]
    fn copy_label_drawn_on_code_border() {
        let entry = Entry::assistant("```\nx\n```", &HtmlRenderer::new());
        let numbers = [1];
        let labels = CopyLabels {
            numbers: &numbers,
            copied: None,
        };
        assert!(draw(&entry, labels, 40).contains("copy #1"));
    }

    #[test]
    fn origin_colors() {
        assert_eq!(origin_style(Origin::User).fg, Some(Color::Green));
        assert_eq!(origin_style(Origin::Assistant).fg, Some(Color::Blue));
        assert_eq!(origin_style(Origin::SystemError).fg, Some(Color::Red));
    }
}
