//! # TitleBar Component
//!
//! One-line status bar: app name, model, status message, and a "↓ New"
//! hint when the user has scrolled away from newer content.
//!
//! Stateless. All fields are props filled in by the parent each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub const APP_TITLE: &str = "AI Chatbot";

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
    pub is_pending: bool,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(
        model_name: String,
        status_message: String,
        is_pending: bool,
        has_unseen_content: bool,
    ) -> Self {
        Self {
            model_name,
            status_message,
            is_pending,
            has_unseen_content,
        }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(format!(
            "{APP_TITLE} (model: {})",
            self.model_name
        ))];
        if !self.status_message.is_empty() {
            let style = if self.is_pending {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(self.status_message.clone(), style));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
