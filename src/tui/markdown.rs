//! Markdown → ratatui `Text` for the terminal surface.
//!
//! The HTML renderer in `crate::render` produces what gets stored and
//! exported; this one draws the same Markdown with terminal styling. Fenced
//! code is highlighted with syntect and framed with a border whose top edge
//! carries the block's copy label.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::render;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";
const TAB: &str = "    ";

/// Copy affordance numbers for one entry's code blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyLabels<'a> {
    /// Affordance number per code block, by ordinal.
    pub numbers: &'a [usize],
    /// Number of the block copied most recently, while feedback is showing.
    pub copied: Option<usize>,
}

impl CopyLabels<'_> {
    fn label(&self, ordinal: usize) -> Option<String> {
        let number = *self.numbers.get(ordinal)?;
        Some(if self.copied == Some(number) {
            " copied! ".to_string()
        } else {
            format!(" copy #{number} ")
        })
    }
}

/// Draw Markdown as styled `Text`.
pub fn render(content: &str, base_fg: Color, labels: CopyLabels<'_>) -> Text<'static> {
    let mut w = TermWriter::new(base_fg, labels);
    for event in Parser::new_ext(content, render::markdown_options()) {
        w.handle(event);
    }
    w.text
}

fn border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

struct TermWriter<'a> {
    text: Text<'static>,
    base_fg: Color,
    labels: CopyLabels<'a>,
    /// Nested inline styles; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// Spans prepended to each new line (blockquote and code gutters).
    gutters: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = numbered list at n.
    lists: Vec<Option<u64>>,
    code: Option<CodeState>,
    /// Code blocks seen so far, for label lookup.
    code_ordinal: usize,
    link_url: Option<String>,
    /// First cell of the current table row?
    first_cell: bool,
    needs_gap: bool,
}

enum CodeState {
    Highlighted(HighlightLines<'static>),
    Plain,
}

impl<'a> TermWriter<'a> {
    fn new(base_fg: Color, labels: CopyLabels<'a>) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            labels,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            code: None,
            code_ordinal: 0,
            link_url: None,
            first_cell: true,
            needs_gap: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn new_line(&mut self, line: Line<'static>) {
        let mut spans = self.gutters.clone();
        spans.extend(line.spans);
        self.text.lines.push(Line::from(spans));
    }

    fn append(&mut self, span: Span<'static>) {
        match self.text.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    fn gap(&mut self) {
        if std::mem::take(&mut self.needs_gap) {
            self.new_line(Line::default());
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.append(Span::styled(
                c.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.gap();
                self.new_line(Line::from(Span::styled("─".repeat(40), border_style())));
                self.needs_gap = true;
            }
            Event::TaskListMarker(done) => {
                self.append(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            // Raw HTML is shown as written, like the HTML renderer escapes it.
            Event::Html(raw) => {
                let style = self.style();
                for line in raw.lines() {
                    self.new_line(Line::from(Span::styled(line.replace('\t', TAB), style)));
                }
            }
            Event::InlineHtml(raw) => self.text(raw),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.gap();
                self.new_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.gap();
                let style = heading_style(self.base_fg, level);
                let hashes = "#".repeat(level as usize);
                self.new_line(Line::from(Span::styled(format!("{hashes} "), style)));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.gap();
                self.gutters.push(Span::styled("│ ", border_style()));
                self.push_style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => self.open_code(kind),
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}- "),
                };
                self.append(Span::styled(marker, border_style()));
            }
            Tag::Table(_) | Tag::HtmlBlock => self.gap(),
            Tag::TableHead | Tag::TableRow => {
                self.new_line(Line::default());
                self.first_cell = true;
            }
            Tag::TableCell => {
                if !std::mem::replace(&mut self.first_cell, false) {
                    self.append(Span::styled(" │ ", border_style()));
                }
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Table | TagEnd::HtmlBlock => self.needs_gap = true,
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.needs_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.styles.pop();
                self.needs_gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.gutters.pop();
                self.new_line(Line::from(Span::styled("╰──", border_style())));
                self.needs_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.needs_gap = true;
            }
            TagEnd::TableHead => {
                let rule = Span::styled("─".repeat(20), border_style());
                self.new_line(Line::from(rule));
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link_url.take() {
                    self.append(Span::raw(" ("));
                    self.append(Span::styled(url, link_style()));
                    self.append(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    fn open_code(&mut self, kind: CodeBlockKind<'_>) {
        if !self.text.lines.is_empty() {
            self.new_line(Line::default());
        }
        self.needs_gap = false;

        let lang = match &kind {
            CodeBlockKind::Fenced(l) => l.trim(),
            CodeBlockKind::Indented => "",
        };

        let mut top = vec![Span::styled("╭──", border_style())];
        if !lang.is_empty() {
            top.push(Span::styled(
                format!(" {lang} "),
                border_style().add_modifier(Modifier::BOLD),
            ));
            top.push(Span::styled("──", border_style()));
        }
        if let Some(label) = self.labels.label(self.code_ordinal) {
            top.push(Span::styled(
                label,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            top.push(Span::styled("──", border_style()));
        }
        self.code_ordinal += 1;
        self.new_line(Line::from(top));
        self.gutters.push(Span::styled("│ ", border_style()));

        self.code = Some(
            SYNTAX_SET
                .find_syntax_by_token(lang)
                .filter(|_| !lang.is_empty())
                .and_then(|syntax| {
                    THEME_SET
                        .themes
                        .get(THEME)
                        .map(|theme| CodeState::Highlighted(HighlightLines::new(syntax, theme)))
                })
                .unwrap_or(CodeState::Plain),
        );
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui draws '\t' with zero width
        let text = cow.replace('\t', TAB);

        match self.code.take() {
            Some(CodeState::Highlighted(mut hl)) => {
                for line in LinesWithEndings::from(&text) {
                    let spans: Vec<Span<'static>> = match hl.highlight_line(line, &SYNTAX_SET) {
                        Ok(ranges) => ranges
                            .into_iter()
                            .filter_map(|(style, fragment)| {
                                let fragment = fragment.trim_end_matches('\n');
                                (!fragment.is_empty()).then(|| {
                                    let fg = style.foreground;
                                    Span::styled(
                                        fragment.to_string(),
                                        Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                    )
                                })
                            })
                            .collect(),
                        Err(e) => {
                            log::debug!("Highlighting failed, drawing plain: {e}");
                            vec![Span::raw(line.trim_end_matches('\n').to_string())]
                        }
                    };
                    self.new_line(Line::from(spans));
                }
                self.code = Some(CodeState::Highlighted(hl));
            }
            Some(CodeState::Plain) => {
                for line in text.lines() {
                    self.new_line(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::White),
                    )));
                }
                self.code = Some(CodeState::Plain);
            }
            None => {
                let style = self.style();
                self.append(Span::styled(text, style));
            }
        }
    }
}

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let style = Style::default().fg(base_fg).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => style,
        _ => style.add_modifier(Modifier::ITALIC),
    }
}
