//! # Markdown → HTML
//!
//! The render step of the turn pipeline. Model text is Markdown; assistant
//! entries store the HTML this module produces.
//!
//! Output is sanitized before it is stored: raw HTML in the Markdown is
//! escaped and script-capable link targets are dropped (see [`sanitize`]).

pub mod sanitize;
pub mod transcript;

use pulldown_cmark::{Options, Parser, html};

/// Converts a Markdown block into display markup.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// `pulldown-cmark` backed renderer with GFM extensions enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn markdown_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

impl Renderer for HtmlRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, markdown_options());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, sanitize::sanitize(parser));
        out.truncate(out.trim_end().len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_paragraph() {
        assert_eq!(HtmlRenderer.render("**hi**"), "<p><strong>hi</strong></p>");
    }

    #[test]
    fn test_fenced_code_keeps_language_class() {
        let html = HtmlRenderer.render("```rust\nfn main() {}\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_lists_and_headings() {
        let html = HtmlRenderer.render("# Title\n\n- a\n- b");
        assert!(html.starts_with("<h1>Title</h1>"));
        assert!(html.contains("<ul>\n<li>a</li>\n<li>b</li>\n</ul>"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = HtmlRenderer.render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(HtmlRenderer.render(""), "");
    }
}
