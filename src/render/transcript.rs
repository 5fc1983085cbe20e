//! Standalone HTML export of a conversation.
//!
//! User entries are escaped; assistant and error entries are already
//! sanitized HTML from [`HtmlRenderer`](super::HtmlRenderer) and are inserted
//! verbatim.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Local};
use pulldown_cmark::{CowStr, Event, html};

use crate::core::conversation::{Entry, Origin};

const STYLE: &str = "\
body{font-family:sans-serif;background:#f9fafb;margin:0 auto;max-width:56rem;padding:1rem}\
.entry{margin-bottom:1rem}\
.user{text-align:right}\
.user p{display:inline-block;background:#3b82f6;color:#fff;padding:.5rem 1rem;border-radius:.5rem;white-space:pre-line}\
.assistant,.error{background:#bbf7d0;padding:.5rem 1rem;border-radius:.5rem}\
.error{background:#fecaca}\
pre{background:#1e293b;color:#f8fafc;padding:1rem;border-radius:.5rem;overflow:auto}\
code{white-space:pre-wrap;word-wrap:break-word}";

/// Escapes text for an HTML text node.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, std::iter::once(Event::Text(CowStr::Borrowed(text))));
    out
}

fn class_for(origin: Origin) -> &'static str {
    match origin {
        Origin::User => "user",
        Origin::Assistant => "assistant",
        Origin::SystemError => "error",
    }
}

/// Renders the whole history as one HTML document.
pub fn to_html(entries: &[Entry], exported_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>parley transcript</title>\n<style>");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!(
        "<header><h1>AI Chatbot</h1><p>Exported {}</p></header>\n",
        exported_at.format("%Y-%m-%d %H:%M:%S %:z")
    ));

    for entry in entries {
        out.push_str(&format!("<div class=\"entry {}\">", class_for(entry.origin)));
        match entry.origin {
            Origin::User => {
                out.push_str("<p>");
                out.push_str(&escape(&entry.content));
                out.push_str("</p>");
            }
            Origin::Assistant | Origin::SystemError => out.push_str(&entry.content),
        }
        out.push_str("</div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Writes the transcript to `path`, replacing any existing file.
pub fn write(path: &Path, entries: &[Entry]) -> io::Result<()> {
    fs::write(path, to_html(entries, Local::now()))?;
    log::info!(
        "Wrote transcript with {} entries to {}",
        entries.len(),
        path.display()
    );
    Ok(())
}
