//! Event filter applied between the Markdown parser and the HTML writer.
//!
//! - Raw HTML (block or inline) is re-emitted as text, so the writer escapes it.
//! - Link and image destinations with a script-capable scheme become `#`.

use pulldown_cmark::{CowStr, Event, Tag};

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:", "file:"];

/// Whether a link destination may be emitted as-is.
pub fn is_safe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control chars inside the scheme.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    !BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn neutralize(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        log::warn!("Dropping unsafe link destination from model output");
        CowStr::Borrowed("#")
    }
}

/// Maps one parser event to its sanitized counterpart.
pub fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

pub fn sanitize<'a>(events: impl Iterator<Item = Event<'a>>) -> impl Iterator<Item = Event<'a>> {
    events.map(sanitize_event)
}
