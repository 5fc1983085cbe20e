//! # Copy Targets
//!
//! Every code block in an answered entry gets exactly one numbered copy
//! affordance. The numbering is stable: blocks are numbered in the order they
//! first appear, and a block keeps its number for the rest of the session.
//!
//! `attach` runs after every change to the history or pending flag, so it
//! must be idempotent. Each block is keyed by `(entry index, ordinal within
//! entry)` and a block that already carries an affordance is skipped.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::core::conversation::Entry;
use crate::render;

/// A code block lifted out of an entry's Markdown source.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub entry: usize,
    pub ordinal: usize,
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Default)]
pub struct CopyTargets {
    blocks: Vec<CodeBlock>,
    /// (entry, ordinal) -> 1-based affordance number
    attached: HashMap<(usize, usize), usize>,
    /// Entries before this index have been fully scanned.
    scanned: usize,
}

impl CopyTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach affordances to code blocks not yet carrying one.
    ///
    /// Returns how many were newly attached.
    pub fn attach(&mut self, entries: &[Entry]) -> usize {
        let mut added = 0;
        for (index, entry) in entries.iter().enumerate().skip(self.scanned) {
            let Some(source) = copy_source(entry) else {
                continue;
            };
            for (ordinal, (language, code)) in extract_code_blocks(source).into_iter().enumerate()
            {
                if self.attached.contains_key(&(index, ordinal)) {
                    continue;
                }
                self.blocks.push(CodeBlock {
                    entry: index,
                    ordinal,
                    language,
                    code,
                });
                self.attached.insert((index, ordinal), self.blocks.len());
                added += 1;
            }
        }
        self.scanned = entries.len();
        if added > 0 {
            log::debug!("Attached {added} copy target(s), {} total", self.blocks.len());
        }
        added
    }

    /// Affordance numbers for an entry's blocks, in ordinal order.
    pub fn labels_for(&self, entry: usize) -> Vec<usize> {
        let mut labels: Vec<(usize, usize)> = self
            .attached
            .iter()
            .filter(|((e, _), _)| *e == entry)
            .map(|((_, ordinal), number)| (*ordinal, *number))
            .collect();
        labels.sort_unstable();
        labels.into_iter().map(|(_, number)| number).collect()
    }

    /// Look up a block by its 1-based affordance number.
    pub fn get(&self, number: usize) -> Option<&CodeBlock> {
        number.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    /// The most recently attached block and its number.
    pub fn latest(&self) -> Option<(usize, &CodeBlock)> {
        self.blocks.last().map(|block| (self.blocks.len(), block))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Only model answers carry copyable code. User text is shown verbatim.
fn copy_source(entry: &Entry) -> Option<&str> {
    if entry.is_terminal() {
        entry.source.as_deref()
    } else {
        None
    }
}

/// Pull `(language, code)` pairs out of Markdown, fenced and indented alike.
///
/// Ordinals match the order in which the terminal renderer draws the blocks.
pub fn extract_code_blocks(markdown: &str) -> Vec<(Option<String>, String)> {
    let mut blocks = Vec::new();
    let mut current: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, render::markdown_options()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        Some(lang.trim().to_string())
                    }
                    _ => None,
                };
                current = Some((language, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, code)) = current.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = current.take() {
                    blocks.push((language, code.trim_end_matches('\n').to_string()));
                }
            }
            _ => {}
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlRenderer;

    fn answer(markdown: &str) -> Entry {
        Entry::assistant(markdown, &HtmlRenderer::new())
    }

    #[test]
    fn test_extract_fenced_and_indented() {
        let md = "intro\n\n```rust\nfn main() {}\n```\n\ntext\n\n    indented\n";
        let blocks = extract_code_blocks(md);
        assert_eq!(
            blocks,
            vec![
                (Some("rust".to_string()), "fn main() {}".to_string()),
                (None, "indented".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_ignores_inline_code() {
        assert!(extract_code_blocks("use `x` here").is_empty());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let entries = vec![
            Entry::user("show me".to_string()),
            answer("```\na\n```\n\n```\nb\n```"),
        ];
        let mut targets = CopyTargets::new();

        assert_eq!(targets.attach(&entries), 2);
        assert_eq!(targets.attach(&entries), 0);
        assert_eq!(targets.attach(&entries), 0);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_attach_is_idempotent_across_fresh_scans() {
        let entries = vec![answer("```\na\n```")];
        let mut targets = CopyTargets::new();
        targets.attach(&entries);

        // Force a rescan of everything; the markers must still hold.
        targets.scanned = 0;
        assert_eq!(targets.attach(&entries), 0);
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_new_entries_get_next_numbers() {
        let mut entries = vec![answer("```\nfirst\n```")];
        let mut targets = CopyTargets::new();
        targets.attach(&entries);

        entries.push(Entry::user("more".to_string()));
        entries.push(answer("```py\nsecond\n```"));
        assert_eq!(targets.attach(&entries), 1);

        assert_eq!(targets.labels_for(0), vec![1]);
        assert_eq!(targets.labels_for(2), vec![2]);
        assert_eq!(targets.get(2).map(|b| b.code.as_str()), Some("second"));
        let (number, latest) = targets.latest().unwrap();
        assert_eq!(number, 2);
        assert_eq!(latest.language.as_deref(), Some("py"));
    }

    #[test]
    fn test_user_code_is_not_a_target() {
        let entries = vec![Entry::user("```\nmine\n```".to_string())];
        let mut targets = CopyTargets::new();
        assert_eq!(targets.attach(&entries), 0);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_get_out_of_range() {
        let targets = CopyTargets::new();
        assert!(targets.get(0).is_none());
        assert!(targets.get(1).is_none());
        assert!(targets.latest().is_none());
    }
}
