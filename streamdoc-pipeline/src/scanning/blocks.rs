//! Raw block scanning
//!
//! Splits the accumulated text into alternating markdown and tagged-element spans. The scan
//! always starts from the beginning of the text; nothing is carried over between rebuilds.
//!
//! An element whose closing tag has not arrived yet ends the scan: everything from its
//! opening tag onward becomes an [`RawSpan::IncompleteXml`] span, which is never rendered.
//! While the stream is still open, a trailing fragment that may grow into a tag
//! (`<`, `<a`, `<ai-`, `</ai-quest`) is held back from the last markdown span as well.
//! A closing tag of the family that matches no open element is dropped from markdown.

use crate::ir::element::RawSpan;
use crate::scanning::vocabulary::{is_identifier_char, TagVocabulary};

/// Scans `text` into spans. `streaming` is false only for the terminal build.
pub fn scan_blocks<'a>(text: &'a str, tags: &TagVocabulary, streaming: bool) -> Vec<RawSpan<'a>> {
    let opening = tags.opening_literal();
    let closing_prefix = tags.closing_literal();
    let mut spans = Vec::new();
    let mut pos = 0;
    let mut search = 0;

    loop {
        let Some(start) = find_opening(text, &opening, search) else {
            let mut tail = &text[pos..];
            if streaming {
                tail = hold_back_partial_closing(tail, &closing_prefix);
                tail = hold_back_partial_literal(tail, &closing_prefix);
                tail = hold_back_partial_literal(tail, &opening);
            }
            push_markdown(&mut spans, tail, &closing_prefix);
            break;
        };

        let name_end = start + opening.len() + identifier_len(&text[start + opening.len()..]);
        let name = &text[start + 1..name_end];

        let end = match opening_tag_end(text, name_end) {
            Some((end, true)) => Some(end),
            Some((end, false)) => {
                let closing = format!("</{name}>");
                text[end..].find(&closing).map(|at| end + at + closing.len())
            }
            None => None,
        };

        push_markdown(&mut spans, &text[pos..start], &closing_prefix);
        match end {
            Some(end) => {
                spans.push(RawSpan::Xml {
                    name,
                    source: &text[start..end],
                });
                pos = end;
                search = end;
            }
            None => {
                spans.push(RawSpan::IncompleteXml {
                    name,
                    source: &text[start..],
                });
                break;
            }
        }
    }

    spans
}

/// Next opening literal at or after `from` that is followed by at least one name character.
fn find_opening(text: &str, opening: &str, from: usize) -> Option<usize> {
    let mut from = from;
    while let Some(found) = text[from..].find(opening) {
        let start = from + found;
        let after = start + opening.len();
        if text[after..].starts_with(is_identifier_char) {
            return Some(start);
        }
        from = after;
    }
    None
}

/// Length of the identifier run that starts `text`.
pub(crate) fn identifier_len(text: &str) -> usize {
    text.find(|c: char| !is_identifier_char(c)).unwrap_or(text.len())
}

/// Finds the `>` that ends an opening tag, skipping quoted attribute values.
///
/// Returns the byte offset just past the `>` and whether the tag is self-closing.
pub(crate) fn opening_tag_end(text: &str, from: usize) -> Option<(usize, bool)> {
    let mut quote: Option<char> = None;
    let mut previous = '\0';
    for (offset, c) in text[from..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '>' => return Some((from + offset + 1, previous == '/')),
                _ => {}
            },
        }
        previous = c;
    }
    None
}

/// Pushes a markdown segment, leaving out closing tags that match no opening tag.
fn push_markdown<'a>(spans: &mut Vec<RawSpan<'a>>, segment: &'a str, closing_prefix: &str) {
    let mut start = 0;
    let mut search = 0;
    while let Some(found) = segment[search..].find(closing_prefix) {
        let at = search + found;
        let name_start = at + closing_prefix.len();
        let name_end = name_start + identifier_len(&segment[name_start..]);
        if name_end > name_start && segment[name_end..].starts_with('>') {
            if at > start {
                spans.push(RawSpan::Markdown(&segment[start..at]));
            }
            start = name_end + 1;
        }
        search = name_end;
    }
    if start < segment.len() {
        spans.push(RawSpan::Markdown(&segment[start..]));
    }
}

/// Strips a suffix that is a prefix of `literal` (`<`, `<a`, ... `<ai-`).
fn hold_back_partial_literal<'a>(tail: &'a str, literal: &str) -> &'a str {
    literal
        .char_indices()
        .map(|(i, c)| &literal[..i + c.len_utf8()])
        .rev()
        .find(|partial| tail.ends_with(partial))
        .map_or(tail, |partial| &tail[..tail.len() - partial.len()])
}

/// Strips a closing tag whose name is still arriving (`</ai-quest`).
fn hold_back_partial_closing<'a>(tail: &'a str, closing_prefix: &str) -> &'a str {
    match tail.rfind(closing_prefix) {
        Some(at) => {
            let name = &tail[at + closing_prefix.len()..];
            if !name.is_empty() && identifier_len(name) == name.len() {
                &tail[..at]
            } else {
                tail
            }
        }
        None => tail,
    }
}
