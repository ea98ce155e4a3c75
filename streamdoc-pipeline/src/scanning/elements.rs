//! Element parsing
//!
//! Turns the source of one complete tagged span into an [`Element`]. The root element's content
//! is scanned once more for child elements (answer choices, inputs, visualizations); the content
//! of those children is kept as text. A span whose structure does not hold up (closing tag that
//! does not match, unterminated attribute quote, trailing garbage after a self-closing tag) yields
//! no element at all.

use crate::ir::element::{Element, RawSpan};
use crate::scanning::blocks::{identifier_len, opening_tag_end, scan_blocks};
use crate::scanning::vocabulary::TagVocabulary;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Levels of elements parsed out of one span: the root and its direct children.
pub const MAX_ELEMENT_DEPTH: usize = 2;

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute regex")
});

/// Parses one complete span, as produced by the block scanner.
pub fn parse_element(source: &str, tags: &TagVocabulary) -> Option<Element> {
    parse_at_depth(source, tags, 1)
}

fn parse_at_depth(source: &str, tags: &TagVocabulary, depth: usize) -> Option<Element> {
    let opening = tags.opening_literal();
    let suffix_len = identifier_len(source.strip_prefix(opening.as_str())?);
    if suffix_len == 0 {
        return None;
    }
    let name_end = opening.len() + suffix_len;
    let name = &source[1..name_end];

    let (tag_end, self_closing) = opening_tag_end(source, name_end)?;
    let attribute_text = if self_closing {
        &source[name_end..tag_end - 2]
    } else {
        &source[name_end..tag_end - 1]
    };

    let mut element = Element::new(name);
    for caps in ATTRIBUTE.captures_iter(attribute_text) {
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3))) else {
            continue;
        };
        element.set_attribute(key.as_str(), unescape_entities(value.as_str()));
    }

    if self_closing {
        return (tag_end == source.len()).then_some(element);
    }

    let closing = format!("</{name}>");
    let content_end = source.len().checked_sub(closing.len())?;
    if content_end < tag_end || !source.ends_with(&closing) {
        return None;
    }
    let content = &source[tag_end..content_end];

    if depth >= MAX_ELEMENT_DEPTH {
        element.text = non_empty(content.trim());
        return Some(element);
    }

    let mut text = String::new();
    for span in scan_blocks(content, tags, false) {
        match span {
            RawSpan::Markdown(markdown) => text.push_str(markdown),
            RawSpan::Xml { name, source } => match parse_at_depth(source, tags, depth + 1) {
                Some(child) => element.children.push(child),
                None => debug!(name, "dropping malformed child element"),
            },
            RawSpan::IncompleteXml { name, .. } => {
                debug!(name, "dropping unterminated child element");
            }
        }
    }
    element.text = non_empty(text.trim());
    Some(element)
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Resolves the predefined XML entities in an attribute value.
fn unescape_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
