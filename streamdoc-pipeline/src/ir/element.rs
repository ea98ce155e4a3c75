//! Parsed tagged elements and the raw spans they come from.

use serde::Serialize;

/// One tagged block, parsed a single level deep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub name: String,
    /// Attributes in source order. A repeated key keeps its first position and its last value.
    pub attributes: Vec<(String, String)>,
    /// Content with child elements removed, trimmed; `None` when nothing is left
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, overwriting an earlier value for the same key in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Whether a boolean-ish attribute is switched on (`"true"`, `"yes"`, `"1"` or the bare key).
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.attribute(key).map(|v| v.trim().to_ascii_lowercase()),
            Some(v) if v == "true" || v == "yes" || v == "1" || v == key
        )
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// A maximal run of the accumulated buffer, classified by the block scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSpan<'a> {
    /// Plain markdown text
    Markdown(&'a str),
    /// One complete tagged element, opening tag through closing tag
    Xml { name: &'a str, source: &'a str },
    /// A tag whose closing tag has not arrived yet; never rendered
    IncompleteXml { name: &'a str, source: &'a str },
}
