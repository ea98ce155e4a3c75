//! Core data structures for the rendered document.

use crate::error::PipelineError;
use crate::identity::StableId;
use crate::ir::element::Element;
use serde::{Deserialize, Serialize};

/// The root of one snapshot handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Renderable items, in visual order
    pub items: Vec<Item>,
    /// True once the stream completed or failed terminally
    pub finished: bool,
    /// Recoverable errors collected while decoding and building
    pub errors: Vec<PipelineError>,
    pub options: LayoutOptions,
}

impl Document {
    /// Iterates over every item, descending into containers and question groups.
    pub fn walk(&self) -> impl Iterator<Item = &Item> {
        let mut stack: Vec<&Item> = self.items.iter().rev().collect();
        std::iter::from_fn(move || {
            let item = stack.pop()?;
            stack.extend(item.value.children().iter().rev());
            Some(item)
        })
    }

    /// Looks an item up by id, at any depth.
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.walk().find(|item| item.id.as_str() == id)
    }
}

/// One renderable entry of a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: StableId,
    #[serde(flatten)]
    pub value: ItemValue,
}

impl Item {
    /// An item whose id is stamped later by identity assignment.
    pub fn new(value: ItemValue) -> Self {
        Self {
            id: StableId::default(),
            value,
        }
    }
}

impl From<ItemValue> for Item {
    fn from(value: ItemValue) -> Self {
        Item::new(value)
    }
}

/// The closed set of things the renderer knows how to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemValue {
    MarkdownText(MarkdownText),
    MarkdownTable(MarkdownTable),
    Question(Question),
    QuestionGroup(QuestionGroup),
    /// A tagged element no builder consumed
    RawXml(Element),
    Widget(Widget),
    Container(Container),
    Input(Input),
}

impl ItemValue {
    /// Nested items, for the variants that carry them.
    pub fn children(&self) -> &[Item] {
        match self {
            ItemValue::Container(container) => &container.widgets,
            ItemValue::QuestionGroup(group) => &group.questions,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            ItemValue::Container(container) => Some(&mut container.widgets),
            ItemValue::QuestionGroup(group) => Some(&mut group.questions),
            _ => None,
        }
    }

    /// The element, if this is a raw XML item.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ItemValue::RawXml(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_markdown_text(&self) -> Option<&str> {
        match self {
            ItemValue::MarkdownText(markdown) => Some(&markdown.text),
            _ => None,
        }
    }

    /// Short variant name, used by the tag format and in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ItemValue::MarkdownText(_) => "markdown-text",
            ItemValue::MarkdownTable(_) => "markdown-table",
            ItemValue::Question(_) => "question",
            ItemValue::QuestionGroup(_) => "question-group",
            ItemValue::RawXml(_) => "raw-xml",
            ItemValue::Widget(Widget::Trend(_)) => "trend",
            ItemValue::Widget(Widget::Chart(_)) => "chart",
            ItemValue::Container(_) => "container",
            ItemValue::Input(_) => "input",
        }
    }
}

/// A run of markdown source rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownText {
    pub text: String,
}

/// A pipe table. The separator row is never part of `rows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A single interactive question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// Answer key, taken from the element's `name` (or `id`) attribute
    pub name: Option<String>,
    pub prompt: String,
    pub choices: Vec<Choice>,
    /// Whether several choices may be selected
    pub multiple: bool,
    /// Free-text answer field
    pub input: Option<Input>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

/// Several questions presented together. Children are [`ItemValue::Question`] items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionGroup {
    pub title: Option<String>,
    pub questions: Vec<Item>,
}

/// A free-text input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Input {
    pub name: Option<String>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub multiline: bool,
}

/// A titled group of widgets. Children are [`ItemValue::Widget`] items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub title: Option<String>,
    /// Text inside the container that is not part of a child element
    pub body: Option<String>,
    pub widgets: Vec<Item>,
}

/// A visualization decoded from streamed JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Trend(Trend),
    Chart(Chart),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub scenario: String,
    #[serde(default)]
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub likelihood: f64,
    pub timestamp: Timestamp,
}

/// Models write timestamps either as text or as epoch numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub values: Vec<f64>,
}

/// Document-wide layout directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutOptions {
    pub page: PageOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageOptions {
    pub control: PageControl,
}

/// Which navigation control the page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageControl {
    #[default]
    None,
    Submit,
    Back,
    Next,
}

impl PageControl {
    /// Maps a directive value; anything unrecognized means no control.
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "submit" => PageControl::Submit,
            "back" => PageControl::Back,
            "next" => PageControl::Next,
            _ => PageControl::None,
        }
    }
}
