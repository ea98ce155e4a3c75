//! XML-like document tag serialization
//!
//! Renders a [`Document`] snapshot as indented tags, one item per tag. Used for debugging and
//! for snapshot tests, where it shows ids, kinds and content at a glance.
//!
//! ## Format
//!
//! - Item kind → tag name (`markdown-text`, `question-group`, `chart`, ...)
//! - Item id and scalar fields → attributes
//! - Main text → text content, with newlines shown as `\n`
//! - Nested items and item parts → nested tags
//! - Errors → `<error>` tags after the items
//!
//! ## Example
//!
//! ```text
//! <document finished="true" page-control="submit">
//!   <markdown-text id="1">Pick one:</markdown-text>
//!   <question id="2" name="color">Favourite colour?
//!     <choice value="r">Red</choice>
//!   </question>
//! </document>
//! ```

use crate::error::{PipelineError, Stage};
use crate::format::Format;
use crate::ir::element::Element;
use crate::ir::nodes::{
    Document, Input, Item, ItemValue, PageControl, Question, Timestamp, Widget,
};

/// One rendered tag.
struct Node {
    tag: &'static str,
    attributes: Vec<(&'static str, String)>,
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn new(tag: &'static str) -> Self {
        Node {
            tag,
            attributes: Vec::new(),
            label: String::new(),
            children: Vec::new(),
        }
    }

    fn attr(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attributes.push((key, value.to_string()));
        self
    }

    fn attr_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    fn flag(self, key: &'static str, on: bool) -> Self {
        if on {
            self.attr(key, "true")
        } else {
            self
        }
    }

    fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    fn render(&self, indent_level: usize, output: &mut String) {
        let indent = "  ".repeat(indent_level);
        output.push_str(&format!("{indent}<{}", self.tag));
        for (key, value) in &self.attributes {
            output.push_str(&format!(" {key}=\"{}\"", escape_xml(value)));
        }
        output.push('>');
        output.push_str(&escape_label(&self.label));

        if self.children.is_empty() {
            output.push_str(&format!("</{}>\n", self.tag));
        } else {
            output.push('\n');
            for child in &self.children {
                child.render(indent_level + 1, output);
            }
            output.push_str(&format!("{indent}</{}>\n", self.tag));
        }
    }
}

fn item_node(item: &Item) -> Node {
    let node = Node::new(item.value.kind_name()).attr("id", &item.id);
    match &item.value {
        ItemValue::MarkdownText(markdown) => node.label(markdown.text.as_str()),
        ItemValue::MarkdownTable(table) => {
            let node = node.child(Node::new("header").label(table.headers.join(" | ")));
            table.rows.iter().fold(node, |node, row| {
                node.child(Node::new("row").label(row.join(" | ")))
            })
        }
        ItemValue::Question(question) => question_node(node, question),
        ItemValue::QuestionGroup(group) => group
            .questions
            .iter()
            .fold(node.attr_opt("title", group.title.as_deref()), |node, q| {
                node.child(item_node(q))
            }),
        ItemValue::RawXml(element) => element_node(node, element),
        ItemValue::Widget(Widget::Trend(trend)) => {
            trend
                .points
                .iter()
                .fold(node.label(trend.scenario.as_str()), |node, point| {
                    let timestamp = match &point.timestamp {
                        Timestamp::Epoch(seconds) => seconds.to_string(),
                        Timestamp::Text(text) => text.clone(),
                    };
                    node.child(
                        Node::new("point")
                            .attr("likelihood", point.likelihood)
                            .attr("timestamp", timestamp),
                    )
                })
        }
        ItemValue::Widget(Widget::Chart(chart)) => {
            let mut node = node.label(chart.title.as_str());
            for series in &chart.series {
                let values: Vec<_> = series.values.iter().map(f64::to_string).collect();
                node = node.child(
                    Node::new("series")
                        .attr("name", &series.name)
                        .label(values.join(", ")),
                );
            }
            if !chart.labels.is_empty() {
                node = node.child(Node::new("labels").label(chart.labels.join(" | ")));
            }
            node
        }
        ItemValue::Container(container) => container.widgets.iter().fold(
            node.attr_opt("title", container.title.as_deref())
                .label(container.body.clone().unwrap_or_default()),
            |node, widget| node.child(item_node(widget)),
        ),
        ItemValue::Input(input) => input_node(node, input),
    }
}

fn question_node(node: Node, question: &Question) -> Node {
    let mut node = node
        .attr_opt("name", question.name.as_deref())
        .flag("multiple", question.multiple)
        .label(question.prompt.as_str());
    for choice in &question.choices {
        node = node.child(
            Node::new("choice")
                .attr("value", &choice.value)
                .label(choice.label.as_str()),
        );
    }
    if let Some(input) = &question.input {
        node = node.child(input_node(Node::new("input"), input));
    }
    node
}

fn input_node(node: Node, input: &Input) -> Node {
    node.attr_opt("name", input.name.as_deref())
        .attr_opt("placeholder", input.placeholder.as_deref())
        .flag("multiline", input.multiline)
        .label(input.label.clone().unwrap_or_default())
}

fn element_node(node: Node, element: &Element) -> Node {
    let mut node = node.attr("name", &element.name);
    for (key, value) in &element.attributes {
        node = node.child(Node::new("attribute").attr("key", key).label(value.as_str()));
    }
    for child in &element.children {
        node = node.child(element_node(Node::new("element"), child));
    }
    node.label(element.text.clone().unwrap_or_default())
}

fn error_node(error: &PipelineError) -> Node {
    let node = Node::new("error").attr("stage", stage_name(error.stage));
    let node = match error.item_index {
        Some(index) => node.attr("item", index),
        None => node,
    };
    node.label(error.kind.to_string())
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Transport => "transport",
        Stage::Frame => "frame",
        Stage::Options => "options",
        Stage::Widget => "widget",
        Stage::Question => "question",
        Stage::Format => "format",
    }
}

fn page_control_name(control: PageControl) -> &'static str {
    match control {
        PageControl::None => "none",
        PageControl::Submit => "submit",
        PageControl::Back => "back",
        PageControl::Next => "next",
    }
}

/// Serialize a document to the tag format
pub fn serialize_document(doc: &Document) -> String {
    let mut result = String::new();
    result.push_str(&format!(
        "<document finished=\"{}\" page-control=\"{}\">\n",
        doc.finished,
        page_control_name(doc.options.page.control)
    ));
    for item in &doc.items {
        item_node(item).render(1, &mut result);
    }
    for error in &doc.errors {
        error_node(error).render(1, &mut result);
    }
    result.push_str("</document>");
    result
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&apos;")
}

fn escape_label(text: &str) -> String {
    escape_xml(text).replace('\n', "\\n")
}

/// Format implementation for XML-like tag format
pub struct TagFormat;

impl Format for TagFormat {
    fn name(&self) -> &str {
        "tag"
    }

    fn description(&self) -> &str {
        "XML-like tag format with hierarchical structure"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tag"]
    }

    fn serialize(&self, doc: &Document) -> Result<String, PipelineError> {
        Ok(serialize_document(doc))
    }
}
