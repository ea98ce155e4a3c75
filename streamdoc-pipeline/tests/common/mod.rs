//! Frame builders and document helpers shared by the suites.

#![allow(dead_code)]

use serde_json::{json, Value};
use streamdoc_pipeline::formats::tag::serialize_document;
use streamdoc_pipeline::{Document, ItemValue};

/// A representative response: prose, a table, a titled container with two widgets, two
/// questions and a page directive.
pub const REPORT: &str = r#"# Quarterly outlook

Revenue grew in every region.

| Region | Q1 | Q2 |
|:-------|---:|---:|
| EU | 10 | 12 |
| US | 14 | 15 |

### Scenarios
<ai-container>
<ai-viz name="TREND">{"scenario": "Base case", "points": [{"likelihood": 0.6, "timestamp": "2025-01"}, {"likelihood": 0.7, "timestamp": "2025-02"}]}</ai-viz>
<ai-viz name="chart">{"title": "Revenue", "series": [{"name": "EU", "values": [10, 12]}]}</ai-viz>
</ai-container>

<ai-question name="focus">Which region should we focus on?
<ai-choice value="eu">Europe</ai-choice>
<ai-choice value="us">United States</ai-choice>
</ai-question>
<ai-question name="notes">Anything else?<ai-input name="notes" placeholder="Optional" multiline="true"/></ai-question>
<ai-option name="page.control" value="submit"/>
"#;

fn event(value: Value) -> Vec<u8> {
    format!("data: {value}\n\n").into_bytes()
}

/// One data frame carrying a text delta.
pub fn frame(text: &str) -> Vec<u8> {
    event(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
}

/// The last data frame of a response, with its finish reason.
pub fn finish_frame(text: &str, reason: &str) -> Vec<u8> {
    event(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": reason}]
    }))
}

pub fn error_frame(code: i64, status: &str, message: &str) -> Vec<u8> {
    event(json!({"error": {"code": code, "status": status, "message": message}}))
}

pub fn done_frame() -> Vec<u8> {
    b"data: [DONE]\n\n".to_vec()
}

/// `text` split into deltas of `chars_per_delta` characters, framed and concatenated.
pub fn frames_of(text: &str, chars_per_delta: usize) -> Vec<u8> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chars_per_delta.max(1))
        .flat_map(|delta| frame(&delta.iter().collect::<String>()))
        .collect()
}

pub fn kinds(doc: &Document) -> Vec<&'static str> {
    doc.items.iter().map(|item| item.value.kind_name()).collect()
}

/// Every markdown text of the document, nested ones included.
pub fn markdown_texts(doc: &Document) -> Vec<&str> {
    doc.walk()
        .filter_map(|item| item.value.as_markdown_text())
        .collect()
}

/// Every piece of text the renderer would draw.
pub fn rendered_texts(doc: &Document) -> Vec<String> {
    let mut texts = Vec::new();
    for item in doc.walk() {
        match &item.value {
            ItemValue::MarkdownText(markdown) => texts.push(markdown.text.clone()),
            ItemValue::MarkdownTable(table) => {
                texts.extend(table.headers.iter().cloned());
                texts.extend(table.rows.iter().flatten().cloned());
            }
            ItemValue::Question(question) => {
                texts.push(question.prompt.clone());
                texts.extend(question.choices.iter().map(|c| c.label.clone()));
            }
            ItemValue::Container(container) => {
                texts.extend(container.title.iter().cloned());
                texts.extend(container.body.iter().cloned());
            }
            ItemValue::Input(input) => texts.extend(input.label.iter().cloned()),
            _ => {}
        }
    }
    texts
}

pub fn render(doc: &Document) -> String {
    serialize_document(doc)
}
