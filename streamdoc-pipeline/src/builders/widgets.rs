//! Visualization pass
//!
//! Builds [`Widget`] items from visualization elements and [`Container`] items from container
//! elements. A visualization's `name` attribute selects the schema (`TREND` or `CHART`, in any
//! case) and its content is JSON, completed with [`partial_json::complete`] before decoding.
//! A visualization that cannot be decoded is dropped and recorded as an error.
//!
//! A container takes its title from a markdown heading that directly precedes it; the heading
//! line is removed from that markdown item. The container's `title` attribute is the fallback.

use crate::builders::{partial_json, BuildContext, BuildPass, Rebuild};
use crate::error::{ErrorKind, PipelineError, Stage};
use crate::ir::element::Element;
use crate::ir::nodes::{Chart, Container, Item, ItemValue, MarkdownText, Trend, Widget};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// A heading on the last line of a text.
static TRAILING_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\A|\n)[ ]{0,3}#{1,6}[ \t]+([^\n]*?)(?:[ \t]+#+)?[ \t]*\z")
        .expect("valid heading regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetPass;

impl BuildPass for WidgetPass {
    fn name(&self) -> &str {
        "widgets"
    }

    fn description(&self) -> &str {
        "Decodes trend and chart visualizations and their containers"
    }

    fn apply(&self, mut items: Vec<Item>, context: &mut BuildContext<'_>) -> Vec<Item> {
        let titles = take_container_titles(&mut items, context);

        let mut list = Rebuild::new(context.placement, items.len());
        for (index, (item, title)) in items.into_iter().zip(titles).enumerate() {
            let element = match &item.value {
                ItemValue::MarkdownText(markdown) if markdown.text.is_empty() => continue,
                ItemValue::RawXml(element) => element,
                _ => {
                    list.keep(item);
                    continue;
                }
            };

            if context.tags.is_container(&element.name) {
                let container = build_container(element, title, index, context);
                list.synthesize(Item::new(ItemValue::Container(container)));
            } else if context.tags.is_viz(&element.name) {
                match decode_widget(element) {
                    Ok(widget) => list.synthesize(Item::new(ItemValue::Widget(widget))),
                    Err(kind) => record(context, index, kind),
                }
            } else {
                list.keep(item);
            }
        }
        list.finish()
    }
}

/// Moves trailing headings of markdown items onto the containers that follow them.
///
/// Returns one title slot per item. A markdown item that held nothing but the heading is left
/// empty, and skipped by the caller.
fn take_container_titles(items: &mut [Item], context: &BuildContext<'_>) -> Vec<Option<String>> {
    let mut titles = vec![None; items.len()];
    for index in 1..items.len() {
        let follows_container = items[index]
            .value
            .as_element()
            .is_some_and(|element| context.tags.is_container(&element.name));
        if !follows_container {
            continue;
        }
        if let ItemValue::MarkdownText(markdown) = &mut items[index - 1].value {
            if let Some((rest, title)) = split_trailing_heading(&markdown.text) {
                titles[index] = Some(title);
                *markdown = MarkdownText { text: rest };
            }
        }
    }
    titles
}

/// Splits `"intro\n### Title"` into `("intro", "Title")`.
fn split_trailing_heading(text: &str) -> Option<(String, String)> {
    let trimmed = text.trim_end();
    let caps = TRAILING_HEADING.captures(trimmed)?;
    let title = caps.get(1)?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    let start = caps.get(0)?.start();
    let rest = trimmed[..start].trim_end_matches(['\n', '\r']);
    let rest = if rest.trim().is_empty() { "" } else { rest };
    Some((rest.to_string(), title.to_string()))
}

fn build_container(
    element: &Element,
    title: Option<String>,
    index: usize,
    context: &mut BuildContext<'_>,
) -> Container {
    let mut widgets = Vec::new();
    for child in &element.children {
        if !context.tags.is_viz(&child.name) {
            debug!(name = %child.name, "ignoring non-visualization child of container");
            continue;
        }
        match decode_widget(child) {
            Ok(widget) => widgets.push(Item::new(ItemValue::Widget(widget))),
            Err(kind) => record(context, index, kind),
        }
    }
    Container {
        title: title.or_else(|| element.attribute("title").map(str::to_string)),
        body: element.text.clone(),
        widgets,
    }
}

/// Decodes a visualization element into a widget.
pub fn decode_widget(element: &Element) -> Result<Widget, ErrorKind> {
    let kind = element.attribute("name").unwrap_or_default().trim();
    let json = element.text.as_deref().unwrap_or_default();
    match kind.to_ascii_uppercase().as_str() {
        "TREND" => decode::<Trend>("TREND", json).map(Widget::Trend),
        "CHART" => decode::<Chart>("CHART", json).map(Widget::Chart),
        _ => Err(ErrorKind::UnknownWidget {
            name: kind.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(widget: &str, json: &str) -> Result<T, ErrorKind> {
    let completed = partial_json::complete(json);
    serde_json::from_str(&completed).map_err(|e| ErrorKind::WidgetJson {
        widget: widget.to_string(),
        message: e.to_string(),
    })
}

fn record(context: &mut BuildContext<'_>, index: usize, kind: ErrorKind) {
    let error = PipelineError::at_item(Stage::Widget, index, kind);
    warn!(%error, "dropping visualization");
    context.errors.push(error);
}
