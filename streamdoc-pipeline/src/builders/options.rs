//! Layout directive pass
//!
//! `<ai-option name="page.control" value="submit"/>` sets the page control of the document
//! and disappears from the item list. When several directives appear, the last one wins.
//! Option elements with any other `name` are left alone.

use crate::builders::{BuildContext, BuildPass};
use crate::ir::nodes::{Item, PageControl};
use tracing::debug;

/// `name` attribute of the page control directive.
pub const PAGE_CONTROL: &str = "page.control";

#[derive(Debug, Clone, Copy, Default)]
pub struct OptionPass;

impl BuildPass for OptionPass {
    fn name(&self) -> &str {
        "options"
    }

    fn description(&self) -> &str {
        "Applies layout directives to the document options"
    }

    fn apply(&self, items: Vec<Item>, context: &mut BuildContext<'_>) -> Vec<Item> {
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let directive = item.value.as_element().filter(|element| {
                context.tags.is_option(&element.name)
                    && element.attribute("name") == Some(PAGE_CONTROL)
            });
            match directive {
                Some(element) => {
                    let value = element
                        .attribute("value")
                        .or(element.text.as_deref())
                        .unwrap_or_default();
                    let control = PageControl::from_value(value);
                    debug!(?control, value, "page control directive");
                    context.options.page.control = control;
                }
                None => kept.push(item),
            }
        }
        kept
    }
}
