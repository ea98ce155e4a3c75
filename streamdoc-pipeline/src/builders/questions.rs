//! Interactive question pass
//!
//! Every question element becomes a [`Question`]: its text is the prompt, its choice children
//! are the answer choices and an input child is the free-text field. When a build finds more
//! than one question they are wrapped in a single untitled [`QuestionGroup`], placed where the
//! first question was. A lone question stays a standalone item.
//!
//! Input elements outside a question become [`Input`] items.

use crate::builders::{BuildContext, BuildPass, Rebuild};
use crate::ir::element::Element;
use crate::ir::nodes::{Choice, Input, Item, ItemValue, Question, QuestionGroup};
use crate::scanning::vocabulary::TagVocabulary;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionPass;

impl BuildPass for QuestionPass {
    fn name(&self) -> &str {
        "questions"
    }

    fn description(&self) -> &str {
        "Builds questions, question groups and inputs"
    }

    fn apply(&self, items: Vec<Item>, context: &mut BuildContext<'_>) -> Vec<Item> {
        let mut list = Rebuild::new(context.placement, items.len());
        let mut questions = Vec::new();
        let mut anchor = None;

        for item in items {
            let Some(element) = item.value.as_element() else {
                list.keep(item);
                continue;
            };
            if context.tags.is_question(&element.name) {
                anchor.get_or_insert(list.anchor());
                questions.push(Item::new(ItemValue::Question(build_question(
                    element,
                    context.tags,
                ))));
            } else if context.tags.is_input(&element.name) {
                list.synthesize(Item::new(ItemValue::Input(build_input(element))));
            } else {
                list.keep(item);
            }
        }

        let anchor = anchor.unwrap_or_default();
        match questions.len() {
            0 => {}
            1 => list.synthesize_at(anchor, questions.remove(0)),
            count => {
                debug!(count, "grouping questions");
                list.synthesize_at(
                    anchor,
                    Item::new(ItemValue::QuestionGroup(QuestionGroup {
                        title: None,
                        questions,
                    })),
                );
            }
        }
        list.finish()
    }
}

pub fn build_question(element: &Element, tags: &TagVocabulary) -> Question {
    let mut choices = Vec::new();
    let mut input = None;
    for child in &element.children {
        if tags.is_choice(&child.name) {
            choices.extend(build_choice(child));
        } else if tags.is_input(&child.name) {
            input.get_or_insert_with(|| build_input(child));
        } else {
            debug!(name = %child.name, "ignoring unexpected child of question");
        }
    }

    Question {
        name: element
            .attribute("name")
            .or_else(|| element.attribute("id"))
            .map(str::to_string),
        prompt: element
            .text
            .clone()
            .or_else(|| element.attribute("prompt").map(str::to_string))
            .unwrap_or_default(),
        choices,
        multiple: element.flag("multiple"),
        input,
    }
}

/// A choice needs a label, from its text or its `label` attribute. The value defaults to the label.
fn build_choice(element: &Element) -> Option<Choice> {
    let label = element
        .text
        .clone()
        .or_else(|| element.attribute("label").map(str::to_string))?;
    let value = element
        .attribute("value")
        .map_or_else(|| label.clone(), str::to_string);
    Some(Choice { label, value })
}

pub fn build_input(element: &Element) -> Input {
    Input {
        name: element.attribute("name").map(str::to_string),
        label: element
            .attribute("label")
            .map(str::to_string)
            .or_else(|| element.text.clone()),
        placeholder: element.attribute("placeholder").map(str::to_string),
        multiline: element.flag("multiline"),
    }
}
