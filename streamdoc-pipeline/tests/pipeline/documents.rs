use crate::common::{kinds, markdown_texts, REPORT};
use streamdoc_pipeline::ir::nodes::{Chart, Series, Timestamp, TrendPoint, Widget};
use streamdoc_pipeline::{
    build_document, Document, DocumentBuilder, ErrorKind, ItemValue, PageControl, PipelineOptions,
    Placement, Stage, TagVocabulary,
};

fn build(text: &str) -> Document {
    build_document(text, &PipelineOptions::default())
}

#[test]
fn test_report_structure() {
    let doc = build(REPORT);

    assert!(doc.finished);
    assert!(doc.errors.is_empty(), "unexpected errors: {:?}", doc.errors);
    assert_eq!(doc.options.page.control, PageControl::Submit);
    assert_eq!(
        kinds(&doc),
        vec!["markdown-text", "markdown-table", "container", "question-group"]
    );

    let ids: Vec<_> = doc.walk().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "3-1.1", "3-1.2", "4", "4-1.1", "4-1.2"]);

    // the heading moved onto the container, leaving no empty markdown behind
    assert_eq!(
        markdown_texts(&doc),
        vec!["# Quarterly outlook\n\nRevenue grew in every region."]
    );
}

#[test]
fn test_report_table() {
    let doc = build(REPORT);
    let ItemValue::MarkdownTable(table) = &doc.items[1].value else {
        panic!("expected a table, got {:?}", doc.items[1].value);
    };
    assert_eq!(table.headers, vec!["Region", "Q1", "Q2"]);
    assert_eq!(
        table.rows,
        vec![vec!["EU", "10", "12"], vec!["US", "14", "15"]]
    );
}

#[test]
fn test_report_container() {
    let doc = build(REPORT);
    let ItemValue::Container(container) = &doc.items[2].value else {
        panic!("expected a container, got {:?}", doc.items[2].value);
    };
    assert_eq!(container.title.as_deref(), Some("Scenarios"));
    assert_eq!(container.body, None);

    let trend = doc.find("3-1.1").expect("trend widget");
    let ItemValue::Widget(Widget::Trend(trend)) = &trend.value else {
        panic!("expected a trend, got {:?}", trend.value);
    };
    assert_eq!(trend.scenario, "Base case");
    assert_eq!(
        trend.points,
        vec![
            TrendPoint {
                likelihood: 0.6,
                timestamp: Timestamp::Text("2025-01".to_string()),
            },
            TrendPoint {
                likelihood: 0.7,
                timestamp: Timestamp::Text("2025-02".to_string()),
            },
        ]
    );

    let chart = doc.find("3-1.2").expect("chart widget");
    assert_eq!(
        chart.value,
        ItemValue::Widget(Widget::Chart(Chart {
            title: "Revenue".to_string(),
            series: vec![Series {
                name: "EU".to_string(),
                values: vec![10.0, 12.0],
            }],
            labels: vec![],
        }))
    );
}

#[test]
fn test_report_questions() {
    let doc = build(REPORT);
    let ItemValue::QuestionGroup(group) = &doc.items[3].value else {
        panic!("expected a question group, got {:?}", doc.items[3].value);
    };
    assert_eq!(group.title, None);
    assert_eq!(group.questions.len(), 2);

    let ItemValue::Question(focus) = &group.questions[0].value else {
        panic!("expected a question");
    };
    assert_eq!(focus.name.as_deref(), Some("focus"));
    assert_eq!(focus.prompt, "Which region should we focus on?");
    let values: Vec<_> = focus.choices.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["eu", "us"]);

    let ItemValue::Question(notes) = &group.questions[1].value else {
        panic!("expected a question");
    };
    let input = notes.input.as_ref().expect("free-text input");
    assert_eq!(input.placeholder.as_deref(), Some("Optional"));
    assert!(input.multiline);
    assert!(notes.choices.is_empty());
}

#[test]
fn test_minimal_table() {
    let doc = build("a|b\n-|-\n1|2\n");
    assert_eq!(kinds(&doc), vec!["markdown-table"]);
    let ItemValue::MarkdownTable(table) = &doc.items[0].value else {
        panic!("expected a table");
    };
    assert_eq!(table.headers, vec!["a", "b"]);
    assert_eq!(table.rows, vec![vec!["1", "2"]]);
}

#[test]
fn test_tables_between_elements() {
    let text = "Before\n\nx|y\n-|-\n1|2\n\
        <ai-question>Ok?</ai-question>\n\
        p|q\n-|-\n3|4\n\nAfter";
    let doc = build(text);
    assert_eq!(
        kinds(&doc),
        vec![
            "markdown-text",
            "markdown-table",
            "question",
            "markdown-table",
            "markdown-text"
        ]
    );
    assert_eq!(markdown_texts(&doc), vec!["Before", "After"]);
}

#[test]
fn test_single_question_and_loose_input() {
    let text = "<ai-question>Proceed?<ai-choice>Yes</ai-choice><ai-choice>No</ai-choice></ai-question>\n\
        <ai-input name=\"email\" label=\"Email\"/>";
    let doc = build(text);
    assert_eq!(kinds(&doc), vec!["question", "input"]);
    let ItemValue::Input(input) = &doc.items[1].value else {
        panic!("expected an input");
    };
    assert_eq!(input.name.as_deref(), Some("email"));
    assert_eq!(input.label.as_deref(), Some("Email"));
}

#[test]
fn test_question_group_placement() {
    let text = "<ai-question>A?</ai-question>\nMiddle\n<ai-question>B?</ai-question>";

    let anchored = build(text);
    assert_eq!(kinds(&anchored), vec!["question-group", "markdown-text"]);

    let options = PipelineOptions {
        placement: Placement::Append,
        ..PipelineOptions::default()
    };
    let appended = build_document(text, &options);
    assert_eq!(kinds(&appended), vec!["markdown-text", "question-group"]);
}

#[test]
fn test_page_control_last_directive_wins() {
    let text = "<ai-option name=\"page.control\" value=\"back\"/>Body\n\
        <ai-option name=\"page.control\">next</ai-option>\n\
        <ai-option name=\"theme\" value=\"dark\"/>";
    let doc = build(text);
    assert_eq!(doc.options.page.control, PageControl::Next);
    // unknown directives are left for the renderer to ignore
    assert_eq!(kinds(&doc), vec!["markdown-text", "raw-xml"]);
}

#[test]
fn test_unknown_page_control_value() {
    let doc = build("<ai-option name=\"page.control\" value=\"finish\"/>");
    assert_eq!(doc.options.page.control, PageControl::None);
    assert!(doc.items.is_empty());
}

#[test]
fn test_widget_errors_do_not_stop_later_items() {
    let text = "<ai-viz name=\"PIE\">{}</ai-viz>\n\
        <ai-viz name=\"chart\">{\"title\": 5}</ai-viz>\n\
        <ai-viz name=\"chart\">{\"title\": \"Ok\"}</ai-viz>\n\
        After";
    let doc = build(text);
    assert_eq!(kinds(&doc), vec!["chart", "markdown-text"]);
    assert_eq!(doc.errors.len(), 2);
    assert!(doc.errors.iter().all(|e| e.stage == Stage::Widget));
    assert_eq!(
        doc.errors[0].kind,
        ErrorKind::UnknownWidget {
            name: "PIE".to_string()
        }
    );
    assert_eq!(doc.errors[0].item_index, Some(0));
    assert!(matches!(doc.errors[1].kind, ErrorKind::WidgetJson { .. }));
    assert_eq!(doc.errors[1].item_index, Some(1));
}

#[test]
fn test_unclosed_element_is_dropped_from_the_final_build() {
    let doc = build("Intro\n<ai-question>Never closed");
    assert_eq!(markdown_texts(&doc), vec!["Intro"]);
    assert_eq!(kinds(&doc), vec!["markdown-text"]);
}

#[test]
fn test_custom_vocabulary() {
    let options = PipelineOptions {
        tags: TagVocabulary {
            prefix: "x-".to_string(),
            ..TagVocabulary::default()
        },
        ..PipelineOptions::default()
    };
    let doc = build_document("<x-question>Q?</x-question><ai-question>Not ours</ai-question>", &options);
    assert_eq!(kinds(&doc), vec!["question", "markdown-text"]);
}

#[test]
fn test_builder_without_passes_keeps_raw_elements() {
    let builder = DocumentBuilder::new(&PipelineOptions::default());
    let doc = builder.build(REPORT, true);
    assert_eq!(doc.options.page.control, PageControl::None);
    assert_eq!(
        kinds(&doc),
        vec![
            "markdown-text",
            "markdown-table",
            "markdown-text",
            "raw-xml",
            "raw-xml",
            "raw-xml",
            "raw-xml"
        ]
    );
    // visualizations stay children of their container
    let container = doc.items[3].value.as_element().expect("container element");
    assert_eq!(container.children.len(), 2);
}
