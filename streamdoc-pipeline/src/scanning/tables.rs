//! Markdown and pipe-table extraction
//!
//! A markdown span becomes an ordered run of [`MarkdownText`] and [`MarkdownTable`] values.
//! Every block of "header row, separator row, one or more data rows" is a table; the text
//! around it stays markdown.
//!
//! The span at the end of a still-streaming buffer may stop in the middle of a table. For that
//! span the extractor holds back the row being written, plus any trailing `|` lines that have
//! not yet formed a complete table (a header waiting for its separator or first data row).
//! See [`TailRows`].

use crate::ir::nodes::{ItemValue, MarkdownTable, MarkdownText};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Last line of the text when it contains a pipe and has no terminating newline.
static PARTIAL_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\A|\n)[^\n]*\|[^\n]*\z").expect("valid partial row regex"));

static TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(?P<header>[^\n]*\|[^\n]*)\n(?P<sep>[ \t]*\|?(?:[ \t]*:?-+:?[ \t]*\|)*[ \t]*:?-+:?[ \t]*\|?[ \t]*)\r?\n(?P<body>(?:[^\n]*\|[^\n]*(?:\n|\z))+)",
    )
    .expect("valid table regex")
});

/// How much of a span's end is treated as table rows still being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailRows {
    /// Everything is emitted.
    Keep,
    /// A last `|` line without a terminating newline is dropped.
    StripPartial,
    /// The span ends a buffer that is still growing. Besides the partial row, trailing `|`
    /// lines that have not formed a table yet, a separator row in progress and an
    /// unterminated line right after a table are held back.
    HoldBack,
}

/// Splits one markdown span into text and table values.
pub fn extract_markdown(span: &str, tail: TailRows) -> Vec<ItemValue> {
    let span = match tail {
        TailRows::Keep => span,
        TailRows::StripPartial | TailRows::HoldBack => strip_partial_row(span),
    };

    let mut values = Vec::new();
    let mut pos = 0;
    for caps in TABLE.captures_iter(span) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut values, &span[pos..whole.start()]);
        values.push(ItemValue::MarkdownTable(table_from_captures(&caps)));
        pos = whole.end();
    }

    let mut rest = &span[pos..];
    if tail == TailRows::HoldBack {
        if pos > 0 && !rest.contains('\n') {
            // may be the table's next row
            rest = "";
        }
        rest = hold_back_pending_rows(rest);
    }
    push_text(&mut values, rest);
    values
}

/// Removes a row that is still being written.
pub fn strip_partial_row(text: &str) -> &str {
    match PARTIAL_ROW.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Drops trailing lines containing `|` that did not become part of a table, along with a
/// separator row in progress below them.
fn hold_back_pending_rows(text: &str) -> &str {
    let mut text = text;
    let mut first = true;
    loop {
        let trimmed = text.trim_end_matches(['\n', '\r']);
        let line_start = trimmed.rfind('\n').map_or(0, |i| i + 1);
        let line = &trimmed[line_start..];
        let pending = line.contains('|')
            || (first && is_separator_fragment(line) && previous_line_has_pipe(trimmed, line_start));
        if !pending {
            return text;
        }
        text = &trimmed[..line_start];
        first = false;
    }
}

fn is_separator_fragment(line: &str) -> bool {
    line.contains('-') && line.chars().all(|c| matches!(c, '-' | ':' | ' ' | '\t'))
}

fn previous_line_has_pipe(text: &str, line_start: usize) -> bool {
    let before = text[..line_start].trim_end_matches(['\n', '\r']);
    let start = before.rfind('\n').map_or(0, |i| i + 1);
    line_start > 0 && before[start..].contains('|')
}

fn push_text(values: &mut Vec<ItemValue>, text: &str) {
    let text = text.trim_matches(['\n', '\r']);
    if !text.trim().is_empty() {
        values.push(ItemValue::MarkdownText(MarkdownText {
            text: text.to_string(),
        }));
    }
}

fn table_from_captures(caps: &Captures<'_>) -> MarkdownTable {
    let headers = caps
        .name("header")
        .map(|m| parse_table_row(m.as_str()))
        .unwrap_or_default();
    let rows = caps
        .name("body")
        .map(|m| {
            m.as_str()
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(parse_table_row)
                .collect()
        })
        .unwrap_or_default();
    MarkdownTable { headers, rows }
}

fn parse_table_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);

    line.split('|').map(|s| s.trim().to_string()).collect()
}
