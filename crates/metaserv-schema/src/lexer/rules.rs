//! The line-classification rule table.
//!
//! Every rule is a regular expression with named groups, compiled once and
//! evaluated against a single physical line. Rules never look at neighbouring
//! lines; deciding what a classification means is the parser's job.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::line::{ColumnDecl, CommentLine, DescrTag, IndexDecl, Line};
use crate::model::IndexKind;

/// Type token rewritten to its canonical spelling.
const FLOAT_ZERO: &str = "FLOAT(0)";

/// Direction qualifiers dropped from index column lists.
const DIRECTIONS: [&str; 2] = ["ASC", "DESC"];

struct Rules {
    /// `--` as the first non-whitespace content.
    comment: Regex,
    table_start: Regex,
    /// Engine clause of a closing line.
    table_end: Regex,
    /// Leading identifier followed by a type token (or index keyword pair).
    declaration: Regex,
    index_columns: Regex,
    default_value: Regex,
    descr_whole: Regex,
    descr_open: Regex,
    descr_close: Regex,
    comment_text: Regex,
    unit: Regex,
    ucd: Regex,
}

impl Rules {
    fn new() -> Self {
        Self {
            comment: compile(r"^\s*--"),
            table_start: compile(r"CREATE TABLE (?P<name>\w+)"),
            table_end: compile(r"^\)\s*(?:ENGINE|TYPE)\s*=\s*(?P<engine>\w+)\s*;"),
            declaration: compile(r"^\s*(?P<name>\w+)\s+(?P<type>\w\S*)"),
            index_columns: compile(r"\((?P<columns>.+?)\)"),
            default_value: compile(r"\sDEFAULT\s+(?P<value>\S+)"),
            descr_whole: compile(r"<descr>(?P<text>.*)</descr>"),
            descr_open: compile(r"<descr>(?P<text>.*)"),
            descr_close: compile(r"--(?P<text>.*)</descr>"),
            comment_text: compile(r"--(?P<text>.*)"),
            unit: compile(r"<unit>(?P<unit>.+)</unit>"),
            ucd: compile(r"<ucd>(?P<ucd>.+)</ucd>"),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid line rule")
}

static RULES: LazyLock<Rules> = LazyLock::new(Rules::new);

fn capture<'h>(rule: &Regex, line: &'h str, group: &str) -> Option<&'h str> {
    rule.captures(line)
        .and_then(|caps| caps.name(group))
        .map(|m| m.as_str())
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Classifies one line of a schema file.
///
/// Rules are tried in priority order: table start (unless the line is a
/// comment), table end, column or index declaration, comment.
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    let rules = &*RULES;
    let is_comment = rules.comment.is_match(line);

    if !is_comment {
        if let Some(name) = capture(&rules.table_start, line, "name") {
            return Line::TableStart { name };
        }
    }

    if line.starts_with(')') {
        return Line::TableEnd {
            engine: capture(&rules.table_end, line, "engine"),
        };
    }

    if let Some(caps) = rules.declaration.captures(line) {
        let name = group(&caps, "name");
        return match IndexKind::from_keyword(name) {
            Some(kind) => Line::Index(IndexDecl {
                kind,
                columns: index_columns(line),
            }),
            None => Line::Column(column_decl(name, group(&caps, "type"), line)),
        };
    }

    if is_comment {
        return Line::Comment(comment_line(line));
    }

    Line::Other
}

fn column_decl<'a>(name: &'a str, type_token: &'a str, line: &'a str) -> ColumnDecl<'a> {
    let sql_type = type_token.trim_end_matches(',');
    let sql_type = if sql_type == FLOAT_ZERO { "FLOAT" } else { sql_type };

    ColumnDecl {
        name,
        sql_type,
        not_null: line.contains("NOT NULL"),
        default_value: capture(&RULES.default_value, line, "value")
            .map(|value| value.trim_end_matches(',')),
    }
}

fn index_columns(line: &str) -> String {
    let Some(list) = capture(&RULES.index_columns, line, "columns") else {
        return String::new();
    };

    list.split(',')
        .map(|expr| {
            expr.split_whitespace()
                .filter(|word| !DIRECTIONS.contains(word))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn comment_line(line: &str) -> CommentLine<'_> {
    let rules = &*RULES;

    let descr = if let Some(text) = capture(&rules.descr_whole, line, "text") {
        DescrTag::Whole(text)
    } else if let Some(text) = capture(&rules.descr_open, line, "text") {
        DescrTag::Open(text)
    } else if let Some(text) = capture(&rules.descr_close, line, "text") {
        DescrTag::Close(text.trim_end())
    } else {
        DescrTag::Text(capture(&rules.comment_text, line, "text").unwrap_or(""))
    };

    CommentLine {
        descr,
        unit: capture(&rules.unit, line, "unit"),
        ucd: capture(&rules.ucd, line, "ucd"),
    }
}
