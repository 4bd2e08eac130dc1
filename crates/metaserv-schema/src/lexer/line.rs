//! Line classifications produced by the rule table.

use crate::model::IndexKind;

/// The structural role of one physical line of a schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `CREATE TABLE <name>` outside a comment.
    TableStart {
        /// Table name.
        name: &'a str,
    },
    /// A line starting with `)`, optionally carrying `ENGINE=<name>;`.
    TableEnd {
        /// Engine name, if the line has an engine clause.
        engine: Option<&'a str>,
    },
    /// A column declaration.
    Column(ColumnDecl<'a>),
    /// An index declaration.
    Index(IndexDecl),
    /// A `--` comment line.
    Comment(CommentLine<'a>),
    /// Anything else (blank lines, opening parenthesis, stray text).
    Other,
}

/// Fields captured from a column declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDecl<'a> {
    /// Column name.
    pub name: &'a str,
    /// Normalized type token.
    pub sql_type: &'a str,
    /// Whether `NOT NULL` appears on the line.
    pub not_null: bool,
    /// Token following `DEFAULT`.
    pub default_value: Option<&'a str>,
}

/// Fields captured from an index declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDecl {
    /// Index kind.
    pub kind: IndexKind,
    /// Indexed columns, comma-joined, without ASC/DESC.
    pub columns: String,
}

/// Tags found on a comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine<'a> {
    /// Description fragment carried by the line.
    pub descr: DescrTag<'a>,
    /// Content of a `<unit>` tag.
    pub unit: Option<&'a str>,
    /// Content of a `<ucd>` tag.
    pub ucd: Option<&'a str>,
}

/// How a comment line contributes to a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescrTag<'a> {
    /// `<descr>text</descr>` on a single line.
    Whole(&'a str),
    /// `<descr>text` with the closing tag on a later line.
    Open(&'a str),
    /// `text</descr>`, closing a description opened earlier.
    Close(&'a str),
    /// Text after `--` with no description tag.
    Text(&'a str),
}
