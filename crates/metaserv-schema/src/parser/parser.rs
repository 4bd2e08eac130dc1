//! Schema file parser implementation.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, SchemaError};
use crate::lexer::{classify, ColumnDecl, CommentLine, DescrTag, IndexDecl, Line};
use crate::model::{ColumnEntry, IndexEntry, SchemaModel, TableEntry};

/// Where the parser currently is, relative to table blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// No table is open.
    Outside,
    /// A table is open; comment lines describe the table or the last column.
    InTable,
    /// A multi-line column description is being accumulated.
    InColumnComment,
}

/// A table whose closing line has not been seen yet.
#[derive(Debug)]
struct OpenTable {
    name: String,
    entry: TableEntry,
    next_display_order: u32,
    /// Whether a `<descr>` was opened and its `</descr>` is still pending.
    describing: bool,
}

impl OpenTable {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entry: TableEntry::new(),
            next_display_order: 1,
            describing: false,
        }
    }

    fn add_column(&mut self, decl: &ColumnDecl<'_>) {
        let column = ColumnEntry::new(decl.name, self.next_display_order, decl.sql_type)
            .not_null(decl.not_null)
            .default_value(decl.default_value.map(str::to_string));
        self.entry.push_column(column);
        self.next_display_order += 1;
        self.describing = false;
    }

    fn add_index(&mut self, decl: IndexDecl) {
        self.entry.push_index(IndexEntry::new(decl.kind, decl.columns));
    }

    /// Routes a comment line to the last declared column, or to the table
    /// itself while no column has been declared.
    fn add_comment(&mut self, comment: &CommentLine<'_>) {
        match self.entry.columns.last_mut() {
            Some(column) => {
                accumulate(&mut column.description, &mut self.describing, comment.descr);
                if let Some(unit) = comment.unit {
                    column.unit = Some(unit.to_string());
                }
                if let Some(ucd) = comment.ucd {
                    column.ucd = Some(ucd.to_string());
                }
            }
            None => accumulate(&mut self.entry.description, &mut self.describing, comment.descr),
        }
    }
}

fn accumulate(description: &mut Option<String>, describing: &mut bool, tag: DescrTag<'_>) {
    match tag {
        DescrTag::Whole(text) => {
            *description = Some(text.to_string());
            *describing = false;
        }
        DescrTag::Open(text) => {
            *description = Some(text.to_string());
            *describing = true;
        }
        DescrTag::Close(text) if *describing => {
            description.get_or_insert_with(String::new).push_str(text);
            *describing = false;
        }
        DescrTag::Text(text) if *describing => {
            description.get_or_insert_with(String::new).push_str(text);
        }
        DescrTag::Close(_) | DescrTag::Text(_) => {}
    }
}

/// Line-by-line parser for annotated schema files.
///
/// The parser is a cursor over the input: every call to
/// [`feed_line`](Self::feed_line) classifies one line and updates the cursor.
/// Tables are added to the model only once their closing line is seen.
#[derive(Debug, Default)]
pub struct SchemaParser {
    model: SchemaModel,
    open: Option<OpenTable>,
    lines: usize,
}

impl SchemaParser {
    /// Creates a parser with an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current parse state.
    #[must_use]
    pub fn state(&self) -> ParseState {
        match &self.open {
            None => ParseState::Outside,
            Some(table) if table.describing && !table.entry.columns.is_empty() => {
                ParseState::InColumnComment
            }
            Some(_) => ParseState::InTable,
        }
    }

    /// Name of the table currently open, if any.
    #[must_use]
    pub fn current_table(&self) -> Option<&str> {
        self.open.as_ref().map(|t| t.name.as_str())
    }

    /// Name of the column that comment lines currently describe, if any.
    #[must_use]
    pub fn current_column(&self) -> Option<&str> {
        self.open
            .as_ref()
            .and_then(|t| t.entry.columns.last())
            .map(|c| c.name.as_str())
    }

    /// Returns the tables completed so far.
    #[must_use]
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    /// Feeds one line (without its terminator) to the parser.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] when a closing line completes a
    /// table whose name is already in the model.
    pub fn feed_line(&mut self, line: &str) -> Result<()> {
        self.lines += 1;

        match classify(line) {
            Line::TableStart { name } => self.open_table(name),
            Line::TableEnd { engine } => return self.close_table(engine),
            Line::Column(decl) => {
                if let Some(table) = self.open.as_mut() {
                    table.add_column(&decl);
                }
            }
            Line::Index(decl) => {
                if let Some(table) = self.open.as_mut() {
                    table.add_index(decl);
                }
            }
            Line::Comment(comment) => {
                if let Some(table) = self.open.as_mut() {
                    table.add_comment(&comment);
                }
            }
            Line::Other => {}
        }

        Ok(())
    }

    /// Finishes parsing and returns the model.
    ///
    /// A table still open at this point has no closing line and is dropped.
    #[must_use]
    pub fn finish(self) -> SchemaModel {
        if let Some(table) = self.open {
            warn!(table = %table.name, "Dropping table without closing line");
        }
        debug!(
            tables = self.model.len(),
            lines = self.lines,
            "Finished parsing schema"
        );
        self.model
    }

    fn open_table(&mut self, name: &str) {
        if let Some(previous) = self.open.replace(OpenTable::new(name)) {
            warn!(
                table = %previous.name,
                line = self.lines,
                "Dropping table without closing line"
            );
        }
    }

    fn close_table(&mut self, engine: Option<&str>) -> Result<()> {
        let Some(mut table) = self.open.take() else {
            return Ok(());
        };

        if let Some(engine) = engine {
            table.entry.engine = Some(engine.to_string());
        }

        debug!(
            table = %table.name,
            columns = table.entry.columns.len(),
            indexes = table.entry.indexes.len(),
            "Parsed table"
        );
        self.model.insert_table(table.name, table.entry)
    }
}

/// Parses schema text held in memory.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateTable`] if two terminated tables share a name.
pub fn parse_str(text: &str) -> Result<SchemaModel> {
    let mut parser = SchemaParser::new();
    for line in text.lines() {
        parser.feed_line(line)?;
    }
    Ok(parser.finish())
}

/// Parses a schema file.
///
/// # Errors
///
/// Returns [`SchemaError::InputNotFound`] if the file does not exist,
/// [`SchemaError::Io`] if it cannot be read, and
/// [`SchemaError::DuplicateTable`] if two terminated tables share a name.
pub fn parse_file(path: impl AsRef<Path>) -> Result<SchemaModel> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SchemaError::InputNotFound(path.to_path_buf()),
        _ => SchemaError::Io(e),
    })?;

    debug!(path = %path.display(), "Parsing schema file");

    let mut parser = SchemaParser::new();
    for line in BufReader::new(file).lines() {
        parser.feed_line(&line?)?;
    }
    Ok(parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut SchemaParser, lines: &[&str]) {
        for line in lines {
            parser.feed_line(line).unwrap();
        }
    }

    #[test]
    fn test_initial_state() {
        let parser = SchemaParser::new();
        assert_eq!(parser.state(), ParseState::Outside);
        assert_eq!(parser.current_table(), None);
        assert_eq!(parser.current_column(), None);
    }

    #[test]
    fn test_table_start_enters_table() {
        let mut parser = SchemaParser::new();
        feed(&mut parser, &["CREATE TABLE t1"]);
        assert_eq!(parser.state(), ParseState::InTable);
        assert_eq!(parser.current_table(), Some("t1"));
        assert_eq!(parser.current_column(), None);
    }

    #[test]
    fn test_column_becomes_current() {
        let mut parser = SchemaParser::new();
        feed(&mut parser, &["CREATE TABLE t1 (", "    id int,"]);
        assert_eq!(parser.current_column(), Some("id"));
        assert_eq!(parser.state(), ParseState::InTable);
    }

    #[test]
    fn test_index_keeps_current_column() {
        let mut parser = SchemaParser::new();
        feed(
            &mut parser,
            &["CREATE TABLE t1 (", "    id int,", "    PRIMARY KEY (id),"],
        );
        assert_eq!(parser.current_column(), Some("id"));
    }

    #[test]
    fn test_multi_line_column_comment_state() {
        let mut parser = SchemaParser::new();
        feed(
            &mut parser,
            &["CREATE TABLE t1 (", "    id int,", "    -- <descr>first"],
        );
        assert_eq!(parser.state(), ParseState::InColumnComment);

        feed(&mut parser, &["    -- second</descr>"]);
        assert_eq!(parser.state(), ParseState::InTable);
    }

    #[test]
    fn test_new_column_closes_open_description() {
        let mut parser = SchemaParser::new();
        feed(
            &mut parser,
            &[
                "CREATE TABLE t1 (",
                "    id int,",
                "    -- <descr>never closed",
                "    ra double,",
                "    -- stray words",
                ");",
            ],
        );
        let model = parser.finish();
        let table = model.get_table("t1").unwrap();
        assert_eq!(table.columns[0].description.as_deref(), Some("never closed"));
        assert_eq!(table.columns[1].description, None);
    }

    #[test]
    fn test_table_end_returns_outside() {
        let mut parser = SchemaParser::new();
        feed(&mut parser, &["CREATE TABLE t1 (", "    id int", ") ENGINE=MyISAM;"]);
        assert_eq!(parser.state(), ParseState::Outside);
        assert_eq!(
            parser.model().get_table("t1").unwrap().engine.as_deref(),
            Some("MyISAM")
        );
    }

    #[test]
    fn test_indented_close_does_not_end_table() {
        let mut parser = SchemaParser::new();
        feed(&mut parser, &["CREATE TABLE t1 (", "    id int", "    ) ENGINE=MyISAM;"]);
        assert_eq!(parser.state(), ParseState::InTable);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn test_lines_outside_table_ignored() {
        let mut parser = SchemaParser::new();
        feed(
            &mut parser,
            &["    id int,", "    PRIMARY KEY (id),", "-- <descr>x</descr>", ");"],
        );
        assert_eq!(parser.state(), ParseState::Outside);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn test_table_comment_after_close_not_appended() {
        let mut parser = SchemaParser::new();
        feed(
            &mut parser,
            &[
                "CREATE TABLE t1",
                "    -- <descr>Table one.</descr>",
                "    -- unrelated remark",
                "(",
                "    id int",
                ");",
            ],
        );
        let model = parser.finish();
        assert_eq!(
            model.get_table("t1").unwrap().description.as_deref(),
            Some("Table one.")
        );
    }

    #[test]
    fn test_unterminated_table_dropped_on_new_start() {
        let mut parser = SchemaParser::new();
        feed(
            &mut parser,
            &["CREATE TABLE broken (", "    id int,", "CREATE TABLE ok (", "    id int", ");"],
        );
        let model = parser.finish();
        assert_eq!(model.table_names().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn test_duplicate_table_is_error() {
        let mut parser = SchemaParser::new();
        feed(&mut parser, &["CREATE TABLE t (", "    a int", ");"]);
        feed(&mut parser, &["CREATE TABLE t (", "    b int"]);
        let err = parser.feed_line(");").unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTable(ref name) if name == "t"));
    }
}
