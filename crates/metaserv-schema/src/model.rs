//! Schema representation types.
//!
//! These types describe what an annotated schema file says about each table:
//! its columns in declaration order, its indexes, storage engine and the
//! free-text metadata (descriptions, units, UCDs) carried in comments.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Kind of an index declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// `PRIMARY KEY`.
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    /// `UNIQUE`.
    #[serde(rename = "UNIQUE")]
    Unique,
    /// Plain `KEY` or `INDEX`.
    #[serde(rename = "-")]
    Plain,
}

impl IndexKind {
    /// Maps the leading keyword of an index line to its kind.
    ///
    /// Returns `None` for keywords that do not start an index declaration.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "PRIMARY" => Some(Self::PrimaryKey),
            "UNIQUE" => Some(Self::Unique),
            "KEY" | "INDEX" => Some(Self::Plain),
            _ => None,
        }
    }

    /// Returns the label stored in the catalog.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::Unique => "UNIQUE",
            Self::Plain => "-",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An index declared inside a table block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Index kind.
    #[serde(rename = "type")]
    pub kind: IndexKind,
    /// Indexed columns, comma-joined, without ASC/DESC qualifiers.
    pub columns: String,
}

impl IndexEntry {
    /// Creates a new index entry.
    #[must_use]
    pub fn new(kind: IndexKind, columns: impl Into<String>) -> Self {
        Self {
            kind,
            columns: columns.into(),
        }
    }
}

/// A column declared inside a table block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnEntry {
    /// Column name.
    pub name: String,
    /// 1-based position in the schema file.
    pub display_order: u32,
    /// Type token as written, except `FLOAT(0)` which becomes `FLOAT`.
    #[serde(rename = "type")]
    pub sql_type: String,
    /// Whether the declaration contains `NOT NULL`.
    pub not_null: bool,
    /// Token following `DEFAULT`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Text between `<descr>` and `</descr>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Text between `<unit>` and `</unit>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Text between `<ucd>` and `</ucd>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ucd: Option<String>,
    /// Position reported by the database, set during reconciliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal_position: Option<u32>,
}

impl ColumnEntry {
    /// Creates a new column entry.
    #[must_use]
    pub fn new(name: impl Into<String>, display_order: u32, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_order,
            sql_type: sql_type.into(),
            not_null: false,
            default_value: None,
            description: None,
            unit: None,
            ucd: None,
            ordinal_position: None,
        }
    }

    /// Sets the NOT NULL flag.
    #[must_use]
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Option<String>) -> Self {
        self.default_value = value;
        self
    }
}

/// Everything the schema file says about one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Table description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Storage engine from the closing line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Columns in declaration order.
    pub columns: Vec<ColumnEntry>,
    /// Indexes in declaration order.
    pub indexes: Vec<IndexEntry>,
}

impl TableEntry {
    /// Creates an empty table entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn push_column(&mut self, column: ColumnEntry) {
        self.columns.push(column);
    }

    /// Appends an index.
    pub fn push_index(&mut self, index: IndexEntry) {
        self.indexes.push(index);
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnEntry> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Gets a mutable column by name.
    #[must_use]
    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut ColumnEntry> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

/// All tables parsed from one schema file, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaModel {
    tables: BTreeMap<String, TableEntry>,
}

impl SchemaModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] if a table with the same name
    /// is already present.
    pub fn insert_table(&mut self, name: impl Into<String>, table: TableEntry) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(SchemaError::DuplicateTable(name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&TableEntry> {
        self.tables.get(name)
    }

    /// Gets a mutable table by name.
    #[must_use]
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut TableEntry> {
        self.tables.get_mut(name)
    }

    /// Iterates over tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableEntry)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Returns table names in name order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the model has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of columns across all tables.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.tables.values().map(|t| t.columns.len()).sum()
    }
}

/// Version and description of a database schema, kept by convention in the
/// database itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Schema version label.
    pub version: String,
    /// Free-text description of the schema.
    pub description: String,
}

impl SchemaVersion {
    /// Creates a new schema version.
    #[must_use]
    pub fn new(version: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            description: description.into(),
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new("unknown", "")
    }
}
