//! Error types for schema parsing and reconciliation.

use std::path::PathBuf;

/// Broad classification of failures, shared with the admin layer so that
/// operators can tell an out-of-date schema file from a missing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The schema file does not exist.
    InputNotFound,
    /// A named database, table or column is absent where it was expected.
    TargetNotFound,
    /// Column totals differ between the schema file and the database.
    SchemaMismatchCount,
    /// The database reports a column the schema file does not describe.
    ColumnMissingFromTarget,
    /// The schema file describes a column the database does not have.
    ColumnMissingFromSource,
    /// Owner, project or institution is not registered.
    ReferenceNotFound,
    /// An entity with the same name is already registered.
    DuplicateEntity,
    /// A malformed administrative instruction.
    UnsupportedCommand,
    /// A recognized instruction that is not supported yet.
    NotImplemented,
    /// Storage or I/O failure outside the validation protocol.
    Internal,
}

/// Errors raised while parsing a schema file or reconciling it.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file does not exist.
    #[error("Schema file '{}' does not exist", .0.display())]
    InputNotFound(PathBuf),

    /// IO error while reading the schema file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The same table name appears in two terminated CREATE TABLE blocks.
    #[error("Table '{0}' is defined more than once in the schema file")]
    DuplicateTable(String),

    /// Total column counts differ.
    #[error(
        "Number of columns in schema file ({parsed}) != number of columns in database ({database})"
    )]
    ColumnCountMismatch {
        /// Columns found in the schema file.
        parsed: usize,
        /// Columns reported by the database.
        database: usize,
    },

    /// The database has a table the schema file does not describe.
    #[error("Table '{table}' not found in schema file, present in database")]
    TableNotInSchemaFile {
        /// Table name.
        table: String,
    },

    /// The database has a column the schema file does not describe.
    #[error("Column '{table}.{column}' not found in schema file, present in database")]
    ColumnNotInSchemaFile {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// The schema file describes a column the database does not have.
    #[error("Column '{table}.{column}' not found in database, present in schema file")]
    ColumnNotInDatabase {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
}

impl SchemaError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound(_) => ErrorKind::InputNotFound,
            Self::Io(_) => ErrorKind::Internal,
            Self::DuplicateTable(_) => ErrorKind::DuplicateEntity,
            Self::ColumnCountMismatch { .. } => ErrorKind::SchemaMismatchCount,
            Self::TableNotInSchemaFile { .. } | Self::ColumnNotInSchemaFile { .. } => {
                ErrorKind::TargetNotFound
            }
            Self::ColumnNotInDatabase { .. } => ErrorKind::ColumnMissingFromSource,
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
