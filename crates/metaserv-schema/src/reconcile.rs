//! Reconciliation of a parsed schema against the database's own view.
//!
//! The database reports `(table, column, ordinal_position)` for every column
//! it holds. Reconciliation requires a one-to-one match with the parsed
//! model: equal column totals, every reported column present in the schema
//! file, and every parsed column reported by the database.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Result, SchemaError};
use crate::model::{SchemaModel, SchemaVersion, TableEntry};

/// One column as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnPosition {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// 1-based position of the column in its table.
    pub ordinal_position: u32,
}

impl ColumnPosition {
    /// Creates a new column position.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>, ordinal_position: u32) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            ordinal_position,
        }
    }
}

/// A schema model whose every column carries its database ordinal position.
///
/// Only [`reconcile`] produces this type, and it exposes the model read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledSchema {
    model: SchemaModel,
    version: SchemaVersion,
}

impl ReconciledSchema {
    /// Attaches the schema version read from the database.
    ///
    /// `None` keeps the defaults (`"unknown"`, empty description).
    #[must_use]
    pub fn with_version(mut self, version: Option<SchemaVersion>) -> Self {
        self.version = version.unwrap_or_default();
        self
    }

    /// The reconciled model.
    #[must_use]
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    /// The schema version.
    #[must_use]
    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    /// Iterates over tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableEntry)> {
        self.model.tables()
    }
}

/// Stamps database ordinal positions onto a parsed model.
///
/// `positions` is expected in table-name order, as the database lists them.
///
/// # Errors
///
/// - [`SchemaError::ColumnCountMismatch`] if the totals differ.
/// - [`SchemaError::TableNotInSchemaFile`] if a reported table was not parsed.
/// - [`SchemaError::ColumnNotInSchemaFile`] if a reported column was not parsed.
/// - [`SchemaError::ColumnNotInDatabase`] if a parsed column was never reported.
pub fn reconcile(mut model: SchemaModel, positions: &[ColumnPosition]) -> Result<ReconciledSchema> {
    let parsed = model.column_count();
    if parsed != positions.len() {
        error!(
            parsed,
            database = positions.len(),
            "Number of columns in schema file differs from the database"
        );
        return Err(SchemaError::ColumnCountMismatch {
            parsed,
            database: positions.len(),
        });
    }

    for position in positions {
        let Some(table) = model.get_table_mut(&position.table) else {
            error!(table = %position.table, "Table not found in schema file, present in database");
            return Err(SchemaError::TableNotInSchemaFile {
                table: position.table.clone(),
            });
        };
        let Some(column) = table.get_column_mut(&position.column) else {
            error!(
                table = %position.table,
                column = %position.column,
                "Column not found in schema file, present in database"
            );
            return Err(SchemaError::ColumnNotInSchemaFile {
                table: position.table.clone(),
                column: position.column.clone(),
            });
        };
        column.ordinal_position = Some(position.ordinal_position);
    }

    for (name, table) in model.tables() {
        if let Some(column) = table.columns.iter().find(|c| c.ordinal_position.is_none()) {
            error!(
                table = %name,
                column = %column.name,
                "Column not found in database, present in schema file"
            );
            return Err(SchemaError::ColumnNotInDatabase {
                table: name.to_string(),
                column: column.name.clone(),
            });
        }
    }

    debug!(
        tables = model.len(),
        columns = parsed,
        "Reconciled schema with database"
    );

    Ok(ReconciledSchema {
        model,
        version: SchemaVersion::default(),
    })
}
