//! Error types for catalog administration.

use std::path::PathBuf;

use metaserv_schema::{ErrorKind, SchemaError};

/// Errors that can occur while administering the catalog.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Malformed administrative instruction.
    #[error("Bad command, see HELP for details: {0}")]
    BadCommand(String),

    /// The target database is not visible through the connection.
    #[error("Database '{0}' does not exist")]
    DatabaseNotFound(String),

    /// Schema file parsing or reconciliation failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// No user with this name is registered.
    #[error("Owner '{0}' not found")]
    OwnerNotFound(String),

    /// A project with this name is already registered.
    #[error("Project '{0}' already exists")]
    ProjectExists(String),

    /// No project with this name is registered.
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    /// An institution with this name is already registered.
    #[error("Institution '{0}' already exists")]
    InstitutionExists(String),

    /// No institution with this name is registered.
    #[error("Institution '{0}' not found")]
    InstitutionNotFound(String),

    /// A user with this name is already registered.
    #[error("User '{0}' already exists")]
    UserExists(String),

    /// The database is already described in the catalog.
    #[error("Database '{0}' is already registered")]
    DatabaseExists(String),

    /// Recognized instruction that is not supported.
    #[error("Command '{0}' not implemented")]
    NotImplemented(String),

    /// A database name outside `[A-Za-z0-9_]`.
    #[error("Invalid database name '{0}'")]
    UnsafeName(String),

    /// Connection file could not be used.
    #[error("Invalid connection file '{path}': {message}")]
    InvalidConfig {
        /// Path to the connection file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML in a connection file.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdminError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(e) => e.kind(),
            Self::BadCommand(_) | Self::UnsafeName(_) => ErrorKind::UnsupportedCommand,
            Self::DatabaseNotFound(_) => ErrorKind::TargetNotFound,
            Self::OwnerNotFound(_) | Self::ProjectNotFound(_) | Self::InstitutionNotFound(_) => {
                ErrorKind::ReferenceNotFound
            }
            Self::ProjectExists(_)
            | Self::InstitutionExists(_)
            | Self::UserExists(_)
            | Self::DatabaseExists(_) => ErrorKind::DuplicateEntity,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::InvalidConfig { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Config(_)
            | Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Numeric code reported to operators.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::BadCommand(_) | Self::UnsafeName(_) => 3005,
            Self::DatabaseNotFound(_) => 3010,
            Self::Schema(e) => match e {
                SchemaError::InputNotFound(_) => 3001,
                SchemaError::Io(_) => 9999,
                SchemaError::ColumnCountMismatch { .. } => 3015,
                SchemaError::DuplicateTable(_) => 3016,
                SchemaError::TableNotInSchemaFile { .. } => 3020,
                SchemaError::ColumnNotInSchemaFile { .. } => 3025,
                SchemaError::ColumnNotInDatabase { .. } => 3030,
            },
            Self::OwnerNotFound(_) => 3035,
            Self::ProjectExists(_) => 3040,
            Self::ProjectNotFound(_) => 3045,
            Self::InstitutionExists(_) => 3050,
            Self::InstitutionNotFound(_) => 3055,
            Self::UserExists(_) => 3060,
            Self::DatabaseExists(_) => 3065,
            Self::NotImplemented(_) => 9998,
            Self::InvalidConfig { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Config(_)
            | Self::Serialization(_) => 9999,
        }
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_keep_their_kind() {
        let err = AdminError::from(SchemaError::ColumnCountMismatch {
            parsed: 3,
            database: 2,
        });
        assert_eq!(err.kind(), ErrorKind::SchemaMismatchCount);
        assert_eq!(err.code(), 3015);
        assert!(err.to_string().contains("(3)"));
    }

    #[test]
    fn test_unknown_column_code_and_kind() {
        let err = AdminError::from(SchemaError::ColumnNotInSchemaFile {
            table: "t1".into(),
            column: "ghost".into(),
        });
        assert_eq!(err.kind(), ErrorKind::TargetNotFound);
        assert_eq!(err.code(), 3025);
    }

    #[test]
    fn test_unreadable_schema_file_is_internal() {
        let err = AdminError::from(SchemaError::from(std::io::Error::from(
            std::io::ErrorKind::InvalidData,
        )));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), 9999);
    }

    #[test]
    fn test_codes() {
        assert_eq!(AdminError::BadCommand("x".into()).code(), 3005);
        assert_eq!(AdminError::OwnerNotFound("x".into()).code(), 3035);
        assert_eq!(AdminError::InstitutionNotFound("x".into()).code(), 3055);
        assert_eq!(AdminError::NotImplemented("x".into()).code(), 9998);
        assert_eq!(
            AdminError::ProjectExists("x".into()).kind(),
            ErrorKind::DuplicateEntity
        );
    }
}
