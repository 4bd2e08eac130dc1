//! The database whose schema is being registered.
//!
//! A target server is one SQLite connection with every database from its
//! connection file attached by name. Column positions come from
//! `pragma_table_info`, so the ordinal of a column is its `cid + 1`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use metaserv_schema::{ColumnPosition, SchemaVersion};

use crate::config::ConnectionConfig;
use crate::error::{AdminError, Result};

/// Table holding the schema version inside each described database.
pub const SCHEMA_DESCRIPTION_TABLE: &str = "ZZZ_Schema_Description";

static SAFE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid safe name regex"));

/// Whether `name` can be interpolated into SQL as an identifier.
#[must_use]
pub fn is_safe_name(name: &str) -> bool {
    SAFE_NAME.is_match(name)
}

pub(crate) fn check_name(name: &str) -> Result<&str> {
    if is_safe_name(name) {
        Ok(name)
    } else {
        Err(AdminError::UnsafeName(name.to_string()))
    }
}

/// Opens a single-connection pool with the config's databases attached.
pub(crate) async fn open_pool(config: &ConnectionConfig, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(create);

    let mut attachments = Vec::with_capacity(config.databases.len());
    for (name, path) in &config.databases {
        attachments.push((check_name(name)?.to_string(), path.display().to_string()));
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(move |conn, _meta| {
            let attachments = attachments.clone();
            Box::pin(async move {
                for (name, path) in &attachments {
                    sqlx::query(&format!("ATTACH DATABASE ? AS {name}"))
                        .bind(path)
                        .execute(&mut *conn)
                        .await?;
                }
                Ok(())
            })
        })
        .connect_with(options)
        .await?;

    debug!(url = %config.url, attached = config.databases.len(), "Opened connection");
    Ok(pool)
}

/// Host and port under which a database is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Host name.
    pub host: String,
    /// Port.
    pub port: u16,
}

/// Read-only view of a target database server.
pub struct TargetDatabase {
    pool: SqlitePool,
    endpoint: Endpoint,
}

impl TargetDatabase {
    /// Connects to the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Database`] if the connection or an attachment
    /// fails.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let pool = open_pool(config, false).await?;
        Ok(Self {
            pool,
            endpoint: Endpoint {
                host: config.host.clone(),
                port: config.port,
            },
        })
    }

    /// Host and port from the connection file.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Whether `name` is the main database or one of the attached ones.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Database`] on query failure.
    pub async fn database_exists(&self, name: &str) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pragma_database_list WHERE name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 > 0)
    }

    /// Every column of every table in database `name`, sorted by table name
    /// then ordinal position.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnsafeName`] for a name outside `[A-Za-z0-9_]`
    /// and [`AdminError::Database`] on query failure.
    pub async fn column_positions(&self, name: &str) -> Result<Vec<ColumnPosition>> {
        let db = check_name(name)?;
        let sql = format!(
            "SELECT m.name, p.name, p.cid + 1 \
             FROM {db}.sqlite_master AS m \
             JOIN pragma_table_info(m.name, '{db}') AS p \
             WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%' AND m.name != ? \
             ORDER BY m.name, p.cid"
        );
        debug!(sql = %sql, "Fetching column positions");

        let rows: Vec<(String, String, u32)> = sqlx::query_as(&sql)
            .bind(SCHEMA_DESCRIPTION_TABLE)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(table, column, ordinal)| ColumnPosition::new(table, column, ordinal))
            .collect())
    }

    /// Reads the version row of database `name`.
    ///
    /// Returns `None` if the description table is missing or does not hold
    /// exactly one row.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnsafeName`] for a name outside `[A-Za-z0-9_]`
    /// and [`AdminError::Database`] on query failure.
    pub async fn schema_version(&self, name: &str) -> Result<Option<SchemaVersion>> {
        let db = check_name(name)?;
        let present: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {db}.sqlite_master WHERE type = 'table' AND name = ?"
        ))
        .bind(SCHEMA_DESCRIPTION_TABLE)
        .fetch_one(&self.pool)
        .await?;
        if present.0 == 0 {
            warn!(database = %db, "No {SCHEMA_DESCRIPTION_TABLE} table");
            return Ok(None);
        }

        let rows: Vec<(String, String)> = sqlx::query_as(&format!(
            "SELECT CAST(version AS TEXT), COALESCE(descr, '') FROM {db}.{SCHEMA_DESCRIPTION_TABLE}"
        ))
        .fetch_all(&self.pool)
        .await?;

        match <[_; 1]>::try_from(rows) {
            Ok([(version, description)]) => Ok(Some(SchemaVersion::new(version, description))),
            Err(rows) => {
                warn!(
                    database = %db,
                    rows = rows.len(),
                    "Expected exactly one row in {SCHEMA_DESCRIPTION_TABLE}"
                );
                Ok(None)
            }
        }
    }

    /// Closes the connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
