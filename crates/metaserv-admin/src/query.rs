//! Read-only lookups over the catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

use crate::catalog::{Catalog, REPO_TYPE_DB};
use crate::error::Result;

/// A registered database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseRecord {
    /// Repository id.
    pub repo_id: i64,
    /// Database name.
    pub db_name: String,
    /// Processing level.
    pub level: String,
    /// Data release name.
    pub data_release: String,
    /// Schema version.
    pub version: String,
    /// Schema description.
    pub description: String,
    /// Owner's user name.
    pub owner: String,
    /// Project name.
    pub project: String,
    /// Access class.
    pub accessibility: String,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: i64,
    /// Source of the description.
    pub url: String,
    /// When the database was registered.
    pub registered_at: Option<DateTime<Utc>>,
}

/// A table of a registered database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRecord {
    /// Table id.
    pub table_id: i64,
    /// Table name.
    pub table_name: String,
    /// Table description.
    pub description: String,
    /// Storage engine.
    pub engine: Option<String>,
    /// Number of columns.
    pub columns: i64,
}

/// A column of a registered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRecord {
    /// Column name.
    pub column_name: String,
    /// Position in the database table.
    pub ordinal_position: i64,
    /// Position in the schema file.
    pub display_order: i64,
    /// SQL type.
    pub data_type: String,
    /// Whether NULL is rejected.
    pub not_null: bool,
    /// Default value.
    pub default_value: Option<String>,
    /// Description.
    pub description: String,
    /// Unified content descriptor.
    pub ucd: String,
    /// Unit.
    pub unit: String,
}

type DatabaseRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
);

type ColumnRow = (
    String,
    i64,
    i64,
    String,
    bool,
    Option<String>,
    String,
    String,
    String,
);

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.and_utc())
                .ok()
        })
}

/// Lookups keyed by level, database name and table name.
pub struct CatalogQueries<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogQueries<'a> {
    /// Creates a query handle over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            pool: catalog.pool(),
        }
    }

    /// Distinct levels of registered databases.
    pub async fn levels(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT level FROM Repo WHERE repo_type = ? ORDER BY level")
                .bind(REPO_TYPE_DB)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|(level,)| level).collect())
    }

    /// Names of databases registered at `level`.
    pub async fn databases(&self, level: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT d.db_name FROM DbMeta d JOIN Repo r ON r.repo_id = d.db_meta_id \
             WHERE r.repo_type = ? AND r.level = ? ORDER BY d.db_name",
        )
        .bind(REPO_TYPE_DB)
        .bind(level)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Everything recorded about database `db`.
    pub async fn database(&self, db: &str) -> Result<Option<DatabaseRecord>> {
        let row: Option<DatabaseRow> = sqlx::query_as(
            "SELECT r.repo_id, d.db_name, r.level, r.data_release, r.version, r.description, \
             u.user_name, p.name, r.accessibility, d.conn_host, d.conn_port, r.url, r.registered_at \
             FROM DbMeta d \
             JOIN Repo r ON r.repo_id = d.db_meta_id \
             JOIN User u ON u.user_id = r.owner_id \
             JOIN Project p ON p.project_id = r.project_id \
             WHERE d.db_name = ?",
        )
        .bind(db)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(
            |(
                repo_id,
                db_name,
                level,
                data_release,
                version,
                description,
                owner,
                project,
                accessibility,
                host,
                port,
                url,
                registered_at,
            )| DatabaseRecord {
                repo_id,
                db_name,
                level,
                data_release,
                version,
                description,
                owner,
                project,
                accessibility,
                host,
                port,
                url,
                registered_at: parse_timestamp(&registered_at),
            },
        ))
    }

    /// Table names of database `db`.
    pub async fn tables(&self, db: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT t.table_name FROM DDT_Table t JOIN DbMeta d ON d.db_meta_id = t.db_meta_id \
             WHERE d.db_name = ? ORDER BY t.table_name",
        )
        .bind(db)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Table `table` of database `db`.
    pub async fn table(&self, db: &str, table: &str) -> Result<Option<TableRecord>> {
        let row: Option<(i64, String, String, Option<String>, i64)> = sqlx::query_as(
            "SELECT t.table_id, t.table_name, t.descr, t.engine, \
             (SELECT COUNT(*) FROM DDT_Column c WHERE c.table_id = t.table_id) \
             FROM DDT_Table t JOIN DbMeta d ON d.db_meta_id = t.db_meta_id \
             WHERE d.db_name = ? AND t.table_name = ?",
        )
        .bind(db)
        .bind(table)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(
            |(table_id, table_name, description, engine, columns)| TableRecord {
                table_id,
                table_name,
                description,
                engine,
                columns,
            },
        ))
    }

    /// Columns of table `table` in database `db`, by ordinal position.
    pub async fn columns(&self, db: &str, table: &str) -> Result<Vec<ColumnRecord>> {
        let rows: Vec<ColumnRow> = sqlx::query_as(
            "SELECT c.column_name, c.ordinal_position, c.display_order, c.data_type, c.not_null, \
             c.default_value, c.descr, c.ucd, c.units \
             FROM DDT_Column c \
             JOIN DDT_Table t ON t.table_id = c.table_id \
             JOIN DbMeta d ON d.db_meta_id = t.db_meta_id \
             WHERE d.db_name = ? AND t.table_name = ? \
             ORDER BY c.ordinal_position",
        )
        .bind(db)
        .bind(table)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    column_name,
                    ordinal_position,
                    display_order,
                    data_type,
                    not_null,
                    default_value,
                    description,
                    ucd,
                    unit,
                )| ColumnRecord {
                    column_name,
                    ordinal_position,
                    display_order,
                    data_type,
                    not_null,
                    default_value,
                    description,
                    ucd,
                    unit,
                },
            )
            .collect())
    }
}
