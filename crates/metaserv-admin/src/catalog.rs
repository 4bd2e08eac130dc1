//! The metadata catalog.
//!
//! The catalog records who owns which database, how it is classified, and
//! the reconciled description of each of its tables and columns.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use metaserv_schema::ReconciledSchema;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::repo::{Accessibility, Level};
use crate::target::{open_pool, Endpoint};

/// Repository type recorded for described databases.
pub const REPO_TYPE_DB: &str = "db";

/// SQL creating the catalog tables (SQLite), one statement each.
pub const CATALOG_SCHEMA_SQL: [&str; 7] = [
    r#"
CREATE TABLE IF NOT EXISTS Institution (
    institution_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS User (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    institution_id INTEGER NOT NULL REFERENCES Institution(institution_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS Project (
    project_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS Repo (
    repo_id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    project_id INTEGER NOT NULL REFERENCES Project(project_id),
    repo_type TEXT NOT NULL,
    level TEXT NOT NULL,
    data_release TEXT NOT NULL,
    version TEXT NOT NULL,
    short_name TEXT NOT NULL,
    description TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES User(user_id),
    accessibility TEXT NOT NULL,
    registered_at TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS DbMeta (
    db_meta_id INTEGER PRIMARY KEY REFERENCES Repo(repo_id),
    db_name TEXT NOT NULL UNIQUE,
    conn_host TEXT NOT NULL,
    conn_port INTEGER NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS DDT_Table (
    table_id INTEGER PRIMARY KEY AUTOINCREMENT,
    db_meta_id INTEGER NOT NULL REFERENCES DbMeta(db_meta_id),
    table_name TEXT NOT NULL,
    descr TEXT NOT NULL DEFAULT '',
    engine TEXT,
    UNIQUE(db_meta_id, table_name)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS DDT_Column (
    column_id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_id INTEGER NOT NULL REFERENCES DDT_Table(table_id),
    column_name TEXT NOT NULL,
    ordinal_position INTEGER NOT NULL,
    display_order INTEGER NOT NULL,
    data_type TEXT NOT NULL,
    not_null INTEGER NOT NULL,
    default_value TEXT,
    descr TEXT NOT NULL DEFAULT '',
    ucd TEXT NOT NULL DEFAULT '',
    units TEXT NOT NULL DEFAULT '',
    UNIQUE(table_id, column_name)
)
"#,
];

/// A user to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name, used to resolve database owners.
    pub user_name: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// E-mail address.
    pub email: String,
}

/// Everything recorded about a described database besides its tables.
#[derive(Debug, Clone)]
pub struct DatabaseEntry<'a> {
    /// Database name.
    pub db_name: &'a str,
    /// Where the description came from.
    pub url: &'a str,
    /// Processing level.
    pub level: Level,
    /// Data release name.
    pub data_release: &'a str,
    /// Access class.
    pub accessibility: Accessibility,
    /// Resolved owner.
    pub owner_id: i64,
    /// Resolved project.
    pub project_id: i64,
    /// Server the database lives on.
    pub endpoint: &'a Endpoint,
}

/// Handle to the catalog database.
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: SqlitePool,
}

impl Catalog {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the catalog described by `config`, creating the main
    /// database file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Database`](crate::AdminError::Database) if the
    /// connection fails.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::new(open_pool(config, true).await?))
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the catalog tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        for sql in CATALOG_SCHEMA_SQL {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Looks up an institution by name.
    pub async fn institution_id(&self, name: &str) -> Result<Option<i64>> {
        self.lookup_id("SELECT institution_id FROM Institution WHERE name = ?", name)
            .await
    }

    /// Looks up a project by name.
    pub async fn project_id(&self, name: &str) -> Result<Option<i64>> {
        self.lookup_id("SELECT project_id FROM Project WHERE name = ?", name)
            .await
    }

    /// Looks up a user by login name.
    pub async fn user_id(&self, user_name: &str) -> Result<Option<i64>> {
        self.lookup_id("SELECT user_id FROM User WHERE user_name = ?", user_name)
            .await
    }

    /// Looks up a described database by name.
    pub async fn database_id(&self, db_name: &str) -> Result<Option<i64>> {
        self.lookup_id("SELECT db_meta_id FROM DbMeta WHERE db_name = ?", db_name)
            .await
    }

    async fn lookup_id(&self, sql: &str, key: &str) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Inserts an institution and returns its id.
    pub async fn insert_institution(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO Institution (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Inserts a project and returns its id.
    pub async fn insert_project(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO Project (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Inserts a user affiliated with `institution_id` and returns its id.
    pub async fn insert_user(&self, user: &NewUser, institution_id: i64) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO User (user_name, first_name, last_name, email, institution_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.user_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(institution_id)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Records a described database with all of its tables and columns.
    ///
    /// Everything is written in one transaction; on error nothing is kept.
    /// Returns the repository id.
    pub async fn insert_database(
        &self,
        entry: &DatabaseEntry<'_>,
        schema: &ReconciledSchema,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let version = schema.version();

        let repo_id = sqlx::query(
            "INSERT INTO Repo (url, project_id, repo_type, level, data_release, version, \
             short_name, description, owner_id, accessibility, registered_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.url)
        .bind(entry.project_id)
        .bind(REPO_TYPE_DB)
        .bind(entry.level.as_str())
        .bind(entry.data_release)
        .bind(&version.version)
        .bind(entry.db_name)
        .bind(&version.description)
        .bind(entry.owner_id)
        .bind(entry.accessibility.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(
            "INSERT INTO DbMeta (db_meta_id, db_name, conn_host, conn_port) VALUES (?, ?, ?, ?)",
        )
        .bind(repo_id)
        .bind(entry.db_name)
        .bind(&entry.endpoint.host)
        .bind(entry.endpoint.port)
        .execute(&mut *tx)
        .await?;

        let mut columns = 0;
        for (name, table) in schema.tables() {
            let table_id = sqlx::query(
                "INSERT INTO DDT_Table (db_meta_id, table_name, descr, engine) VALUES (?, ?, ?, ?)",
            )
            .bind(repo_id)
            .bind(name)
            .bind(table.description.as_deref().unwrap_or_default())
            .bind(table.engine.as_deref())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            for column in &table.columns {
                sqlx::query(
                    "INSERT INTO DDT_Column (table_id, column_name, ordinal_position, \
                     display_order, data_type, not_null, default_value, descr, ucd, units) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(table_id)
                .bind(&column.name)
                .bind(column.ordinal_position.unwrap_or_default())
                .bind(column.display_order)
                .bind(&column.sql_type)
                .bind(column.not_null)
                .bind(column.default_value.as_deref())
                .bind(column.description.as_deref().unwrap_or_default())
                .bind(column.ucd.as_deref().unwrap_or_default())
                .bind(column.unit.as_deref().unwrap_or_default())
                .execute(&mut *tx)
                .await?;
                columns += 1;
            }

            debug!(table = %name, table_id, "Stored table description");
        }

        tx.commit().await?;

        info!(
            database = %entry.db_name,
            repo_id,
            tables = schema.model().len(),
            columns,
            "Registered database"
        );
        Ok(repo_id)
    }

    /// Closes the connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
