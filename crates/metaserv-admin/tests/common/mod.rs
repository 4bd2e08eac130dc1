#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

use metaserv_admin::prelude::*;

/// Tables of the target database `db1`.
pub const TARGET_DDL: [&str; 3] = [
    "CREATE TABLE Object (objectId INTEGER, ra REAL, decl REAL)",
    "CREATE TABLE Source (sourceId INTEGER, objectId INTEGER, flux REAL)",
    "CREATE TABLE ZZZ_Schema_Description (version TEXT, descr TEXT)",
];

/// Annotated schema file matching [`TARGET_DDL`].
pub const SCHEMA: &str = "
CREATE TABLE Object
    -- <descr>One row per astronomical object.</descr>
(
    objectId BIGINT NOT NULL,
        -- <descr>Unique id.</descr>
        -- <ucd>meta.id;src</ucd>
    ra DOUBLE NOT NULL,
        -- <descr>Right ascension of the
        -- object centroid.</descr>
        -- <ucd>pos.eq.ra</ucd>
        -- <unit>deg</unit>
    decl DOUBLE NOT NULL,
        -- <unit>deg</unit>
    PRIMARY KEY (objectId)
) ENGINE=MyISAM;

CREATE TABLE Source
(
    sourceId BIGINT NOT NULL,
    flux FLOAT(0) DEFAULT 0,
        -- <unit>nJy</unit>
    objectId BIGINT,
    KEY IDX_objectId (objectId ASC)
) ENGINE=MyISAM;
";

pub struct Fixture {
    pub dir: TempDir,
    pub admin: MetaAdmin,
    pub target_file: PathBuf,
}

impl Fixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, text).expect("Failed to write file");
        path
    }

    pub fn queries(&self) -> CatalogQueries<'_> {
        CatalogQueries::new(self.admin.catalog())
    }

    pub fn request(&self, schema_file: &Path) -> DbDescrRequest {
        DbDescrRequest::new(
            "db1",
            schema_file,
            Level::Dc,
            "W13",
            "jdoe",
            Accessibility::Released,
        )
    }
}

pub async fn create_database(path: &Path, ddl: &[&str]) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
        )
        .await
        .expect("Failed to create SQLite database");
    for sql in ddl {
        sqlx::query(sql)
            .execute(&pool)
            .await
            .expect("Failed to run DDL");
    }
    pool.close().await;
}

/// A catalog with its tables, plus a target server exposing `db1`.
pub async fn fixture() -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");

    create_database(&dir.path().join("db1.sqlite"), &TARGET_DDL).await;
    let target_file = dir.path().join("target.toml");
    fs::write(
        &target_file,
        "url = \"sqlite::memory:\"\nhost = \"lsst-db01\"\nport = 4040\n\n[databases]\ndb1 = \"db1.sqlite\"\n",
    )
    .expect("Failed to write connection file");
    let target = ConnectionConfig::from_file(&target_file).expect("Invalid connection file");

    let catalog_config =
        ConnectionConfig::new(format!("sqlite:{}", dir.path().join("catalog.sqlite").display()));
    let catalog = Catalog::connect(&catalog_config)
        .await
        .expect("Failed to open catalog");
    catalog.ensure_schema().await.expect("Failed to create catalog");

    Fixture {
        dir,
        admin: MetaAdmin::new(catalog, target),
        target_file,
    }
}

/// Registers project `LSST`, institution `SLAC` and user `jdoe`.
pub async fn seed(admin: &MetaAdmin) {
    admin.add_project("LSST").await.unwrap();
    admin.add_institution("SLAC").await.unwrap();
    admin
        .add_user(
            &NewUser {
                user_name: "jdoe".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jdoe@example.org".into(),
            },
            "SLAC",
        )
        .await
        .unwrap();
}

pub async fn count(admin: &MetaAdmin, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(admin.catalog().pool())
        .await
        .unwrap();
    row.0
}
