//! # metaserv-admin
//!
//! Registers databases in a metadata catalog from their annotated schema
//! files, and answers read-only lookups over what has been registered.
//!
//! Registering a database ties together three things:
//!
//! - the annotated schema file, parsed by [`metaserv_schema`];
//! - the live database, which reports the ordinal position of every column;
//! - the catalog, which receives one repository entry plus one row per table
//!   and per column, all in one transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use metaserv_admin::prelude::*;
//!
//! let catalog = Catalog::connect(&ConnectionConfig::from_file("~/.metaserv/auth.toml")?).await?;
//! catalog.ensure_schema().await?;
//!
//! let admin = MetaAdmin::new(catalog, ConnectionConfig::from_file("target.toml")?);
//! admin.add_project("LSST").await?;
//! admin.add_institution("SLAC").await?;
//! admin
//!     .add_db_descr(&DbDescrRequest::new(
//!         "DC_W13_Stripe82",
//!         "schema.sql",
//!         Level::Dc,
//!         "W13",
//!         "jdoe",
//!         Accessibility::Released,
//!     ))
//!     .await?;
//! ```

pub mod admin;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod query;
pub mod repo;
pub mod shell;
pub mod target;

pub use error::{AdminError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::admin::{DbDescrRequest, MetaAdmin, Registration, DEFAULT_PROJECT};
    pub use crate::catalog::{Catalog, NewUser};
    pub use crate::command::{Command, StatementBuffer};
    pub use crate::config::ConnectionConfig;
    pub use crate::error::{AdminError, Result};
    pub use crate::query::{CatalogQueries, ColumnRecord, DatabaseRecord, TableRecord};
    pub use crate::repo::{Accessibility, Level};
    pub use crate::shell::{CommandShell, Outcome};
    pub use crate::target::{Endpoint, TargetDatabase};
}
