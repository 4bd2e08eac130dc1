//! # metaserv-schema
//!
//! Parses annotated schema files into a typed model and reconciles that model
//! with the column positions a live database reports.
//!
//! An annotated schema file is ordinary `CREATE TABLE` DDL where comment
//! lines carry extra metadata:
//!
//! ```sql
//! CREATE TABLE Object
//!     -- <descr>The Object table.</descr>
//! (
//!     ra DOUBLE NOT NULL,
//!         -- <descr>Right ascension of the
//!         -- object centroid.</descr>
//!         -- <ucd>pos.eq.ra</ucd>
//!         -- <unit>deg</unit>
//!     PRIMARY KEY (ra)
//! ) ENGINE=MyISAM;
//! ```
//!
//! The scanner is line oriented and does not validate SQL grammar: each line
//! is classified on its own, and a small state machine tracks the current
//! table, the current column and whether a description is still open.
//!
//! ## Parsing
//!
//! ```rust
//! use metaserv_schema::parse_str;
//!
//! let model = parse_str(
//!     "CREATE TABLE t (\n    f1 FLOAT(0),\n    -- <unit>deg</unit>\n) ENGINE=MyISAM;\n",
//! )
//! .unwrap();
//!
//! let table = model.get_table("t").unwrap();
//! assert_eq!(table.columns[0].sql_type, "FLOAT");
//! assert_eq!(table.columns[0].unit.as_deref(), Some("deg"));
//! assert_eq!(table.engine.as_deref(), Some("MyISAM"));
//! ```
//!
//! ## Reconciliation
//!
//! ```rust
//! use metaserv_schema::{parse_str, reconcile, ColumnPosition};
//!
//! let model = parse_str("CREATE TABLE t1 (\n    id int,\n    ra double\n);\n").unwrap();
//! let reconciled = reconcile(
//!     model,
//!     &[ColumnPosition::new("t1", "id", 1), ColumnPosition::new("t1", "ra", 2)],
//! )
//! .unwrap();
//!
//! let ra = reconciled.model().get_table("t1").unwrap().get_column("ra").unwrap();
//! assert_eq!(ra.ordinal_position, Some(2));
//! ```

pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod reconcile;

pub use error::{ErrorKind, Result, SchemaError};
pub use model::{ColumnEntry, IndexEntry, IndexKind, SchemaModel, SchemaVersion, TableEntry};
pub use parser::{parse_file, parse_str, ParseState, SchemaParser};
pub use reconcile::{reconcile, ColumnPosition, ReconciledSchema};
