#![allow(dead_code)]

use std::io::Write;

use metaserv_schema::{parse_file, parse_str, ColumnEntry, SchemaError, SchemaModel, TableEntry};
use tempfile::NamedTempFile;

pub fn parse(text: &str) -> SchemaModel {
    parse_str(text).unwrap_or_else(|e| panic!("Failed to parse:\n{text}\nError: {e:?}"))
}

pub fn parse_err(text: &str) -> SchemaError {
    parse_str(text).expect_err(&format!("Expected parse error for:\n{text}"))
}

/// Writes `text` to a temporary schema file and parses it from disk.
pub fn parse_via_file(text: &str) -> SchemaModel {
    let file = write_schema(text);
    parse_file(file.path()).unwrap_or_else(|e| panic!("Failed to parse file: {e:?}"))
}

pub fn write_schema(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(text.as_bytes())
        .expect("Failed to write schema file");
    file
}

pub fn table<'a>(model: &'a SchemaModel, name: &str) -> &'a TableEntry {
    model
        .get_table(name)
        .unwrap_or_else(|| panic!("Table '{name}' missing from {model:?}"))
}

pub fn column<'a>(model: &'a SchemaModel, table_name: &str, index: usize) -> &'a ColumnEntry {
    &table(model, table_name).columns[index]
}

/// Two tables covering descriptions, units, UCDs, defaults and engines.
pub const TWO_TABLES: &str = "
CREATE TABLE t1
    -- <descr>This is t1 table.</descr>
(
    id int,
        -- <descr>the t1.id</descr>
    ra double DEFAULT 1,
        -- <descr>right asc</descr>
        -- <ucd>pos.eq.ra</ucd>
        -- <unit>deg</unit>
    decl double,
        -- <ucd>pos.eq.dec</ucd>
        -- <unit>deg</unit>
    s char DEFAULT 'x',
        -- <descr>the t1.s</descr>
    v varchar(255),
    PRIMARY KEY pk_t1_id (id),
    INDEX idx_t1_s (s)
) ENGINE=MyISAM;

CREATE TABLE t2
   -- <descr>This is
   -- t2 table.</descr>
(
    id2 int,
        -- <descr>This is a very
        -- long
        -- description of the
        -- t2.id2.</descr>
    s2 char,
        -- <descr>Description for s2.
        -- </descr>
    v2 varchar(255)
) ENGINE = InnoDB;
";
