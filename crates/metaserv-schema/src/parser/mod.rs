//! Schema file parser
//!
//! A line-oriented state machine over the classifications produced by the
//! lexer.

mod parser;

pub use parser::{parse_file, parse_str, ParseState, SchemaParser};
