//! Line-level pattern matching for annotated schema files.

mod line;
mod rules;

pub use line::{ColumnDecl, CommentLine, DescrTag, IndexDecl, Line};
pub use rules::classify;
