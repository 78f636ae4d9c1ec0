//! tc-sql - SQL handling for Tripcheck
//!
//! Check bodies are written for a server dialect and executed on the
//! embedded engine. This crate inspects them without fully parsing them
//! (most are not valid in any single dialect) and prepares them for
//! execution.

pub mod error;
pub mod lexical;
pub mod rewrite;
pub mod scan;
pub mod template;

pub use error::{SqlError, SqlResult};
pub use lexical::{segments, Segment, SegmentKind};
pub use rewrite::apply_renames;
pub use scan::SqlScan;
pub use template::{placeholders, render, CheckParameters, Placeholder};
