//! ruletree sql - compiles condition trees to WHERE-clause fragments
//!
//! The second evaluation mode: instead of walking one object, a tree is
//! compiled into a single boolean SQL fragment and the database selects
//! the matching rows. Database portability is confined to the
//! [`SqlAdapter`] trait; no operator implementation calls a
//! vendor-specific function directly.

pub mod adapter;
pub mod compiler;
pub mod error;

pub use adapter::{MysqlAdapter, PostgresAdapter, SqlAdapter, SqliteAdapter};
pub use compiler::{ColumnMap, SqlCompiler};
pub use error::SqlError;
