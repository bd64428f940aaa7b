//! Core wrapper types and helpers
//!
//! This module provides the driver-independent building blocks: values and
//! rows, column coercion, escaping, HTML cleaning, filter strings, statement
//! classification, execution and materialization.

pub mod backend;
pub mod column;
pub mod config;
pub mod datetime;
pub mod driver;
pub mod error;
pub mod escape;
pub mod executor;
pub mod filter;
pub mod html;
pub mod materialize;
pub mod value;
pub mod verb;

// Re-export commonly used types
pub use backend::Backend;
pub use column::{ColumnKind, ColumnMeta};
pub use config::{ConnectionBuilder, ConnectionConfig};
pub use datetime::format_datetime;
pub use driver::{Driver, RawOutcome, ResultSet};
pub use error::{DatabaseError, Result};
pub use escape::{escape_record, Escape, Escaper, MysqlEscaper, SqliteEscaper};
pub use executor::{execute, ExecutionOutcome};
pub use filter::{build_filter, BoolOp, FilterKey, FilterOptions, FilterSpec, Lead};
pub use html::clean_html;
pub use materialize::{materialize, RowHook};
pub use value::{DatabaseResult, DatabaseRow, DatabaseValue};
pub use verb::QueryVerb;
