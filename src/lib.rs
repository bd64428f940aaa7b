//! # Rust SQL Wrapper
//!
//! A thin convenience layer over a single SQL connection. It runs raw SQL
//! strings and hands back typed, optionally HTML-cleaned rows, together with
//! helpers for escaping, filter strings and `INSERT` building.
//!
//! ## Features
//!
//! - **Typed rows**: integer, float and NULL columns come back as such; everything else is text
//! - **HTML cleaning**: optional entity normalization of text fields, on by default
//! - **Verb helpers**: `insert`, `update`, `delete` and per-call outcomes
//! - **Escaping**: strings, maps, rows and serde records with the backend's rules
//! - **Filter strings**: `WHERE a AND b` style fragments from field lists
//! - **Async Support**: Async/await support with Tokio
//!
//! ## Supported Databases
//!
//! | Database | Feature | Notes |
//! |----------|---------|-------|
//! | SQLite | `sqlite` (default) | bundled, file or `:memory:` |
//! | MySQL / MariaDB | `mysql` | text protocol via mysql_async |
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! rust_sql_wrapper = { version = "0.1", features = ["sqlite"] }
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use rust_sql_wrapper::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConnectionBuilder::new(Backend::Sqlite)
//!         .database(":memory:")
//!         .build()?;
//!     let db = SqlClient::connect(SqliteDriver::new(), config).await?;
//!
//!     db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").await?;
//!
//!     let id = db.insert_data("users", [("name", "Alice")]).await?;
//!     println!("inserted {:?}", id);
//!
//!     for row in db.query("SELECT * FROM users").await? {
//!         if let Some(name) = row.get("name") {
//!             println!("User: {}", name);
//!         }
//!     }
//!
//!     db.close().await
//! }
//! ```
//!
//! ### Filters
//!
//! ```rust
//! use rust_sql_wrapper::prelude::*;
//!
//! let filter = FilterSpec::new()
//!     .column("City", "= 'Paris'")
//!     .raw("Age > 30")
//!     .build();
//! assert_eq!(filter, "WHERE City = 'Paris' AND Age > 30");
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_sql_wrapper/
//! ├── src/
//! │   ├── core/              # Driver-independent types and helpers
//! │   │   ├── driver.rs      # Driver trait and raw results
//! │   │   ├── executor.rs    # Statement execution and outcomes
//! │   │   ├── materialize.rs # Raw rows to typed rows
//! │   │   ├── escape.rs      # Escaping
//! │   │   ├── filter.rs      # Filter strings
//! │   │   └── ...
//! │   ├── backends/          # SQLite and MySQL drivers
//! │   ├── client.rs          # SqlClient
//! │   └── lib.rs
//! ├── demos/                 # Example programs
//! ├── tests/                 # Integration tests
//! └── Cargo.toml
//! ```

/// Core wrapper types and helpers
pub mod core;

/// Driver implementations
pub mod backends;

/// The client façade
pub mod client;

/// Prelude for convenient imports
///
/// ```rust
/// use rust_sql_wrapper::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let config = ConnectionBuilder::new(Backend::Sqlite).database(":memory:").build()?;
///     let db = SqlClient::connect(SqliteDriver::new(), config).await?;
///     assert!(db.is_connected());
///     Ok(())
/// }
/// ```
pub mod prelude {
    pub use crate::client::{FetchOptions, SqlClient};
    pub use crate::core::{
        build_filter, clean_html, format_datetime, Backend, BoolOp, ConnectionBuilder,
        ConnectionConfig, DatabaseError, DatabaseResult, DatabaseRow, DatabaseValue, Driver,
        Escape, ExecutionOutcome, FilterOptions, FilterSpec, Lead, QueryVerb, Result,
    };

    #[cfg(feature = "mysql")]
    pub use crate::backends::MysqlDriver;
    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteDriver;
}

// Re-export at root level for convenience
pub use crate::client::{FetchOptions, SqlClient};
pub use crate::core::{
    Backend, ConnectionBuilder, ConnectionConfig, DatabaseError, DatabaseResult, DatabaseRow,
    DatabaseValue, Driver, ExecutionOutcome, QueryVerb, Result,
};

#[cfg(feature = "mysql")]
pub use crate::backends::MysqlDriver;
#[cfg(feature = "sqlite")]
pub use crate::backends::SqliteDriver;

/// SQLite-backed client
#[cfg(feature = "sqlite")]
pub type SqliteClient = SqlClient<SqliteDriver>;

/// MySQL-backed client
#[cfg(feature = "mysql")]
pub type MysqlClient = SqlClient<MysqlDriver>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let backend = Backend::Sqlite;
        assert_eq!(backend.to_str(), "sqlite");
        assert!(!backend.is_networked());
        assert_eq!(QueryVerb::classify("select 1"), QueryVerb::Select);
    }

    #[test]
    fn test_value_conversions() {
        use prelude::*;

        let val: DatabaseValue = 42.into();
        assert_eq!(val.as_i64(), Some(42));

        let val: DatabaseValue = "test".into();
        assert_eq!(val.as_string(), "test");

        let val: DatabaseValue = true.into();
        assert_eq!(val.as_bool(), Some(true));
    }
}
