//! Driver implementations
//!
//! This module contains concrete implementations of the Driver trait for the
//! supported database engines.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MysqlDriver;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
