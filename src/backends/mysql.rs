//! MySQL driver implementation
//!
//! This module provides a MySQL/MariaDB implementation of the Driver trait
//! using mysql_async's text protocol, so every field arrives as text and is
//! typed later from the column metadata.

use crate::core::{
    backend::Backend,
    column::{ColumnKind, ColumnMeta},
    config::{validate_charset, ConnectionConfig},
    driver::{Driver, RawOutcome, ResultSet},
    error::{DatabaseError, Result},
    escape::{mysql_escape, Escaper},
};
use async_trait::async_trait;
use mysql_async::consts::ColumnType;
use mysql_async::prelude::*;
use mysql_async::{Column, Conn, OptsBuilder, Row, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default timeout for database operations (30 seconds)
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL driver
pub struct MysqlDriver {
    conn: Arc<Mutex<Option<Conn>>>,
    timeout: Duration,
}

impl MysqlDriver {
    /// Create a new, unconnected MySQL driver
    pub fn new() -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Map a MySQL column type to the scalar family used for coercion
    pub fn column_kind(column_type: ColumnType) -> ColumnKind {
        match column_type {
            ColumnType::MYSQL_TYPE_NULL => ColumnKind::Null,
            ColumnType::MYSQL_TYPE_TINY
            | ColumnType::MYSQL_TYPE_SHORT
            | ColumnType::MYSQL_TYPE_LONG
            | ColumnType::MYSQL_TYPE_INT24
            | ColumnType::MYSQL_TYPE_LONGLONG => ColumnKind::Integer,
            ColumnType::MYSQL_TYPE_FLOAT
            | ColumnType::MYSQL_TYPE_DOUBLE
            | ColumnType::MYSQL_TYPE_NEWDECIMAL => ColumnKind::Float,
            _ => ColumnKind::Text,
        }
    }

    fn column_meta(column: &Column) -> ColumnMeta {
        let column_type = column.column_type();
        ColumnMeta::new(column.name_str().into_owned(), Self::column_kind(column_type))
            .declared(format!("{:?}", column_type))
    }

    fn wire_row(mut row: Row, width: usize) -> Vec<Option<String>> {
        (0..width)
            .map(|i| row.take::<Value, usize>(i).and_then(wire_text))
            .collect()
    }

    async fn run(conn: &mut Conn, sql: &str) -> mysql_async::Result<RawOutcome> {
        let mut result = conn.query_iter(sql).await?;
        let mut outcome = RawOutcome {
            affected_rows: result.affected_rows(),
            last_insert_id: result.last_insert_id(),
            ..RawOutcome::default()
        };

        // Each turn consumes one result set, so trailing sets are drained and
        // the connection stays in sync
        loop {
            let columns: Vec<ColumnMeta> = result
                .columns()
                .map(|cols| cols.iter().map(Self::column_meta).collect())
                .unwrap_or_default();
            let rows: Vec<Row> = result.collect().await?;

            if !columns.is_empty() {
                let width = columns.len();
                let raw_rows = rows.into_iter().map(|r| Self::wire_row(r, width)).collect();
                outcome.result_sets.push(ResultSet::new(columns, raw_rows));
            }
            if result.is_empty() {
                break;
            }
        }
        result.drop_result().await?;

        Ok(outcome)
    }
}

/// Text-protocol values arrive as bytes; other variants only show up for
/// server-side conversions and are rendered in MySQL's literal form
fn wire_text(value: Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Int(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        Value::Date(y, m, d, h, i, s, us) => Some(if us > 0 {
            format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}", y, m, d, h, i, s, us)
        } else {
            format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, m, d, h, i, s)
        }),
        Value::Time(neg, days, h, i, s, us) => {
            let hours = days * 24 + u32::from(h);
            let sign = if neg { "-" } else { "" };
            Some(if us > 0 {
                format!("{}{:02}:{:02}:{:02}.{:06}", sign, hours, i, s, us)
            } else {
                format!("{}{:02}:{:02}:{:02}", sign, hours, i, s)
            })
        }
    }
}

impl Default for MysqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Escaper for MysqlDriver {
    fn escape_str(&self, value: &str) -> String {
        mysql_escape(value)
    }
}

#[async_trait]
impl Driver for MysqlDriver {
    fn backend(&self) -> Backend {
        Backend::Mysql
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        // Clean up any existing connection first
        if let Some(old) = self.conn.lock().await.take() {
            let _ = old.disconnect().await;
        }

        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name((!config.database.is_empty()).then(|| config.database.clone()));

        let conn = match tokio::time::timeout(self.timeout, Conn::new(opts)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                return Err(DatabaseError::connection_failed_with_source(
                    config.host.clone(),
                    config.port,
                    "Could not establish a connection.",
                    Box::new(e),
                ))
            }
            Err(_) => {
                return Err(DatabaseError::connection_failed(
                    config.host.clone(),
                    config.port,
                    format!("Connection timeout after {}ms", self.timeout.as_millis()),
                ))
            }
        };

        *self.conn.lock().await = Some(conn);
        info!(url = %config.connection_string(), "mysql connection established");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.conn
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    async fn close(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().await.take() {
            conn.disconnect().await?;
            debug!("mysql connection closed");
        }
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<RawOutcome> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DatabaseError::NotConnected)?;

        match tokio::time::timeout(self.timeout, Self::run(conn, sql)).await {
            Ok(result) => result.map_err(|e| DatabaseError::query(e.to_string())),
            Err(_) => {
                // The protocol state is unknown after an abandoned read
                guard.take();
                Err(DatabaseError::query_timeout(self.timeout.as_millis() as u64))
            }
        }
    }

    async fn set_charset(&self, charset: &str) -> Result<()> {
        validate_charset(charset)?;
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DatabaseError::NotConnected)?;
        conn.query_drop(format!("SET NAMES {}", charset))
            .await
            .map_err(|e| DatabaseError::query(e.to_string()))
    }
}
