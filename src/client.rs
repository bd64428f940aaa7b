//! The wrapper façade
//!
//! [`SqlClient`] owns one driver connection and layers the convenience API on
//! top of it: verb-specific helpers, map- or record-shaped rows, HTML
//! cleaning, escaping and `INSERT` building.
//!
//! Every call returns its own result. The client also remembers the last
//! statement (SQL, verb, counts, error) for the `last_*`/`was_*` accessors;
//! with a shared client those reflect whichever statement finished last.

use crate::core::{
    backend::Backend,
    config::ConnectionConfig,
    driver::Driver,
    error::{DatabaseError, Result},
    escape::{self, Escape, Escaper},
    executor::{self, log_sql, ExecutionOutcome},
    materialize::{materialize, RowHook},
    value::{DatabaseResult, DatabaseRow, DatabaseValue},
    verb::QueryVerb,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Per-call fetch settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Override the client's clean flag for this call
    pub clean: Option<bool>,
}

impl FetchOptions {
    /// Force HTML cleaning on or off for this call
    pub fn clean(clean: bool) -> Self {
        Self { clean: Some(clean) }
    }

    /// Return values exactly as coerced, without HTML cleaning
    pub fn raw() -> Self {
        Self::clean(false)
    }
}

/// What the client remembers about the last statement
#[derive(Debug, Clone, Default)]
struct QueryState {
    sql: String,
    verb: QueryVerb,
    succeeded: bool,
    row_count: u64,
    affected_rows: u64,
    last_insert_id: Option<u64>,
    error: Option<String>,
}

/// A connected wrapper around one driver
pub struct SqlClient<D: Driver> {
    driver: D,
    config: ConnectionConfig,
    state: Mutex<QueryState>,
}

impl<D: Driver> SqlClient<D> {
    /// Validate `config`, open the connection and apply the configured charset.
    ///
    /// A connection failure is returned as is; there is no retry.
    pub async fn connect(driver: D, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        if let Err(err) = driver.connect(&config).await {
            warn!(backend = %driver.backend(), host = %config.host, error = %err, "connection failed");
            return Err(err);
        }

        if let Some(charset) = &config.charset {
            driver.set_charset(charset).await?;
        }

        info!(backend = %driver.backend(), database = %config.database, "connected");
        Ok(Self {
            driver,
            config,
            state: Mutex::new(QueryState::default()),
        })
    }

    /// The configuration the client was opened with
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Backend of the underlying driver
    pub fn backend(&self) -> Backend {
        self.driver.backend()
    }

    /// Check if the connection is open
    pub fn is_connected(&self) -> bool {
        self.driver.is_connected()
    }

    /// Close the connection; calling it again is a no-op
    pub async fn close(&self) -> Result<()> {
        if self.driver.is_connected() {
            info!(backend = %self.driver.backend(), "closing connection");
        }
        self.driver.close().await
    }

    /// Default HTML cleaning flag for fetched rows
    pub fn clean(&self) -> bool {
        self.config.clean
    }

    /// Set the default HTML cleaning flag
    pub fn set_clean(&mut self, clean: bool) {
        self.config.clean = clean;
    }

    /// Attach SQL text to query errors
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// Set the connection character set (e.g. `utf8mb4`)
    pub async fn set_charset(&self, charset: &str) -> Result<()> {
        self.driver.set_charset(charset).await
    }

    /// Execute any statement and return its outcome
    pub async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        let result = executor::execute(&self.driver, sql, self.config.debug).await;
        self.record(sql, &result);
        result
    }

    fn record(&self, sql: &str, result: &Result<ExecutionOutcome>) {
        let mut state = self.state.lock();
        *state = match result {
            Ok(outcome) => QueryState {
                sql: sql.to_string(),
                verb: outcome.verb().clone(),
                succeeded: true,
                row_count: outcome.num_rows(),
                affected_rows: outcome.affected_rows(),
                last_insert_id: outcome.last_insert_id(),
                error: None,
            },
            Err(err) => QueryState {
                sql: sql.to_string(),
                verb: QueryVerb::classify(sql),
                error: Some(err.to_string()),
                ..QueryState::default()
            },
        };
    }

    fn resolve_clean(&self, options: FetchOptions) -> bool {
        options.clean.unwrap_or(self.config.clean)
    }

    async fn fetch(&self, sql: &str, clean: bool, hook: Option<&RowHook<'_>>) -> Result<DatabaseResult> {
        let outcome = self.execute(sql).await?;
        let rows = match outcome.into_first_result_set() {
            Some(set) => materialize(set, clean, hook),
            None => Vec::new(),
        };
        debug!(rows = rows.len(), sql = log_sql(sql), "rows materialized");
        Ok(rows)
    }

    /// Run a query and return map-shaped rows.
    ///
    /// No rows is `Ok` with an empty vector; a failed statement is `Err`.
    pub async fn query(&self, sql: &str) -> Result<DatabaseResult> {
        self.query_with(sql, FetchOptions::default()).await
    }

    /// Like [`query`](Self::query) with per-call options
    pub async fn query_with(&self, sql: &str, options: FetchOptions) -> Result<DatabaseResult> {
        let clean = self.resolve_clean(options);
        self.fetch(sql, clean, None).await
    }

    /// Run a query and deserialize each row into `T`
    pub async fn query_as<T: DeserializeOwned>(&self, sql: &str) -> Result<Vec<T>> {
        self.query_as_with(sql, FetchOptions::default()).await
    }

    /// Like [`query_as`](Self::query_as) with per-call options
    pub async fn query_as_with<T: DeserializeOwned>(
        &self,
        sql: &str,
        options: FetchOptions,
    ) -> Result<Vec<T>> {
        self.query_with(sql, options)
            .await?
            .into_iter()
            .map(DatabaseRow::into_record)
            .collect()
    }

    /// First row of a query, if any
    pub async fn query_row(&self, sql: &str) -> Result<Option<DatabaseRow>> {
        Ok(self.query(sql).await?.into_iter().next())
    }

    /// First row of a query deserialized into `T`, if any
    pub async fn query_row_as<T: DeserializeOwned>(&self, sql: &str) -> Result<Option<T>> {
        self.query_row(sql)
            .await?
            .map(DatabaseRow::into_record)
            .transpose()
    }

    /// Run several statements and return the rows of every non-empty result set
    pub async fn query_multi(&self, sql: &str) -> Result<Vec<DatabaseResult>> {
        self.query_multi_with(sql, FetchOptions::default()).await
    }

    /// Like [`query_multi`](Self::query_multi) with per-call options
    pub async fn query_multi_with(
        &self,
        sql: &str,
        options: FetchOptions,
    ) -> Result<Vec<DatabaseResult>> {
        let clean = self.resolve_clean(options);
        let mut outcome = self.execute(sql).await?;
        Ok(outcome
            .take_result_sets()
            .into_iter()
            .map(|set| materialize(set, clean, None))
            .filter(|rows| !rows.is_empty())
            .collect())
    }

    /// Run a query, passing every field through `hook`.
    ///
    /// The hook receives the coerced (and, if enabled, cleaned) value, the row
    /// and the clean flag; a truthy return value replaces the field.
    pub async fn each<F>(&self, sql: &str, hook: F) -> Result<DatabaseResult>
    where
        F: Fn(&DatabaseValue, &DatabaseRow, bool) -> Option<DatabaseValue> + Send + Sync,
    {
        self.each_with(sql, FetchOptions::default(), hook).await
    }

    /// Like [`each`](Self::each) with per-call options
    pub async fn each_with<F>(&self, sql: &str, options: FetchOptions, hook: F) -> Result<DatabaseResult>
    where
        F: Fn(&DatabaseValue, &DatabaseRow, bool) -> Option<DatabaseValue> + Send + Sync,
    {
        let clean = self.resolve_clean(options);
        self.fetch(sql, clean, Some(&hook as &RowHook<'_>)).await
    }

    /// Run an INSERT; returns the generated id, or `None` if the statement was not an INSERT
    pub async fn insert(&self, sql: &str) -> Result<Option<u64>> {
        Ok(self.execute(sql).await?.was_inserted())
    }

    /// Run an UPDATE; `true` if the statement was an UPDATE
    pub async fn update(&self, sql: &str) -> Result<bool> {
        Ok(self.execute(sql).await?.was_updated())
    }

    /// Run a DELETE; `true` if the statement was a DELETE
    pub async fn delete(&self, sql: &str) -> Result<bool> {
        Ok(self.execute(sql).await?.was_deleted())
    }

    /// Build and run `INSERT INTO <table> (<fields>) VALUES(<values>)`.
    ///
    /// `Null` becomes `NULL`, text equal to `now()` (any case) becomes the
    /// backend's current-timestamp expression, other text is escaped and
    /// single-quoted and numbers are written as-is.
    ///
    /// # Security Warning
    ///
    /// Table and field names are not escaped; never take them from user input.
    pub async fn insert_data<I, K, V>(&self, table: &str, fields: I) -> Result<Option<u64>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<DatabaseValue>,
    {
        let sql = self.build_insert(table, fields)?;
        self.insert(&sql).await
    }

    fn build_insert<I, K, V>(&self, table: &str, fields: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<DatabaseValue>,
    {
        let (names, values): (Vec<String>, Vec<String>) = fields
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), self.sql_literal(v.into())))
            .unzip();

        if names.is_empty() {
            return Err(DatabaseError::configuration("No data to insert"));
        }

        Ok(format!(
            "INSERT INTO {} ({}) VALUES({});",
            table,
            names.join(", "),
            values.join(", ")
        ))
    }

    fn sql_literal(&self, value: DatabaseValue) -> String {
        match value {
            DatabaseValue::Null => "NULL".to_string(),
            DatabaseValue::Int(v) => v.to_string(),
            DatabaseValue::Float(v) if v.is_finite() => v.to_string(),
            DatabaseValue::Float(_) => "NULL".to_string(),
            DatabaseValue::Text(s) if s.eq_ignore_ascii_case("now()") => {
                self.driver.backend().now_expression().to_string()
            }
            DatabaseValue::Text(s) => format!("'{}'", self.driver.escape_str(&s)),
        }
    }

    /// Escape a string, value, map, row or JSON record with the driver's rules
    pub fn escape<T: Escape>(&self, value: T) -> T {
        value.escape_with(&self.driver)
    }

    /// Escape every string field of a serializable record
    pub fn escape_record<T: Serialize + DeserializeOwned>(&self, record: &T) -> Result<T> {
        escape::escape_record(record, &self.driver)
    }

    /// Whether the last statement succeeded
    pub fn query_succeeded(&self) -> bool {
        self.state.lock().succeeded
    }

    /// Rows returned by the last query
    pub fn num_rows(&self) -> u64 {
        self.state.lock().row_count
    }

    /// Rows affected by the last statement; 0 after a failure
    pub fn affected_rows(&self) -> u64 {
        let state = self.state.lock();
        if state.succeeded {
            state.affected_rows
        } else {
            0
        }
    }

    /// Id generated by the last INSERT
    pub fn last_insert_id(&self) -> Option<u64> {
        self.state.lock().last_insert_id
    }

    /// Error text of the last statement, if it failed
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// SQL text of the last statement
    pub fn last_query(&self) -> String {
        self.state.lock().sql.clone()
    }

    /// Verb of the last statement
    pub fn last_verb(&self) -> QueryVerb {
        self.state.lock().verb.clone()
    }

    /// Generated id if the last statement was a successful INSERT
    pub fn was_inserted(&self) -> Option<u64> {
        let state = self.state.lock();
        (state.succeeded && state.verb == QueryVerb::Insert)
            .then(|| state.last_insert_id.unwrap_or(0))
    }

    /// Whether the last statement was a successful UPDATE
    pub fn was_updated(&self) -> bool {
        let state = self.state.lock();
        state.succeeded && state.verb == QueryVerb::Update
    }

    /// Whether the last statement was a successful DELETE
    pub fn was_deleted(&self) -> bool {
        let state = self.state.lock();
        state.succeeded && state.verb == QueryVerb::Delete
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::backends::SqliteDriver;
    use crate::core::config::ConnectionBuilder;

    async fn memory_client() -> SqlClient<SqliteDriver> {
        let config = ConnectionBuilder::new(Backend::Sqlite)
            .database(":memory:")
            .build()
            .expect("valid config");
        SqlClient::connect(SqliteDriver::new(), config)
            .await
            .expect("Failed to connect")
    }

    #[tokio::test]
    async fn test_build_insert() {
        let client = memory_client().await;
        let sql = client
            .build_insert(
                "dt_sample",
                vec![
                    ("Name", DatabaseValue::from("O'Neil")),
                    ("City", DatabaseValue::Null),
                    ("Date", DatabaseValue::from("NOW()")),
                    ("Age", DatabaseValue::Int(41)),
                ],
            )
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO dt_sample (Name, City, Date, Age) VALUES('O''Neil', NULL, CURRENT_TIMESTAMP, 41);"
        );
    }

    #[tokio::test]
    async fn test_build_insert_needs_fields() {
        let client = memory_client().await;
        let fields: Vec<(&str, DatabaseValue)> = Vec::new();
        let err = client.build_insert("t", fields).unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_state_after_failure() {
        let client = memory_client().await;
        assert!(client.execute("SELECT * FROM missing").await.is_err());
        assert!(!client.query_succeeded());
        assert_eq!(client.affected_rows(), 0);
        assert_eq!(client.was_inserted(), None);
        assert_eq!(client.last_query(), "SELECT * FROM missing");
        assert!(client.last_error().is_some());
    }

    #[tokio::test]
    async fn test_empty_sql_is_configuration_error() {
        let client = memory_client().await;
        let err = client.query("   ").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_fetch_options() {
        let client = memory_client().await;
        assert!(client.clean());
        assert!(client.resolve_clean(FetchOptions::default()));
        assert!(!client.resolve_clean(FetchOptions::raw()));
    }
}
