//! Connection configuration
//!
//! A [`ConnectionConfig`] can be built with [`ConnectionBuilder`], deserialized
//! with serde, or read from `DB_*` environment variables.

use super::backend::Backend;
use super::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};

/// Settings for one wrapper instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    /// Database name, or file path for SQLite
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Attach the SQL text to query errors
    pub debug: bool,
    /// HTML-clean text values of fetched rows unless overridden per call
    pub clean: bool,
    /// Character set applied right after connecting
    pub charset: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Mysql,
            host: "localhost".to_string(),
            port: Backend::Mysql.default_port(),
            database: String::new(),
            user: "root".to_string(),
            password: String::new(),
            debug: false,
            clean: true,
            charset: None,
        }
    }
}

impl ConnectionConfig {
    /// Read settings from `DB_BACKEND`, `DB_HOST`, `DB_PORT`, `DB_NAME`,
    /// `DB_USER`, `DB_PASSWORD`, `DB_DEBUG`, `DB_CLEAN` and `DB_CHARSET`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(backend) = lookup("DB_BACKEND") {
            config.backend = backend.parse().map_err(DatabaseError::configuration)?;
            config.port = config.backend.default_port();
        }
        if let Some(host) = lookup("DB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| DatabaseError::configuration(format!("Invalid DB_PORT: '{}'", port)))?;
        }
        if let Some(database) = lookup("DB_NAME") {
            config.database = database;
        }
        if let Some(user) = lookup("DB_USER") {
            config.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            config.password = password;
        }
        if let Some(debug) = lookup("DB_DEBUG") {
            config.debug = parse_flag("DB_DEBUG", &debug)?;
        }
        if let Some(clean) = lookup("DB_CLEAN") {
            config.clean = parse_flag("DB_CLEAN", &clean)?;
        }
        if let Some(charset) = lookup("DB_CHARSET") {
            config.charset = Some(charset);
        }

        Ok(config)
    }

    /// Check the parameters needed to open a connection
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() && self.user.is_empty() && self.password.is_empty() {
            return Err(DatabaseError::configuration(
                "Invalid parameter values to establish connection.",
            ));
        }
        if self.backend.is_networked() && self.host.is_empty() {
            return Err(DatabaseError::configuration("Host must not be empty"));
        }
        if let Some(charset) = &self.charset {
            validate_charset(charset)?;
        }
        Ok(())
    }

    /// File path for SQLite; for MySQL a `mysql://user@host:port/db` descriptor
    /// that never carries the password
    pub fn connection_string(&self) -> String {
        match self.backend {
            Backend::Sqlite => {
                if self.database.is_empty() {
                    ":memory:".to_string()
                } else {
                    self.database.clone()
                }
            }
            Backend::Mysql => format!(
                "mysql://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(DatabaseError::configuration(format!(
            "Invalid {}: '{}'",
            key, value
        ))),
    }
}

/// Character set names end up in `SET NAMES`, so only identifiers are allowed
pub fn validate_charset(charset: &str) -> Result<()> {
    if charset.is_empty()
        || !charset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DatabaseError::configuration(format!(
            "Invalid charset: '{}'",
            charset
        )));
    }
    Ok(())
}

/// Database connection builder
#[derive(Debug, Clone, Default)]
pub struct ConnectionBuilder {
    config: ConnectionConfig,
}

impl ConnectionBuilder {
    /// Create a new connection builder for the specified backend
    pub fn new(backend: Backend) -> Self {
        Self {
            config: ConnectionConfig {
                backend,
                port: backend.default_port(),
                ..ConnectionConfig::default()
            },
        }
    }

    /// Set the database host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the database port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the database name
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the username
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.config.user = username.into();
        self
    }

    /// Set the password
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.config.password = password.into();
        self
    }

    /// Attach SQL text to query errors
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Default HTML cleaning of fetched text
    pub fn clean(mut self, clean: bool) -> Self {
        self.config.clean = clean;
        self
    }

    /// Character set applied after connecting
    pub fn charset<S: Into<String>>(mut self, charset: S) -> Self {
        self.config.charset = Some(charset.into());
        self
    }

    /// Build the connection string
    pub fn build_connection_string(&self) -> String {
        self.config.connection_string()
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<ConnectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
