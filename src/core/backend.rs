//! Backend type definitions
//!
//! This module defines the database engines a driver can speak to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// MySQL/MariaDB database
    #[default]
    Mysql,
    /// SQLite database
    Sqlite,
}

impl Backend {
    /// Convert backend to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            Backend::Mysql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }

    /// Port used when none is configured
    pub fn default_port(&self) -> u16 {
        match self {
            Backend::Mysql => 3306,
            Backend::Sqlite => 0,
        }
    }

    /// SQL expression for the current timestamp
    pub fn now_expression(&self) -> &'static str {
        match self {
            Backend::Mysql => "NOW()",
            Backend::Sqlite => "CURRENT_TIMESTAMP",
        }
    }

    /// Whether the backend talks to a server over the network
    pub fn is_networked(&self) -> bool {
        matches!(self, Backend::Mysql)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Backend::Mysql),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            _ => Err(format!("Invalid backend: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_to_str() {
        assert_eq!(Backend::Mysql.to_str(), "mysql");
        assert_eq!(Backend::Sqlite.to_str(), "sqlite");
        assert_eq!(Backend::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("mysql".parse::<Backend>().ok(), Some(Backend::Mysql));
        assert_eq!("MariaDB".parse::<Backend>().ok(), Some(Backend::Mysql));
        assert_eq!("sqlite3".parse::<Backend>().ok(), Some(Backend::Sqlite));
        assert_eq!("postgres".parse::<Backend>().ok(), None);
    }

    #[test]
    fn test_backend_defaults() {
        assert_eq!(Backend::Mysql.default_port(), 3306);
        assert_eq!(Backend::Mysql.now_expression(), "NOW()");
        assert_eq!(Backend::Sqlite.now_expression(), "CURRENT_TIMESTAMP");
        assert!(Backend::Mysql.is_networked());
        assert!(!Backend::Sqlite.is_networked());
    }
}
