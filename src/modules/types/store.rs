//! Data store type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data stores exercised by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    /// MySQL relational database
    Mysql,
    /// PostgreSQL relational database
    Postgres,
    /// MongoDB document database
    Mongodb,
    /// Redis key-value store
    Redis,
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Store::Mysql => write!(f, "mysql"),
            Store::Postgres => write!(f, "postgres"),
            Store::Mongodb => write!(f, "mongodb"),
            Store::Redis => write!(f, "redis"),
        }
    }
}

impl FromStr for Store {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Store::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(Store::Postgres),
            "mongodb" | "mongo" => Ok(Store::Mongodb),
            "redis" => Ok(Store::Redis),
            _ => Err(format!("Unknown store: {}", s)),
        }
    }
}

impl Store {
    /// Returns all stores in suite execution order
    pub fn all() -> &'static [Store] {
        &[Store::Mysql, Store::Postgres, Store::Mongodb, Store::Redis]
    }

    /// Human-readable product name, used in log lines and reports
    pub fn label(&self) -> &'static str {
        match self {
            Store::Mysql => "MySQL",
            Store::Postgres => "PostgreSQL",
            Store::Mongodb => "MongoDB",
            Store::Redis => "Redis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_from_str() {
        assert_eq!(Store::from_str("mysql").unwrap(), Store::Mysql);
        assert_eq!(Store::from_str("postgres").unwrap(), Store::Postgres);
        assert_eq!(Store::from_str("PostgreSQL").unwrap(), Store::Postgres);
        assert_eq!(Store::from_str("pg").unwrap(), Store::Postgres);
        assert_eq!(Store::from_str("mongodb").unwrap(), Store::Mongodb);
        assert_eq!(Store::from_str("mongo").unwrap(), Store::Mongodb);
        assert_eq!(Store::from_str("redis").unwrap(), Store::Redis);
        assert!(Store::from_str("sqlite").is_err());
    }

    #[test]
    fn test_store_display_round_trips() {
        for store in Store::all() {
            assert_eq!(Store::from_str(&store.to_string()).unwrap(), *store);
        }
    }

    #[test]
    fn test_store_labels() {
        assert_eq!(Store::Postgres.label(), "PostgreSQL");
        assert_eq!(Store::Mongodb.label(), "MongoDB");
    }

    #[test]
    fn test_store_serde() {
        let json = serde_json::to_string(&Store::Mongodb).unwrap();
        assert_eq!(json, "\"mongodb\"");

        let store: Store = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(store, Store::Postgres);
    }
}
