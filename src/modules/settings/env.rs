//! Environment variable sources

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Loads `.env` from the working directory the first time it is forced
static DOTENV: Lazy<bool> = Lazy::new(|| dotenvy::dotenv().is_ok());

/// Somewhere to look up environment variables
pub trait EnvSource {
    /// Value of `key`, if set
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment, with `.env` applied on first use
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        if *DOTENV {
            tracing::debug!("Loaded variables from .env");
        }
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env() {
        let env = MapEnv::new().with("MYSQL_USER", "alice");
        assert_eq!(env.var("MYSQL_USER"), Some("alice".to_string()));
        assert_eq!(env.var("MYSQL_PASSWORD"), None);
    }

    #[test]
    fn test_map_env_from_iter() {
        let env: MapEnv = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.var("B"), Some("2".to_string()));
    }

    #[test]
    fn test_process_env() {
        std::env::set_var("PROYECTO_SETTINGS_TEST_VAR", "value");
        let env = ProcessEnv::new();
        assert_eq!(
            env.var("PROYECTO_SETTINGS_TEST_VAR"),
            Some("value".to_string())
        );
        std::env::remove_var("PROYECTO_SETTINGS_TEST_VAR");
        assert_eq!(env.var("PROYECTO_SETTINGS_TEST_VAR"), None);
    }
}
