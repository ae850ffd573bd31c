//! Connection settings for proyecto-db
//!
//! Every setting resolves from an environment variable when present and falls
//! back to a fixed default otherwise. A `.env` file in the working directory is
//! applied before the process environment is read.

pub mod env;
pub mod resolve;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use resolve::{lookup, resolve, resolve_with, DEFAULTS};

use once_cell::sync::Lazy;
use proyecto_core::Settings;

/// Process-wide settings, resolved once from the process environment
pub static SETTINGS: Lazy<Settings> = Lazy::new(|| resolve(&ProcessEnv::new()));

/// Borrow the process-wide settings
pub fn settings() -> &'static Settings {
    &SETTINGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_settings_use_fixed_ports() {
        let settings = settings();
        assert_eq!(settings.mysql.port, 3307);
        assert_eq!(settings.postgres.port, 55432);
        assert_eq!(settings.mongo.port, 27018);
        assert_eq!(settings.redis.port, 6380);
    }
}
