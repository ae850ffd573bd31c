//! Domain models for the harness: settings and fixtures

mod fixtures;
mod settings;

pub use fixtures::{
    CacheFixture, CacheItem, Caracteristicas, Dimensiones, FixtureTag, ImageFixture, Material,
    Producto,
};
pub use settings::{
    MongoSettings, MySqlSettings, PoolConfig, PostgresSettings, RedisSettings, Settings,
};
