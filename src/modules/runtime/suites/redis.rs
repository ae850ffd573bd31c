//! Redis suite: cache entry and hash operations

use async_trait::async_trait;
use proyecto_core::check::{ensure, ensure_eq, ensure_in};
use proyecto_core::{CacheFixture, CacheItem, FixtureTag, HarnessError, RedisSettings};
use proyecto_types::Store;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::collections::HashMap;
use tracing::debug;

use super::recorder::StepRecorder;
use super::traits::Suite;

/// Step names, in order
pub const REDIS_PLAN: &[&str] = &[
    "SET valor en cache",
    "GET valor de cache",
    "EXISTS clave",
    "EXPIRE clave",
    "DEL clave",
    "HASH operaciones",
];

fn redis_err(command: &'static str) -> impl FnOnce(RedisError) -> HarnessError {
    move |e| HarnessError::Redis(format!("{} failed: {}", command, e))
}

/// Suite over a Redis connection manager
pub struct RedisSuite {
    conn: ConnectionManager,
    fixture: CacheFixture,
    tag: FixtureTag,
}

impl RedisSuite {
    /// Open the connection; failure is fatal to the suite
    pub async fn connect(settings: &RedisSettings, tag: FixtureTag) -> Result<Self, HarnessError> {
        let client = Client::open(settings.url()).map_err(|e| {
            HarnessError::Connection(format!("Redis client creation failed: {}", e))
        })?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| HarnessError::Connection(format!("Redis connection failed: {}", e)))?;

        debug!(host = %settings.host, port = settings.port, db = settings.db, "Redis connection ready");
        Ok(Self {
            conn,
            fixture: CacheFixture::new(&tag)?,
            tag,
        })
    }

    async fn set_item(&self, key: &str, item: &CacheItem) -> Result<String, HarnessError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(item)?;
        let status: String = conn.set(key, payload).await.map_err(redis_err("SET"))?;
        ensure_eq("SET reply", status.as_str(), "OK")?;
        Ok(key.to_string())
    }

    async fn get_item(&self, key: &str, expected: &CacheItem) -> Result<(), HarnessError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(redis_err("GET"))?;
        let raw = match value {
            Some(raw) => raw,
            None => return Err(HarnessError::assertion("GET reply", "a value", "nil")),
        };
        let decoded: CacheItem = serde_json::from_str(&raw)?;
        ensure_eq("cached value", &decoded, expected)
    }

    async fn exists(&self, key: &str) -> Result<i64, HarnessError> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(redis_err("EXISTS"))
    }

    async fn expect_exists(&self, key: &str, expected: i64) -> Result<(), HarnessError> {
        ensure_eq("EXISTS reply", self.exists(key).await?, expected)
    }

    async fn expire_key(&self, key: &str, seconds: i64) -> Result<(), HarnessError> {
        let mut conn = self.conn.clone();
        let set: bool = conn.expire(key, seconds).await.map_err(redis_err("EXPIRE"))?;
        ensure(set, "EXPIRE reply", "true", set)?;

        let ttl: i64 = conn.ttl(key).await.map_err(redis_err("TTL"))?;
        ensure_in("TTL", ttl, 1..=seconds)
    }

    async fn delete_key(&self, key: &str) -> Result<(), HarnessError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await.map_err(redis_err("DEL"))?;
        ensure_eq("DEL reply", removed, 1)?;
        self.expect_exists(key, 0).await
    }

    async fn hash_operations(&self, fixture: &CacheFixture) -> Result<(), HarnessError> {
        let mut conn = self.conn.clone();
        let key = fixture.hash_key.as_str();

        let added: i64 = conn
            .hset(key, &fixture.field1, &fixture.value1)
            .await
            .map_err(redis_err("HSET"))?;
        ensure_eq("HSET reply", added, 1)?;

        let value: Option<String> = conn
            .hget(key, &fixture.field1)
            .await
            .map_err(redis_err("HGET"))?;
        ensure_eq("HGET reply", value.as_deref(), Some(fixture.value1.as_str()))?;

        // Field/value pair form; HSET still reports the number of new fields
        let added: i64 = redis::cmd("HSET")
            .arg(key)
            .arg(&fixture.field2)
            .arg(&fixture.value2)
            .query_async(&mut conn)
            .await
            .map_err(redis_err("HSET"))?;
        ensure_eq("HSET reply", added, 1)?;

        let all: HashMap<String, String> =
            conn.hgetall(key).await.map_err(redis_err("HGETALL"))?;
        ensure_eq(
            &fixture.field1,
            all.get(&fixture.field1).map(String::as_str),
            Some(fixture.value1.as_str()),
        )?;
        ensure_eq(
            &fixture.field2,
            all.get(&fixture.field2).map(String::as_str),
            Some(fixture.value2.as_str()),
        )?;

        let removed: i64 = conn.del(key).await.map_err(redis_err("DEL"))?;
        ensure_eq("DEL reply", removed, 1)
    }

    /// Keys this run may have written
    fn fixture_keys(&self) -> Result<[&str; 2], HarnessError> {
        let keys = [self.fixture.key.as_str(), self.fixture.hash_key.as_str()];
        for key in keys {
            self.tag.ensure_owned(key)?;
        }
        Ok(keys)
    }
}

#[async_trait]
impl Suite for RedisSuite {
    fn store(&self) -> Store {
        Store::Redis
    }

    fn plan(&self) -> &'static [&'static str] {
        REDIS_PLAN
    }

    async fn run_steps(&self, recorder: &mut StepRecorder) -> Result<(), HarnessError> {
        let fixture = &self.fixture;

        let key = recorder
            .step(REDIS_PLAN[0], self.set_item(&fixture.key, &fixture.item))
            .await?;
        recorder
            .step(REDIS_PLAN[1], self.get_item(&key, &fixture.item))
            .await?;
        recorder
            .step(REDIS_PLAN[2], self.expect_exists(&key, 1))
            .await?;
        recorder
            .step(
                REDIS_PLAN[3],
                self.expire_key(&key, CacheFixture::TTL_SECS),
            )
            .await?;
        recorder
            .step(REDIS_PLAN[4], self.delete_key(&key))
            .await?;
        recorder
            .step(REDIS_PLAN[5], self.hash_operations(fixture))
            .await
    }

    async fn teardown(&self) -> Result<(), HarnessError> {
        let keys = self.fixture_keys()?;
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(&keys[..]).await.map_err(redis_err("DEL"))?;
        if removed > 0 {
            debug!(removed, "Removed leftover Redis fixtures");
        }
        Ok(())
    }

    async fn residue(&self) -> Result<u64, HarnessError> {
        let keys = self.fixture_keys()?;
        let mut conn = self.conn.clone();
        let left: i64 = conn.exists(&keys[..]).await.map_err(redis_err("EXISTS"))?;
        Ok(left.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), HarnessError> {
        let mut conn = self.conn.clone();
        let response: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| HarnessError::Connection(format!("Redis health check failed: {}", e)))?;
        ensure_eq("PING reply", response.as_str(), "PONG")
    }

    async fn close(&self) -> Result<(), HarnessError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("QUIT")
            .query_async(&mut conn)
            .await
            .map_err(redis_err("QUIT"))?;
        ensure_eq("QUIT reply", reply.as_str(), "OK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::run_suite;

    #[test]
    fn test_plan_ends_with_hash_operations() {
        assert_eq!(REDIS_PLAN.len(), 6);
        assert_eq!(REDIS_PLAN[5], "HASH operaciones");
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis instance on port 6380
    async fn test_redis_suite() {
        let settings = proyecto_settings::settings();
        let suite = RedisSuite::connect(&settings.redis, FixtureTag::new())
            .await
            .unwrap();
        let report = run_suite(&suite).await;
        assert!(report.passed(), "{:#?}", report);
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis instance on port 6380
    async fn test_redis_close_quits() {
        let settings = proyecto_settings::settings();
        let suite = RedisSuite::connect(&settings.redis, FixtureTag::new())
            .await
            .unwrap();
        suite.ping().await.unwrap();
        tokio_test::assert_ok!(suite.close().await);
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis instance on port 6380
    async fn test_redis_teardown_removes_keys_left_by_a_failed_run() {
        let settings = proyecto_settings::settings();
        let suite = RedisSuite::connect(&settings.redis, FixtureTag::new())
            .await
            .unwrap();
        let key = suite
            .set_item(&suite.fixture.key, &suite.fixture.item)
            .await
            .unwrap();
        assert_eq!(suite.exists(&key).await.unwrap(), 1);
        assert_eq!(suite.residue().await.unwrap(), 1);

        suite.teardown().await.unwrap();
        assert_eq!(suite.residue().await.unwrap(), 0);
        suite.close().await.unwrap();
    }
}
