//! Suite manager: connects and runs the selected store suites

use futures::stream::{self, StreamExt};
use proyecto_core::{FixtureTag, HarnessError, Settings};
use proyecto_types::Store;
use std::sync::Arc;
use tracing::{error, info};

use super::mongodb::MongoDbSuite;
use super::mysql::MySqlSuite;
use super::postgres::PostgresSuite;
use super::recorder::run_suite;
use super::redis::RedisSuite;
use super::report::SuiteReport;
use super::traits::Suite;

/// Runs store suites against one set of settings, under one fixture tag
pub struct SuiteManager {
    settings: Arc<Settings>,
    tag: FixtureTag,
}

impl SuiteManager {
    /// Create a manager with a fresh fixture tag
    pub fn new(settings: Settings) -> Self {
        Self::with_tag(settings, FixtureTag::new())
    }

    /// Create a manager with an explicit fixture tag
    pub fn with_tag(settings: Settings, tag: FixtureTag) -> Self {
        Self {
            settings: Arc::new(settings),
            tag,
        }
    }

    pub fn tag(&self) -> FixtureTag {
        self.tag
    }

    /// Connect a single store suite
    pub async fn connect(
        store: Store,
        settings: &Settings,
        tag: FixtureTag,
    ) -> Result<Box<dyn Suite>, HarnessError> {
        info!(store = %store, endpoint = %settings.endpoint(store), "Connecting");
        let suite: Box<dyn Suite> = match store {
            Store::Mysql => Box::new(MySqlSuite::connect(&settings.mysql, tag).await?),
            Store::Postgres => Box::new(PostgresSuite::connect(&settings.postgres, tag).await?),
            Store::Mongodb => Box::new(MongoDbSuite::connect(&settings.mongo, tag).await?),
            Store::Redis => Box::new(RedisSuite::connect(&settings.redis, tag).await?),
        };
        Ok(suite)
    }

    async fn run_store(store: Store, settings: &Settings, tag: FixtureTag) -> SuiteReport {
        match Self::connect(store, settings, tag).await {
            Ok(suite) => run_suite(suite.as_ref()).await,
            Err(e) => {
                error!(store = %store, error = %e, "Suite setup failed");
                SuiteReport::setup_failed(store, e)
            }
        }
    }

    /// Run suites one after another, in the order given
    pub async fn run_sequential(&self, stores: &[Store]) -> Vec<SuiteReport> {
        let mut reports = Vec::new();
        for store in unique(stores) {
            reports.push(Self::run_store(store, &self.settings, self.tag).await);
        }
        reports
    }

    /// Run suites on their own tasks; reports come back in the order given
    ///
    /// Each suite owns its connection, so suites never share state. A failed
    /// connection only fails that store's report.
    pub async fn run_concurrent(&self, stores: &[Store]) -> Vec<SuiteReport> {
        let handles: Vec<_> = unique(stores)
            .into_iter()
            .map(|store| {
                let settings = Arc::clone(&self.settings);
                let tag = self.tag;
                let handle =
                    tokio::spawn(async move { Self::run_store(store, &settings, tag).await });
                (store, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (store, handle) in handles {
            let report = handle.await.unwrap_or_else(|e| {
                SuiteReport::setup_failed(store, format!("Task join error: {}", e))
            });
            reports.push(report);
        }
        reports
    }

    /// Health-check the selected stores concurrently
    pub async fn ping_all(&self, stores: &[Store]) -> Vec<(Store, Result<(), String>)> {
        let settings = &self.settings;
        let tag = self.tag;

        let mut results: Vec<_> = stream::iter(unique(stores))
            .map(|store| async move {
                let result = Self::ping_store(store, settings, tag)
                    .await
                    .map_err(|e| e.to_string());
                (store, result)
            })
            .buffer_unordered(4)
            .collect()
            .await;

        results.sort_by_key(|(store, _)| *store);
        results
    }

    async fn ping_store(store: Store, settings: &Settings, tag: FixtureTag) -> Result<(), HarnessError> {
        let suite = Self::connect(store, settings, tag).await?;
        let result = suite.ping().await;
        suite.close().await?;
        result
    }
}

/// Drop repeated stores, keeping first occurrences in order
fn unique(stores: &[Store]) -> Vec<Store> {
    let mut seen = Vec::with_capacity(stores.len());
    for store in stores {
        if !seen.contains(store) {
            seen.push(*store);
        }
    }
    seen
}
