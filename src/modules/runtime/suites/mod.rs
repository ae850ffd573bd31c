//! Store suites for proyecto-db
//!
//! One suite per backend. Each suite runs a fixed chain of CRUD steps against
//! its store and cleans up the fixtures it created.

mod manager;
mod mongodb;
mod mysql;
mod postgres;
mod recorder;
mod redis;
mod report;
mod traits;

pub use manager::SuiteManager;
pub use mongodb::{ImageDocument, ImageKind, MongoDbSuite, MONGODB_PLAN};
pub use mysql::{MySqlSuite, MYSQL_PLAN};
pub use postgres::{PostgresSuite, POSTGRES_PLAN};
pub use recorder::{run_suite, StepRecorder};
pub use redis::{RedisSuite, REDIS_PLAN};
pub use report::{StepCounts, StepOutcome, StepStatus, SuiteReport};
pub use traits::Suite;
