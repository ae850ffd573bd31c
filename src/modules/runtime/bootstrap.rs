//! MongoDB catalog bootstrap
//!
//! Creates the catalog user, the image collections and their owner indexes.
//! Runs once against a fresh server: there are no existence checks, so a second
//! run fails with the driver's duplicate-user error.

use bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, IndexModel};
use proyecto_core::{HarnessError, MongoSettings};
use serde::Serialize;
use tracing::info;

fn mongo_err(op: &'static str) -> impl FnOnce(mongodb::error::Error) -> HarnessError {
    move |e| HarnessError::MongoDB(format!("{} failed: {}", op, e))
}

/// A collection and the field indexed on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub index_field: &'static str,
}

/// What the bootstrap creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub database: &'static str,
    pub user: &'static str,
    pub password: &'static str,
    pub role: &'static str,
    pub collections: Vec<CollectionSpec>,
}

impl BootstrapPlan {
    /// The catalog database used by the image collections
    pub fn catalog() -> Self {
        Self {
            database: "catalog",
            user: "catalog_user",
            password: "catalog_password",
            role: "readWrite",
            collections: vec![
                CollectionSpec {
                    name: "product_images",
                    index_field: "product_id",
                },
                CollectionSpec {
                    name: "category_images",
                    index_field: "category_id",
                },
            ],
        }
    }

    /// `createUser` command granting the plan's role on its database
    pub fn create_user_command(&self) -> Document {
        doc! {
            "createUser": self.user,
            "pwd": self.password,
            "roles": [ { "role": self.role, "db": self.database } ],
        }
    }
}

/// What a bootstrap run created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapSummary {
    pub database: String,
    pub user: String,
    pub collections: Vec<String>,
    pub indexes: Vec<String>,
}

/// Apply `plan` using the root credentials in `settings`
pub async fn bootstrap(
    settings: &MongoSettings,
    plan: &BootstrapPlan,
) -> Result<BootstrapSummary, HarnessError> {
    let options = ClientOptions::parse(settings.url())
        .await
        .map_err(|e| HarnessError::Connection(format!("MongoDB options parse failed: {}", e)))?;
    let client = Client::with_options(options).map_err(|e| {
        HarnessError::Connection(format!("MongoDB client creation failed: {}", e))
    })?;

    let result = apply(&client, plan).await;
    client.shutdown().await;
    result
}

async fn apply(client: &Client, plan: &BootstrapPlan) -> Result<BootstrapSummary, HarnessError> {
    let db = client.database(plan.database);

    db.run_command(plan.create_user_command(), None)
        .await
        .map_err(mongo_err("createUser"))?;
    info!(database = plan.database, user = plan.user, "Created user");

    let mut summary = BootstrapSummary {
        database: plan.database.to_string(),
        user: plan.user.to_string(),
        collections: Vec::new(),
        indexes: Vec::new(),
    };

    for spec in &plan.collections {
        db.create_collection(spec.name, None)
            .await
            .map_err(mongo_err("createCollection"))?;
        summary.collections.push(spec.name.to_string());
        info!(collection = spec.name, "Created collection");
    }

    for spec in &plan.collections {
        let mut keys = Document::new();
        keys.insert(spec.index_field, 1);
        let created = db
            .collection::<Document>(spec.name)
            .create_index(IndexModel::builder().keys(keys).build(), None)
            .await
            .map_err(mongo_err("createIndex"))?;
        info!(collection = spec.name, index = %created.index_name, "Created index");
        summary.indexes.push(created.index_name);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_plan() {
        let plan = BootstrapPlan::catalog();
        assert_eq!(plan.database, "catalog");
        assert_eq!(plan.collections.len(), 2);
        assert_eq!(plan.collections[0].name, "product_images");
        assert_eq!(plan.collections[1].index_field, "category_id");
    }

    #[test]
    fn test_create_user_command() {
        let command = BootstrapPlan::catalog().create_user_command();
        assert_eq!(command.get_str("createUser").unwrap(), "catalog_user");
        assert_eq!(command.get_str("pwd").unwrap(), "catalog_password");

        let roles = command.get_array("roles").unwrap();
        assert_eq!(roles.len(), 1);
        let role = roles[0].as_document().unwrap();
        assert_eq!(role.get_str("role").unwrap(), "readWrite");
        assert_eq!(role.get_str("db").unwrap(), "catalog");
    }

    #[tokio::test]
    #[ignore] // Requires a fresh MongoDB instance on port 27018
    async fn test_bootstrap_then_repeat_fails() {
        let settings = proyecto_settings::settings();
        let plan = BootstrapPlan::catalog();

        let summary = bootstrap(&settings.mongo, &plan).await.unwrap();
        assert_eq!(summary.collections, vec!["product_images", "category_images"]);
        assert_eq!(summary.indexes, vec!["product_id_1", "category_id_1"]);

        let err = bootstrap(&settings.mongo, &plan).await.unwrap_err();
        assert!(matches!(err, HarnessError::MongoDB(_)), "{}", err);
    }
}
