//! MongoDB suite: `product_images` and `category_images`

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, DateTime, Document};
use mongodb::{options::ClientOptions, Client, Collection, Database};
use proyecto_core::check::{ensure, ensure_eq};
use proyecto_core::{FixtureTag, HarnessError, ImageFixture, MongoSettings};
use proyecto_types::Store;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::recorder::StepRecorder;
use super::traits::Suite;

/// Step names, in order
pub const MONGODB_PLAN: &[&str] = &[
    "CREATE imagen de producto",
    "READ imagen de producto",
    "UPDATE imagen de producto",
    "CREATE imagen de categoria",
    "READ imagen de categoria",
    "DELETE imagenes",
];

fn mongo_err(op: &'static str) -> impl FnOnce(mongodb::error::Error) -> HarnessError {
    move |e| HarnessError::MongoDB(format!("{} failed: {}", op, e))
}

/// Which catalog collection an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Product,
    Category,
}

impl ImageKind {
    pub fn collection(&self) -> &'static str {
        match self {
            ImageKind::Product => "product_images",
            ImageKind::Category => "category_images",
        }
    }

    /// Field holding the owning entity's id
    pub fn owner_field(&self) -> &'static str {
        match self {
            ImageKind::Product => "product_id",
            ImageKind::Category => "category_id",
        }
    }
}

/// Image document as stored in the catalog collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub name: String,
    pub url: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub format: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl ImageDocument {
    pub fn new(kind: ImageKind, fixture: &ImageFixture) -> Self {
        let now = DateTime::now();
        let (product_id, category_id) = match kind {
            ImageKind::Product => (Some(fixture.owner_id.clone()), None),
            ImageKind::Category => (None, Some(fixture.owner_id.clone())),
        };
        Self {
            id: None,
            product_id,
            category_id,
            name: fixture.name.clone(),
            url: fixture.url.clone(),
            size: fixture.size,
            width: fixture.width,
            height: fixture.height,
            format: fixture.format.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// `product_id` or `category_id`, whichever is set
    pub fn owner_id(&self) -> Option<&str> {
        self.product_id
            .as_deref()
            .or(self.category_id.as_deref())
    }
}

/// Suite over a MongoDB client, using the database named in the connection string
pub struct MongoDbSuite {
    client: Client,
    db: Database,
    tag: FixtureTag,
}

impl MongoDbSuite {
    /// Build the client and ping the server; failure is fatal to the suite
    pub async fn connect(settings: &MongoSettings, tag: FixtureTag) -> Result<Self, HarnessError> {
        let mut options = ClientOptions::parse(settings.url()).await.map_err(|e| {
            HarnessError::Connection(format!("MongoDB options parse failed: {}", e))
        })?;
        options.max_pool_size = options.max_pool_size.or(Some(settings.max_pool_size));

        let client = Client::with_options(options).map_err(|e| {
            HarnessError::Connection(format!("MongoDB client creation failed: {}", e))
        })?;
        let db = client.default_database().ok_or_else(|| {
            HarnessError::Config("No default database in MongoDB connection string".to_string())
        })?;

        // The driver connects lazily; force a round trip now
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| HarnessError::Connection(format!("MongoDB connection failed: {}", e)))?;

        debug!(database = %db.name(), "MongoDB client ready");
        Ok(Self { client, db, tag })
    }

    fn images(&self, kind: ImageKind) -> Collection<ImageDocument> {
        self.db.collection(kind.collection())
    }

    async fn insert_image(
        &self,
        kind: ImageKind,
        image: &ImageDocument,
    ) -> Result<ObjectId, HarnessError> {
        let result = self
            .images(kind)
            .insert_one(image, None)
            .await
            .map_err(mongo_err("insertOne"))?;

        // An acknowledged insert reports the generated _id
        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(HarnessError::assertion("insertedId", "an ObjectId", other)),
        }
    }

    async fn find_image(
        &self,
        kind: ImageKind,
        id: ObjectId,
    ) -> Result<Option<ImageDocument>, HarnessError> {
        self.images(kind)
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(mongo_err("findOne"))
    }

    async fn read_image(
        &self,
        kind: ImageKind,
        id: ObjectId,
        expected: &ImageDocument,
    ) -> Result<(), HarnessError> {
        let image = match self.find_image(kind, id).await? {
            Some(image) => image,
            None => return Err(HarnessError::assertion("document", "a document", "null")),
        };

        ensure_eq(kind.owner_field(), image.owner_id(), expected.owner_id())?;
        ensure_eq("name", image.name.as_str(), expected.name.as_str())?;
        ensure_eq("url", image.url.as_str(), expected.url.as_str())
    }

    async fn rename_image(
        &self,
        kind: ImageKind,
        id: ObjectId,
        name: &str,
    ) -> Result<(), HarnessError> {
        let result = self
            .images(kind)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "name": name, "updated_at": DateTime::now() } },
                None,
            )
            .await
            .map_err(mongo_err("updateOne"))?;

        ensure_eq("matchedCount", result.matched_count, 1)?;
        ensure_eq("modifiedCount", result.modified_count, 1)?;

        let updated = self.find_image(kind, id).await?;
        ensure_eq(
            "name",
            updated.as_ref().map(|image| image.name.as_str()),
            Some(name),
        )
    }

    async fn delete_images(&self, product: ObjectId, category: ObjectId) -> Result<(), HarnessError> {
        for (kind, id) in [(ImageKind::Product, product), (ImageKind::Category, category)] {
            let result = self
                .images(kind)
                .delete_one(doc! { "_id": id }, None)
                .await
                .map_err(mongo_err("deleteOne"))?;
            ensure_eq("deletedCount", result.deleted_count, 1)?;
        }

        for (kind, id) in [(ImageKind::Product, product), (ImageKind::Category, category)] {
            let found = self.find_image(kind, id).await?;
            ensure(found.is_none(), kind.collection(), "no document", &found)?;
        }
        Ok(())
    }

    /// Filters matching this run's fixtures, one per collection
    fn fixture_filters(&self) -> Result<Vec<(ImageKind, Document)>, HarnessError> {
        [
            (ImageKind::Product, ImageFixture::product(&self.tag)),
            (ImageKind::Category, ImageFixture::category(&self.tag)),
        ]
        .into_iter()
        .map(|(kind, fixture)| {
            self.tag.ensure_owned(&fixture.owner_id)?;
            let mut filter = Document::new();
            filter.insert(kind.owner_field(), fixture.owner_id);
            Ok((kind, filter))
        })
        .collect()
    }
}

#[async_trait]
impl Suite for MongoDbSuite {
    fn store(&self) -> Store {
        Store::Mongodb
    }

    fn plan(&self) -> &'static [&'static str] {
        MONGODB_PLAN
    }

    async fn run_steps(&self, recorder: &mut StepRecorder) -> Result<(), HarnessError> {
        let product = ImageDocument::new(ImageKind::Product, &ImageFixture::product(&self.tag));
        let category =
            ImageDocument::new(ImageKind::Category, &ImageFixture::category(&self.tag));

        let product_id = recorder
            .step(MONGODB_PLAN[0], self.insert_image(ImageKind::Product, &product))
            .await?;
        recorder
            .step(
                MONGODB_PLAN[1],
                self.read_image(ImageKind::Product, product_id, &product),
            )
            .await?;
        recorder
            .step(
                MONGODB_PLAN[2],
                self.rename_image(
                    ImageKind::Product,
                    product_id,
                    ImageFixture::UPDATED_PRODUCT_NAME,
                ),
            )
            .await?;

        let category_id = recorder
            .step(MONGODB_PLAN[3], self.insert_image(ImageKind::Category, &category))
            .await?;
        recorder
            .step(
                MONGODB_PLAN[4],
                self.read_image(ImageKind::Category, category_id, &category),
            )
            .await?;
        recorder
            .step(MONGODB_PLAN[5], self.delete_images(product_id, category_id))
            .await
    }

    async fn teardown(&self) -> Result<(), HarnessError> {
        for (kind, filter) in self.fixture_filters()? {
            self.images(kind)
                .delete_many(filter, None)
                .await
                .map_err(mongo_err("deleteMany"))?;
        }
        Ok(())
    }

    async fn residue(&self) -> Result<u64, HarnessError> {
        let mut left = 0;
        for (kind, filter) in self.fixture_filters()? {
            left += self
                .images(kind)
                .count_documents(filter, None)
                .await
                .map_err(mongo_err("countDocuments"))?;
        }
        Ok(left)
    }

    async fn ping(&self) -> Result<(), HarnessError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| HarnessError::Connection(format!("MongoDB health check failed: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), HarnessError> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::run_suite;

    #[test]
    fn test_image_document_owner_field() {
        let tag = FixtureTag::from_stamp(9);
        let product = ImageDocument::new(ImageKind::Product, &ImageFixture::product(&tag));
        let category = ImageDocument::new(ImageKind::Category, &ImageFixture::category(&tag));

        let product_doc = bson::to_document(&product).unwrap();
        assert_eq!(product_doc.get_str("product_id").unwrap(), "test-product-9");
        assert!(!product_doc.contains_key("category_id"));
        assert!(!product_doc.contains_key("_id"));

        let category_doc = bson::to_document(&category).unwrap();
        assert_eq!(category_doc.get_str("category_id").unwrap(), "test-category-9");
        assert_eq!(category_doc.get_i64("size").unwrap(), 2048);
        assert!(!category_doc.contains_key("product_id"));
    }

    #[test]
    fn test_image_document_reads_back() {
        let tag = FixtureTag::from_stamp(9);
        let mut product = ImageDocument::new(ImageKind::Product, &ImageFixture::product(&tag));
        product.id = Some(ObjectId::new());

        let doc = bson::to_document(&product).unwrap();
        let back: ImageDocument = bson::from_document(doc).unwrap();
        assert_eq!(back, product);
        assert_eq!(back.owner_id(), Some("test-product-9"));
    }

    #[test]
    fn test_collections() {
        assert_eq!(ImageKind::Product.collection(), "product_images");
        assert_eq!(ImageKind::Category.owner_field(), "category_id");
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB instance on port 27018
    async fn test_mongodb_suite() {
        let settings = proyecto_settings::settings();
        let suite = MongoDbSuite::connect(&settings.mongo, FixtureTag::new())
            .await
            .unwrap();
        let report = run_suite(&suite).await;
        assert!(report.passed(), "{:#?}", report);
    }
}
