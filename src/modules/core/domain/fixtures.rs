//! Fixture records written by the store suites
//!
//! Every identifier produced here carries the run's [`FixtureTag`], so
//! teardown only ever touches rows, documents and keys created by that run.

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// `test-<stamp>`, `test-<kind>-<stamp>` or `test:<kind>:<stamp>`
static FIXTURE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^test(?:-[a-z]+)?-(\d+)$|^test:[a-z]+:(\d+)$").unwrap());

/// Marks the fixtures of one harness run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixtureTag {
    stamp: u64,
}

impl FixtureTag {
    /// Tag stamped with the current time in milliseconds
    pub fn new() -> Self {
        Self::from_stamp(Utc::now().timestamp_millis())
    }

    /// Tag with an explicit stamp; the sign is dropped
    pub fn from_stamp(stamp: i64) -> Self {
        Self {
            stamp: stamp.unsigned_abs(),
        }
    }

    /// Primary key for relational fixtures: `test-<stamp>`
    pub fn id(&self) -> String {
        format!("test-{}", self.stamp)
    }

    /// Owner id for document fixtures: `test-<kind>-<stamp>`
    pub fn scoped_id(&self, kind: &str) -> String {
        format!("test-{}-{}", kind, self.stamp)
    }

    /// Redis key: `test:<kind>:<stamp>`
    pub fn key(&self, kind: &str) -> String {
        format!("test:{}:{}", kind, self.stamp)
    }

    /// Relational id to clean up, checked against the fixture pattern
    pub fn owned_id(&self) -> Result<String> {
        let id = self.id();
        self.ensure_owned(&id)?;
        Ok(id)
    }

    /// Returns true if `value` is a fixture identifier created by this run
    pub fn owns(&self, value: &str) -> bool {
        FIXTURE_PATTERN
            .captures(value)
            .and_then(|cap| cap.get(1).or_else(|| cap.get(2)))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(|stamp| stamp == self.stamp)
            .unwrap_or(false)
    }

    /// Refuse to clean up anything this run did not create
    pub fn ensure_owned(&self, value: &str) -> Result<()> {
        if self.owns(value) {
            Ok(())
        } else {
            Err(HarnessError::Fixture(format!(
                "'{}' is not a fixture of run {}",
                value, self.stamp
            )))
        }
    }
}

impl Default for FixtureTag {
    fn default() -> Self {
        Self::new()
    }
}

/// Row of the `productos` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producto {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    pub precio_base: f64,
    pub categoria: String,
    pub estado: String,
}

impl Producto {
    /// Price written by the update step
    pub const UPDATED_PRICE: f64 = 129.99;

    pub fn fixture(tag: &FixtureTag) -> Self {
        Self {
            id: tag.id(),
            nombre: "Producto de Prueba".to_string(),
            descripcion: "Este es un producto de prueba".to_string(),
            precio_base: 99.99,
            categoria: "test".to_string(),
            estado: "activo".to_string(),
        }
    }
}

/// Row of the `dimensiones` table; references `productos.id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensiones {
    pub id_producto: String,
    pub ancho: f64,
    pub alto: f64,
    pub profundo: f64,
}

impl Dimensiones {
    pub fn for_producto(id_producto: &str) -> Self {
        Self {
            id_producto: id_producto.to_string(),
            ancho: 10.5,
            alto: 20.5,
            profundo: 15.0,
        }
    }
}

/// Row of the `materiales` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub nombre: String,
    pub tipo: String,
    pub fabricante: String,
    pub disponible: bool,
    pub stock: f64,
    pub precio_por_unidad: f64,
}

impl Material {
    /// Price written by the update step
    pub const UPDATED_PRICE: f64 = 34.99;

    pub fn fixture(tag: &FixtureTag) -> Self {
        Self {
            id: tag.id(),
            nombre: "Material de Prueba".to_string(),
            tipo: "filamento".to_string(),
            fabricante: "Test Labs".to_string(),
            disponible: true,
            stock: 100.0,
            precio_por_unidad: 29.99,
        }
    }
}

/// Row of the `caracteristicas_materiales` table; references `materiales.id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caracteristicas {
    pub id_material: String,
    pub color: String,
    pub temperatura_impresion: i32,
    pub temperatura_plataforma: i32,
    pub resistencia_tensil: f64,
    pub dureza: f64,
    pub diametro_filamento: f64,
    pub densidad: f64,
    pub viscosidad: f64,
    pub tiempo_cura: i32,
    pub tolerancia: f64,
}

impl Caracteristicas {
    pub fn for_material(id_material: &str) -> Self {
        Self {
            id_material: id_material.to_string(),
            color: "negro".to_string(),
            temperatura_impresion: 210,
            temperatura_plataforma: 60,
            resistencia_tensil: 50.5,
            dureza: 98.0,
            diametro_filamento: 1.75,
            densidad: 1.24,
            viscosidad: 350.0,
            tiempo_cura: 8,
            tolerancia: 0.1,
        }
    }
}

/// Image metadata stored in the catalog collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFixture {
    /// `product_id` or `category_id`, depending on the collection
    pub owner_id: String,
    pub name: String,
    pub url: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub format: String,
}

impl ImageFixture {
    /// Name written by the product image update step
    pub const UPDATED_PRODUCT_NAME: &'static str = "updated-product-image.jpg";

    pub fn product(tag: &FixtureTag) -> Self {
        Self {
            owner_id: tag.scoped_id("product"),
            name: "test-product-image.jpg".to_string(),
            url: "https://example.com/images/test-product.jpg".to_string(),
            size: 1024,
            width: 800,
            height: 600,
            format: "jpg".to_string(),
        }
    }

    pub fn category(tag: &FixtureTag) -> Self {
        Self {
            owner_id: tag.scoped_id("category"),
            name: "test-category-image.jpg".to_string(),
            url: "https://example.com/categories/test-category.jpg".to_string(),
            size: 2048,
            width: 1200,
            height: 800,
            format: "jpg".to_string(),
        }
    }
}

/// Value cached as JSON under the cache key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheItem {
    pub id: String,
    pub name: String,
    pub value: i64,
    pub timestamp: String,
}

impl CacheItem {
    pub fn fixture(tag: &FixtureTag) -> Self {
        Self {
            id: tag.id(),
            name: "Test Cache Item".to_string(),
            value: 42,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Keys and field values for the cache suite
#[derive(Debug, Clone, PartialEq)]
pub struct CacheFixture {
    pub key: String,
    pub item: CacheItem,
    pub hash_key: String,
    pub field1: String,
    pub value1: String,
    pub field2: String,
    /// JSON-encoded structured value
    pub value2: String,
}

impl CacheFixture {
    /// Seconds passed to EXPIRE
    pub const TTL_SECS: i64 = 60;

    pub fn new(tag: &FixtureTag) -> Result<Self> {
        Ok(Self {
            key: tag.key("key"),
            item: CacheItem::fixture(tag),
            hash_key: tag.key("hash"),
            field1: "field1".to_string(),
            value1: "value1".to_string(),
            field2: "field2".to_string(),
            value2: serde_json::to_string(&serde_json::json!({ "test": "data" }))?,
        })
    }
}
