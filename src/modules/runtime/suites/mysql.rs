//! MySQL suite: `productos` and `dimensiones`

use async_trait::async_trait;
use proyecto_core::check::{ensure_decimal_eq, ensure_eq};
use proyecto_core::{Dimensiones, FixtureTag, HarnessError, MySqlSettings, Producto};
use proyecto_types::Store;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::debug;

use super::recorder::StepRecorder;
use super::traits::Suite;

/// Step names, in order
pub const MYSQL_PLAN: &[&str] = &[
    "CREATE producto",
    "READ producto",
    "UPDATE producto",
    "CREATE dimensiones",
    "READ dimensiones",
    "DELETE dimensiones y producto",
];

fn query_err(op: &'static str) -> impl FnOnce(sqlx::Error) -> HarnessError {
    move |e| HarnessError::Database(format!("MySQL {} failed: {}", op, e))
}

fn column<T>(row: &MySqlRow, name: &str) -> Result<T, HarnessError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(name)
        .map_err(|e| HarnessError::Database(format!("MySQL column '{}': {}", name, e)))
}

/// Suite over a MySQL pool
pub struct MySqlSuite {
    pool: MySqlPool,
    tag: FixtureTag,
}

impl MySqlSuite {
    /// Open the pool; failure is fatal to the suite
    pub async fn connect(settings: &MySqlSettings, tag: FixtureTag) -> Result<Self, HarnessError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(settings.pool.max_connections())
            .min_connections(settings.pool.min_connections())
            .acquire_timeout(settings.pool.acquire_timeout())
            .idle_timeout(settings.pool.idle_timeout())
            .connect(&settings.url())
            .await
            .map_err(|e| HarnessError::Connection(format!("MySQL connection failed: {}", e)))?;

        debug!(host = %settings.host, port = settings.port, "MySQL pool ready");
        Ok(Self { pool, tag })
    }

    async fn create_producto(&self, producto: &Producto) -> Result<String, HarnessError> {
        let result = sqlx::query(
            "INSERT INTO productos (id, nombre, descripcion, precio_base, categoria, estado) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&producto.id)
        .bind(&producto.nombre)
        .bind(&producto.descripcion)
        .bind(producto.precio_base)
        .bind(&producto.categoria)
        .bind(&producto.estado)
        .execute(&self.pool)
        .await
        .map_err(query_err("insert producto"))?;

        ensure_eq("affected rows", result.rows_affected(), 1)?;
        Ok(producto.id.clone())
    }

    async fn read_producto(&self, id: &str, expected: &Producto) -> Result<(), HarnessError> {
        let rows = sqlx::query(
            "SELECT id, nombre, descripcion, CAST(precio_base AS CHAR) AS precio_base, \
             categoria, estado FROM productos WHERE id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("select producto"))?;

        ensure_eq("rows", rows.len(), 1)?;
        let row = &rows[0];
        ensure_eq("nombre", column::<String>(row, "nombre")?, expected.nombre.clone())?;
        ensure_eq(
            "descripcion",
            column::<String>(row, "descripcion")?,
            expected.descripcion.clone(),
        )?;
        ensure_eq("categoria", column::<String>(row, "categoria")?, expected.categoria.clone())?;
        ensure_eq("estado", column::<String>(row, "estado")?, expected.estado.clone())?;
        ensure_decimal_eq(
            "precio_base",
            &column::<String>(row, "precio_base")?,
            expected.precio_base,
        )
    }

    async fn update_precio(&self, id: &str, precio: f64) -> Result<(), HarnessError> {
        let result = sqlx::query("UPDATE productos SET precio_base = ? WHERE id = ?")
            .bind(precio)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_err("update producto"))?;
        ensure_eq("affected rows", result.rows_affected(), 1)?;

        let row = sqlx::query("SELECT CAST(precio_base AS CHAR) AS precio_base FROM productos WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(query_err("select precio_base"))?;
        ensure_decimal_eq("precio_base", &column::<String>(&row, "precio_base")?, precio)
    }

    async fn create_dimensiones(&self, dimensiones: &Dimensiones) -> Result<String, HarnessError> {
        let result = sqlx::query(
            "INSERT INTO dimensiones (id_producto, ancho, alto, profundo) VALUES (?, ?, ?, ?)",
        )
        .bind(&dimensiones.id_producto)
        .bind(dimensiones.ancho)
        .bind(dimensiones.alto)
        .bind(dimensiones.profundo)
        .execute(&self.pool)
        .await
        .map_err(query_err("insert dimensiones"))?;

        ensure_eq("affected rows", result.rows_affected(), 1)?;
        Ok(dimensiones.id_producto.clone())
    }

    async fn read_dimensiones(&self, id_producto: &str, expected: &Dimensiones) -> Result<(), HarnessError> {
        let rows = sqlx::query(
            "SELECT CAST(ancho AS CHAR) AS ancho, CAST(alto AS CHAR) AS alto, \
             CAST(profundo AS CHAR) AS profundo FROM dimensiones WHERE id_producto = ?",
        )
        .bind(id_producto)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("select dimensiones"))?;

        ensure_eq("rows", rows.len(), 1)?;
        let row = &rows[0];
        ensure_decimal_eq("ancho", &column::<String>(row, "ancho")?, expected.ancho)?;
        ensure_decimal_eq("alto", &column::<String>(row, "alto")?, expected.alto)?;
        ensure_decimal_eq("profundo", &column::<String>(row, "profundo")?, expected.profundo)
    }

    /// Delete the child row, then its parent
    async fn delete_producto(&self, id_producto: &str) -> Result<(), HarnessError> {
        let dimensiones = sqlx::query("DELETE FROM dimensiones WHERE id_producto = ?")
            .bind(id_producto)
            .execute(&self.pool)
            .await
            .map_err(query_err("delete dimensiones"))?;

        let producto = sqlx::query("DELETE FROM productos WHERE id = ?")
            .bind(id_producto)
            .execute(&self.pool)
            .await
            .map_err(query_err("delete producto"))?;

        ensure_eq("dimensiones affected rows", dimensiones.rows_affected(), 1)?;
        ensure_eq("productos affected rows", producto.rows_affected(), 1)
    }

    async fn count(&self, sql: &str) -> Result<u64, HarnessError> {
        let row = sqlx::query(sql)
            .bind(self.tag.owned_id()?)
            .fetch_one(&self.pool)
            .await
            .map_err(query_err("count fixtures"))?;
        let count: i64 = column(&row, "n")?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl Suite for MySqlSuite {
    fn store(&self) -> Store {
        Store::Mysql
    }

    fn plan(&self) -> &'static [&'static str] {
        MYSQL_PLAN
    }

    async fn run_steps(&self, recorder: &mut StepRecorder) -> Result<(), HarnessError> {
        let producto = Producto::fixture(&self.tag);

        let id = recorder
            .step(MYSQL_PLAN[0], self.create_producto(&producto))
            .await?;
        recorder
            .step(MYSQL_PLAN[1], self.read_producto(&id, &producto))
            .await?;
        recorder
            .step(MYSQL_PLAN[2], self.update_precio(&id, Producto::UPDATED_PRICE))
            .await?;

        let dimensiones = Dimensiones::for_producto(&id);
        let id_producto = recorder
            .step(MYSQL_PLAN[3], self.create_dimensiones(&dimensiones))
            .await?;
        recorder
            .step(MYSQL_PLAN[4], self.read_dimensiones(&id_producto, &dimensiones))
            .await?;
        recorder
            .step(MYSQL_PLAN[5], self.delete_producto(&id_producto))
            .await
    }

    async fn teardown(&self) -> Result<(), HarnessError> {
        let id = self.tag.owned_id()?;
        sqlx::query("DELETE FROM dimensiones WHERE id_producto = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_err("cleanup dimensiones"))?;
        sqlx::query("DELETE FROM productos WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_err("cleanup productos"))?;
        Ok(())
    }

    async fn residue(&self) -> Result<u64, HarnessError> {
        let dimensiones = self
            .count("SELECT COUNT(*) AS n FROM dimensiones WHERE id_producto = ?")
            .await?;
        let productos = self
            .count("SELECT COUNT(*) AS n FROM productos WHERE id = ?")
            .await?;
        Ok(dimensiones + productos)
    }

    async fn ping(&self) -> Result<(), HarnessError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HarnessError::Connection(format!("MySQL health check failed: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), HarnessError> {
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::run_suite;

    #[test]
    fn test_plan_has_six_steps() {
        assert_eq!(MYSQL_PLAN.len(), 6);
        assert!(MYSQL_PLAN[5].starts_with("DELETE"));
    }

    #[tokio::test]
    #[ignore] // Requires a running MySQL instance on port 3307
    async fn test_mysql_suite() {
        let settings = proyecto_settings::settings();
        let suite = MySqlSuite::connect(&settings.mysql, FixtureTag::new())
            .await
            .unwrap();
        let report = run_suite(&suite).await;
        assert!(report.passed(), "{:#?}", report);
    }

    #[tokio::test]
    #[ignore] // Requires a running MySQL instance on port 3307
    async fn test_mysql_teardown_after_partial_run() {
        let settings = proyecto_settings::settings();
        let suite = MySqlSuite::connect(&settings.mysql, FixtureTag::new())
            .await
            .unwrap();
        let producto = Producto::fixture(&suite.tag);
        suite.create_producto(&producto).await.unwrap();
        suite
            .create_dimensiones(&Dimensiones::for_producto(&producto.id))
            .await
            .unwrap();
        assert_eq!(suite.residue().await.unwrap(), 2);

        suite.teardown().await.unwrap();
        assert_eq!(suite.residue().await.unwrap(), 0);
        suite.close().await.unwrap();
    }
}
