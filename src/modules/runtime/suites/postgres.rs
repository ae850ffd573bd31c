//! PostgreSQL suite: `materiales` and `caracteristicas_materiales`

use async_trait::async_trait;
use proyecto_core::check::{ensure_decimal_eq, ensure_eq};
use proyecto_core::{Caracteristicas, FixtureTag, HarnessError, Material, PostgresSettings};
use proyecto_types::Store;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

use super::recorder::StepRecorder;
use super::traits::Suite;

/// Step names, in order
pub const POSTGRES_PLAN: &[&str] = &[
    "CREATE material",
    "READ material",
    "UPDATE material",
    "CREATE caracteristicas",
    "READ caracteristicas",
    "DELETE caracteristicas y material",
];

fn query_err(op: &'static str) -> impl FnOnce(sqlx::Error) -> HarnessError {
    move |e| HarnessError::Database(format!("PostgreSQL {} failed: {}", op, e))
}

fn column<T>(row: &PgRow, name: &str) -> Result<T, HarnessError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| HarnessError::Database(format!("PostgreSQL column '{}': {}", name, e)))
}

/// Suite over a PostgreSQL pool
pub struct PostgresSuite {
    pool: PgPool,
    tag: FixtureTag,
}

impl PostgresSuite {
    /// Open the pool; failure is fatal to the suite
    pub async fn connect(
        settings: &PostgresSettings,
        tag: FixtureTag,
    ) -> Result<Self, HarnessError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.pool.max_connections())
            .min_connections(settings.pool.min_connections())
            .acquire_timeout(settings.pool.acquire_timeout())
            .idle_timeout(settings.pool.idle_timeout())
            .connect(&settings.url())
            .await
            .map_err(|e| {
                HarnessError::Connection(format!("PostgreSQL connection failed: {}", e))
            })?;

        debug!(host = %settings.host, port = settings.port, "PostgreSQL pool ready");
        Ok(Self { pool, tag })
    }

    /// Insert the material and hand back the id the database returned
    async fn create_material(&self, material: &Material) -> Result<String, HarnessError> {
        let rows = sqlx::query(
            "INSERT INTO materiales \
             (id, nombre, tipo, fabricante, disponible, stock, precio_por_unidad) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&material.id)
        .bind(&material.nombre)
        .bind(&material.tipo)
        .bind(&material.fabricante)
        .bind(material.disponible)
        .bind(material.stock)
        .bind(material.precio_por_unidad)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("insert material"))?;

        ensure_eq("rows created", rows.len(), 1)?;
        let id: String = column(&rows[0], "id")?;
        ensure_eq("returned id", id.as_str(), material.id.as_str())?;
        Ok(id)
    }

    async fn read_material(&self, id: &str, expected: &Material) -> Result<(), HarnessError> {
        let rows = sqlx::query(
            "SELECT nombre, tipo, fabricante, disponible, \
             precio_por_unidad::text AS precio_por_unidad \
             FROM materiales WHERE id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("select material"))?;

        ensure_eq("rows", rows.len(), 1)?;
        let row = &rows[0];
        ensure_eq("nombre", column::<String>(row, "nombre")?, expected.nombre.clone())?;
        ensure_eq("tipo", column::<String>(row, "tipo")?, expected.tipo.clone())?;
        ensure_eq(
            "fabricante",
            column::<String>(row, "fabricante")?,
            expected.fabricante.clone(),
        )?;
        ensure_eq("disponible", column::<bool>(row, "disponible")?, expected.disponible)?;
        ensure_decimal_eq(
            "precio_por_unidad",
            &column::<String>(row, "precio_por_unidad")?,
            expected.precio_por_unidad,
        )
    }

    async fn update_precio(&self, id: &str, precio: f64) -> Result<(), HarnessError> {
        let result = sqlx::query("UPDATE materiales SET precio_por_unidad = $1 WHERE id = $2")
            .bind(precio)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_err("update material"))?;
        ensure_eq("row count", result.rows_affected(), 1)?;

        let row = sqlx::query(
            "SELECT precio_por_unidad::text AS precio_por_unidad FROM materiales WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(query_err("select precio_por_unidad"))?;
        ensure_decimal_eq(
            "precio_por_unidad",
            &column::<String>(&row, "precio_por_unidad")?,
            precio,
        )
    }

    async fn create_caracteristicas(
        &self,
        caracteristicas: &Caracteristicas,
    ) -> Result<String, HarnessError> {
        let result = sqlx::query(
            "INSERT INTO caracteristicas_materiales \
             (id_material, color, temperatura_impresion, temperatura_plataforma, \
              resistencia_tensil, dureza, diametro_filamento, densidad, \
              viscosidad, tiempo_cura, tolerancia) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&caracteristicas.id_material)
        .bind(&caracteristicas.color)
        .bind(caracteristicas.temperatura_impresion)
        .bind(caracteristicas.temperatura_plataforma)
        .bind(caracteristicas.resistencia_tensil)
        .bind(caracteristicas.dureza)
        .bind(caracteristicas.diametro_filamento)
        .bind(caracteristicas.densidad)
        .bind(caracteristicas.viscosidad)
        .bind(caracteristicas.tiempo_cura)
        .bind(caracteristicas.tolerancia)
        .execute(&self.pool)
        .await
        .map_err(query_err("insert caracteristicas"))?;

        ensure_eq("row count", result.rows_affected(), 1)?;
        Ok(caracteristicas.id_material.clone())
    }

    async fn read_caracteristicas(
        &self,
        id_material: &str,
        expected: &Caracteristicas,
    ) -> Result<(), HarnessError> {
        let rows = sqlx::query(
            "SELECT color, \
             temperatura_impresion::int4 AS temperatura_impresion, \
             temperatura_plataforma::int4 AS temperatura_plataforma, \
             tiempo_cura::int4 AS tiempo_cura, \
             diametro_filamento::text AS diametro_filamento, \
             densidad::text AS densidad, \
             tolerancia::text AS tolerancia \
             FROM caracteristicas_materiales WHERE id_material = $1",
        )
        .bind(id_material)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("select caracteristicas"))?;

        ensure_eq("rows", rows.len(), 1)?;
        let row = &rows[0];
        ensure_eq("color", column::<String>(row, "color")?, expected.color.clone())?;
        ensure_eq(
            "temperatura_impresion",
            column::<i32>(row, "temperatura_impresion")?,
            expected.temperatura_impresion,
        )?;
        ensure_eq(
            "temperatura_plataforma",
            column::<i32>(row, "temperatura_plataforma")?,
            expected.temperatura_plataforma,
        )?;
        ensure_eq("tiempo_cura", column::<i32>(row, "tiempo_cura")?, expected.tiempo_cura)?;
        ensure_decimal_eq(
            "diametro_filamento",
            &column::<String>(row, "diametro_filamento")?,
            expected.diametro_filamento,
        )?;
        ensure_decimal_eq("densidad", &column::<String>(row, "densidad")?, expected.densidad)?;
        ensure_decimal_eq(
            "tolerancia",
            &column::<String>(row, "tolerancia")?,
            expected.tolerancia,
        )
    }

    /// Delete the child row, then its parent
    async fn delete_material(&self, id_material: &str) -> Result<(), HarnessError> {
        let caracteristicas =
            sqlx::query("DELETE FROM caracteristicas_materiales WHERE id_material = $1")
                .bind(id_material)
                .execute(&self.pool)
                .await
                .map_err(query_err("delete caracteristicas"))?;

        let material = sqlx::query("DELETE FROM materiales WHERE id = $1")
            .bind(id_material)
            .execute(&self.pool)
            .await
            .map_err(query_err("delete material"))?;

        ensure_eq("caracteristicas row count", caracteristicas.rows_affected(), 1)?;
        ensure_eq("materiales row count", material.rows_affected(), 1)
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
impl Suite for PostgresSuite {
    fn store(&self) -> Store {
        Store::Postgres
    }

    fn plan(&self) -> &'static [&'static str] {
        POSTGRES_PLAN
    }

    async fn run_steps(&self, recorder: &mut StepRecorder) -> Result<(), HarnessError> {
        let material = Material::fixture(&self.tag);

        let id = recorder
            .step(POSTGRES_PLAN[0], self.create_material(&material))
            .await?;
        recorder
            .step(POSTGRES_PLAN[1], self.read_material(&id, &material))
            .await?;
        recorder
            .step(POSTGRES_PLAN[2], self.update_precio(&id, Material::UPDATED_PRICE))
            .await?;

        let caracteristicas = Caracteristicas::for_material(&id);
        let id_material = recorder
            .step(POSTGRES_PLAN[3], self.create_caracteristicas(&caracteristicas))
            .await?;
        recorder
            .step(
                POSTGRES_PLAN[4],
                self.read_caracteristicas(&id_material, &caracteristicas),
            )
            .await?;
        recorder
            .step(POSTGRES_PLAN[5], self.delete_material(&id_material))
            .await
    }

    async fn teardown(&self) -> Result<(), HarnessError> {
        let id = self.tag.owned_id()?;
        sqlx::query("DELETE FROM caracteristicas_materiales WHERE id_material = $1")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_err("cleanup caracteristicas"))?;
        sqlx::query("DELETE FROM materiales WHERE id = $1")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_err("cleanup materiales"))?;
        Ok(())
    }

    async fn residue(&self) -> Result<u64, HarnessError> {
        let caracteristicas = self
            .count("SELECT COUNT(*) AS n FROM caracteristicas_materiales WHERE id_material = $1")
            .await?;
        let materiales = self
            .count("SELECT COUNT(*) AS n FROM materiales WHERE id = $1")
            .await?;
        Ok(caracteristicas + materiales)
    }

    async fn ping(&self) -> Result<(), HarnessError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                HarnessError::Connection(format!("PostgreSQL health check failed: {}", e))
            })?;
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
    fn test_plan_deletes_children_last_step() {
        assert_eq!(POSTGRES_PLAN.len(), 6);
        assert_eq!(POSTGRES_PLAN[5], "DELETE caracteristicas y material");
    }

    #[tokio::test]
    #[ignore] // Requires a running PostgreSQL instance on port 55432
    async fn test_postgres_suite() {
        let settings = proyecto_settings::settings();
        let suite = PostgresSuite::connect(&settings.postgres, FixtureTag::new())
            .await
            .unwrap();
        let report = run_suite(&suite).await;
        assert!(report.passed(), "{:#?}", report);
    }

    #[tokio::test]
    #[ignore] // Requires a running PostgreSQL instance on port 55432
    async fn test_postgres_teardown_after_partial_run() {
        let settings = proyecto_settings::settings();
        let suite = PostgresSuite::connect(&settings.postgres, FixtureTag::new())
            .await
            .unwrap();
        let material = Material::fixture(&suite.tag);
        let id = suite.create_material(&material).await.unwrap();
        suite
            .create_caracteristicas(&Caracteristicas::for_material(&id))
            .await
            .unwrap();
        assert_eq!(suite.residue().await.unwrap(), 2);

        suite.teardown().await.unwrap();
        assert_eq!(suite.residue().await.unwrap(), 0);
        suite.close().await.unwrap();
    }
}
