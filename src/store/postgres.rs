use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{PetStore, StoreError, StoreResult};
use crate::config::DatabaseConfig;
use crate::model::{Case, Identified, NewNote, Note, Pet, PetFields, PetPatch, Test, Treatment};

const PETS: &str = "pets";
const NOTES: &str = "notes";
const CASES: &str = "cases";
const TESTS: &str = "tests";
const TREATMENTS: &str = "treatments";

const COLLECTIONS: [&str; 5] = [PETS, NOTES, CASES, TESTS, TREATMENTS];

/// PostgreSQL-backed document store: one JSONB table per collection
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using `DATABASE_URL` from config and create missing tables
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let parsed = url::Url::parse(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool for: {}{}",
            parsed.host_str().unwrap_or("localhost"),
            parsed.path()
        );

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        for collection in COLLECTIONS {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )",
                collection
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        debug!("Document tables ready: {:?}", COLLECTIONS);
        Ok(())
    }

    async fn insert<T: Serialize + Identified + Sync>(&self, collection: &'static str, doc: &T) -> StoreResult<()> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection);
        sqlx::query(&sql)
            .bind(doc.id())
            .bind(Json(doc))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetch documents by id, returned in the order of `ids`
    async fn find_by_ids<T: DeserializeOwned>(&self, collection: &'static str, ids: &[Uuid]) -> StoreResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!("SELECT id, doc FROM {} WHERE id = ANY($1)", collection);
        let rows = sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            let doc: Value = row.try_get("doc")?;
            by_id.insert(id, doc);
        }

        ids.iter()
            .filter_map(|id| by_id.get(id))
            .map(|doc| decode(collection, doc.clone()))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(collection: &'static str, doc: Value) -> StoreResult<T> {
    serde_json::from_value(doc).map_err(|source| StoreError::Document { collection, source })
}

fn decode_row<T: DeserializeOwned>(collection: &'static str, row: Option<sqlx::postgres::PgRow>) -> StoreResult<Option<T>> {
    match row {
        Some(row) => {
            let doc: Value = row.try_get("doc")?;
            decode(collection, doc).map(Some)
        }
        None => Ok(None),
    }
}

#[async_trait]
impl PetStore for PgStore {
    async fn list_pets(&self) -> StoreResult<Vec<Pet>> {
        let rows = sqlx::query("SELECT doc FROM pets ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let doc: Value = row.try_get("doc")?;
                decode(PETS, doc)
            })
            .collect()
    }

    async fn find_pet(&self, id: Uuid) -> StoreResult<Option<Pet>> {
        let row = sqlx::query("SELECT doc FROM pets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        decode_row(PETS, row)
    }

    async fn create_pet(&self, fields: PetFields) -> StoreResult<Pet> {
        let pet = Pet::new(Uuid::new_v4(), fields);
        self.insert(PETS, &pet).await?;
        Ok(pet)
    }

    async fn update_pet(&self, id: Uuid, patch: &PetPatch) -> StoreResult<Option<Pet>> {
        let cleared: Vec<String> = patch.cleared_fields().into_iter().map(String::from).collect();

        // Merge set keys, then drop cleared ones, in one statement
        let row = sqlx::query("UPDATE pets SET doc = (doc || $2) - $3::text[] WHERE id = $1 RETURNING doc")
            .bind(id)
            .bind(Json(Value::Object(patch.set_fields())))
            .bind(cleared)
            .fetch_optional(&self.pool)
            .await?;
        decode_row(PETS, row)
    }

    async fn delete_pet(&self, id: Uuid) -> StoreResult<Option<Pet>> {
        let row = sqlx::query("DELETE FROM pets WHERE id = $1 RETURNING doc")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        decode_row(PETS, row)
    }

    async fn save_pet(&self, pet: &Pet) -> StoreResult<()> {
        let result = sqlx::query("UPDATE pets SET doc = $2 WHERE id = $1")
            .bind(pet.id)
            .bind(Json(pet))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing { collection: PETS, id: pet.id });
        }
        Ok(())
    }

    async fn create_note(&self, note: NewNote) -> StoreResult<Note> {
        let note = note.into_note(Uuid::new_v4());
        self.insert(NOTES, &note).await?;
        Ok(note)
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_notes(&self, ids: &[Uuid]) -> StoreResult<Vec<Note>> {
        self.find_by_ids(NOTES, ids).await
    }

    async fn find_cases(&self, ids: &[Uuid]) -> StoreResult<Vec<Case>> {
        self.find_by_ids(CASES, ids).await
    }

    async fn find_tests(&self, ids: &[Uuid]) -> StoreResult<Vec<Test>> {
        self.find_by_ids(TESTS, ids).await
    }

    async fn find_treatments(&self, ids: &[Uuid]) -> StoreResult<Vec<Treatment>> {
        self.find_by_ids(TREATMENTS, ids).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_requires_database_url() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
        };
        assert!(matches!(
            PgStore::connect(&config).await,
            Err(StoreError::ConfigMissing("DATABASE_URL"))
        ));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let config = DatabaseConfig {
            url: Some("not a url".to_string()),
            max_connections: 1,
            connection_timeout: 1,
        };
        assert!(matches!(
            PgStore::connect(&config).await,
            Err(StoreError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn decode_reports_collection() {
        let err = decode::<Pet>(PETS, serde_json::json!({"name": "no id"})).unwrap_err();
        assert!(err.to_string().starts_with("Malformed document in pets"));
    }
}
