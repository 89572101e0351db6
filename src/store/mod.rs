pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Case, NewNote, Note, Pet, PetFields, PetPatch, Test, Treatment};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from a document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Document {id} vanished from {collection}")]
    Missing { collection: &'static str, id: Uuid },

    #[error("Malformed document in {collection}: {source}")]
    Document {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store holding pets and their related documents.
///
/// Lookups return `Ok(None)` when a document does not exist. The batch
/// `find_*` methods expand references: results follow the order of `ids`
/// (duplicates included) and skip ids with no document behind them.
#[async_trait]
pub trait PetStore: Send + Sync {
    async fn list_pets(&self) -> StoreResult<Vec<Pet>>;

    async fn find_pet(&self, id: Uuid) -> StoreResult<Option<Pet>>;

    async fn create_pet(&self, fields: PetFields) -> StoreResult<Pet>;

    /// Partial update. Relations in `patch` are ignored.
    async fn update_pet(&self, id: Uuid, patch: &PetPatch) -> StoreResult<Option<Pet>>;

    async fn delete_pet(&self, id: Uuid) -> StoreResult<Option<Pet>>;

    /// Overwrite the whole pet document, relations included
    async fn save_pet(&self, pet: &Pet) -> StoreResult<()>;

    async fn create_note(&self, note: NewNote) -> StoreResult<Note>;

    async fn delete_note(&self, id: Uuid) -> StoreResult<()>;

    async fn find_notes(&self, ids: &[Uuid]) -> StoreResult<Vec<Note>>;

    async fn find_cases(&self, ids: &[Uuid]) -> StoreResult<Vec<Case>>;

    async fn find_tests(&self, ids: &[Uuid]) -> StoreResult<Vec<Test>>;

    async fn find_treatments(&self, ids: &[Uuid]) -> StoreResult<Vec<Treatment>>;

    async fn health_check(&self) -> StoreResult<()>;
}
