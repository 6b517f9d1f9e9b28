//! Persistence for saved resumes.
//!
//! `LocalStore` is the synchronous keyed store that is always present.
//! `ResumeStore` is the async seam for the remote database (`PgResumeStore`).
//! `WriteThroughStore` composes the two: local first, remote best-effort.

pub mod local;
pub mod remote;
pub mod validation;
pub mod write_through;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::record::SavedResumeRecord;

pub use local::LocalStore;
pub use validation::{validate_for_save, ValidationError};
pub use write_through::{RemoteSync, SaveReceipt, WriteThroughStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Local store lock poisoned")]
    Poisoned,
}

/// A remote backend for saved resumes. Network-failure-prone by assumption;
/// callers go through `WriteThroughStore`, which falls back to the local copy.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Inserts or replaces the record with the same id.
    async fn save(&self, record: &SavedResumeRecord) -> Result<Uuid, StoreError>;

    async fn load_by_id(&self, id: Uuid) -> Result<Option<SavedResumeRecord>, StoreError>;

    /// Records owned by `owner_id`, most recently updated first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedResumeRecord>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
