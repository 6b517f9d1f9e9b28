//! Local-first composition of the local store and an optional remote store.
//!
//! The local write is authoritative for "did the save succeed". A remote
//! write failure only downgrades the receipt to `Stale`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::record::SavedResumeRecord;
use crate::storage::{LocalStore, ResumeStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RemoteSync {
    Synced,
    LocalOnly,
    Stale { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub id: Uuid,
    pub remote: RemoteSync,
}

pub struct WriteThroughStore {
    local: LocalStore,
    remote: Option<Arc<dyn ResumeStore>>,
}

impl WriteThroughStore {
    pub fn new(local: LocalStore, remote: Option<Arc<dyn ResumeStore>>) -> Self {
        Self { local, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn save(&self, record: &SavedResumeRecord) -> Result<SaveReceipt, StoreError> {
        let id = self.local.save(record)?;

        let Some(remote) = &self.remote else {
            return Ok(SaveReceipt {
                id,
                remote: RemoteSync::LocalOnly,
            });
        };

        let remote = match remote.save(record).await {
            Ok(_) => RemoteSync::Synced,
            Err(e) => {
                warn!("Remote save failed for resume {id}, kept local copy: {e}");
                RemoteSync::Stale {
                    reason: e.to_string(),
                }
            }
        };
        Ok(SaveReceipt { id, remote })
    }

    /// The more recently updated of the local and remote copies. The local
    /// copy is only overwritten when the remote one is strictly newer, so a
    /// save that never reached the remote is not rolled back.
    pub async fn load_by_id(&self, id: Uuid) -> Result<Option<SavedResumeRecord>, StoreError> {
        let local = self.local.load_by_id(id)?;
        let Some(remote) = &self.remote else {
            return Ok(local);
        };

        let remote_record = match remote.load_by_id(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Remote load failed for resume {id}, using local copy: {e}");
                return Ok(local);
            }
        };

        match (local, remote_record) {
            (Some(local), Some(remote)) if remote.updated_at <= local.updated_at => Ok(Some(local)),
            (_, Some(remote)) => {
                self.refresh_local(&remote);
                Ok(Some(remote))
            }
            (local, None) => Ok(local),
        }
    }

    /// Union of remote and local records for the owner. When both sides hold
    /// a record, the more recently updated copy wins.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedResumeRecord>, StoreError> {
        let local = self.local.list_by_owner(owner_id)?;
        let Some(remote) = &self.remote else {
            return Ok(local);
        };

        let remote_records = match remote.list_by_owner(owner_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Remote list failed for owner {owner_id}, using local copies: {e}");
                return Ok(local);
            }
        };

        let mut merged: HashMap<Uuid, SavedResumeRecord> =
            local.into_iter().map(|r| (r.id, r)).collect();
        for record in remote_records {
            let newer = merged
                .get(&record.id)
                .map_or(true, |existing| record.updated_at > existing.updated_at);
            if newer {
                self.refresh_local(&record);
                merged.insert(record.id, record);
            }
        }

        let mut records: Vec<_> = merged.into_values().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Remote first. A remote failure is returned and the local copy stays.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let remote_deleted = match &self.remote {
            Some(remote) => remote.delete(id).await?,
            None => false,
        };
        let local_deleted = self.local.delete(id)?;
        if remote_deleted || local_deleted {
            info!("Deleted resume {id}");
        }
        Ok(remote_deleted || local_deleted)
    }

    /// Bumps the download counter of a saved record after an export.
    pub async fn record_download(&self, id: Uuid) -> Result<Option<SaveReceipt>, StoreError> {
        let Some(mut record) = self.load_by_id(id).await? else {
            return Ok(None);
        };
        record.download_count = record.download_count.saturating_add(1);
        self.save(&record).await.map(Some)
    }

    fn refresh_local(&self, record: &SavedResumeRecord) {
        if let Err(e) = self.local.save(record) {
            warn!("Failed to refresh local copy of resume {}: {e}", record.id);
        }
    }
}
