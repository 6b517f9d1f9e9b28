//! File-backed local keyed store.
//!
//! All records live in one JSON array on disk, mirrored in memory. Every
//! write rewrites the file through a temp file + rename, so a crash never
//! leaves a half-written store behind.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::record::SavedResumeRecord;
use crate::storage::StoreError;

pub struct LocalStore {
    path: PathBuf,
    records: RwLock<HashMap<Uuid, SavedResumeRecord>>,
}

impl LocalStore {
    /// Opens the store at `path`, creating parent directories. A missing
    /// file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        fs::create_dir_all(parent_dir(&path))?;

        let records = match fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => {
                let list: Vec<SavedResumeRecord> = serde_json::from_slice(&bytes)?;
                list.into_iter().map(|r| (r.id, r)).collect()
            }
            Ok(_) => HashMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Local store opened at {} with {} records",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn save(&self, record: &SavedResumeRecord) -> Result<Uuid, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let previous = records.insert(record.id, record.clone());
        if let Err(e) = self.flush(&records) {
            // Keep memory and disk in agreement.
            match previous {
                Some(previous) => records.insert(record.id, previous),
                None => records.remove(&record.id),
            };
            return Err(e);
        }
        debug!("Local store saved resume {}", record.id);
        Ok(record.id)
    }

    pub fn load_by_id(&self, id: Uuid) -> Result<Option<SavedResumeRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(&id).cloned())
    }

    /// Records owned by `owner_id`, most recently updated first.
    pub fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedResumeRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut owned: Vec<_> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let Some(removed) = records.remove(&id) else {
            return Ok(false);
        };
        if let Err(e) = self.flush(&records) {
            records.insert(id, removed);
            return Err(e);
        }
        debug!("Local store deleted resume {id}");
        Ok(true)
    }

    fn flush(&self, records: &HashMap<Uuid, SavedResumeRecord>) -> Result<(), StoreError> {
        let mut list: Vec<&SavedResumeRecord> = records.values().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let bytes = serde_json::to_vec_pretty(&list)?;

        let mut tmp = NamedTempFile::new_in(parent_dir(&self.path))?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::customization::Customization;
    use crate::models::record::ResumeStatus;
    use crate::models::resume::empty_document;

    pub(crate) fn record_for(owner: &str, name: &str) -> SavedResumeRecord {
        let mut data = empty_document();
        data.personal_info.name = name.to_string();
        data.personal_info.email = format!("{}@example.com", name.to_lowercase());
        let now = Utc::now();
        SavedResumeRecord {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            title: "Untitled Resume".to_string(),
            data,
            customization: Customization::default(),
            template_id: "1".to_string(),
            created_at: now,
            updated_at: now,
            download_count: 0,
            status: ResumeStatus::Draft,
        }
    }

    #[test]
    fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("resumes.json")).unwrap();
        let record = record_for("owner-1", "Ada");

        assert_eq!(store.save(&record).unwrap(), record.id);
        assert_eq!(store.load_by_id(record.id).unwrap(), Some(record.clone()));
        assert!(store.delete(record.id).unwrap());
        assert!(!store.delete(record.id).unwrap());
        assert_eq!(store.load_by_id(record.id).unwrap(), None);
    }

    #[test]
    fn test_save_is_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("resumes.json")).unwrap();
        let mut record = record_for("owner-1", "Ada");
        store.save(&record).unwrap();
        record.title = "Engineer".into();
        store.save(&record).unwrap();

        let listed = store.list_by_owner("owner-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Engineer");
    }

    #[test]
    fn test_list_by_owner_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("resumes.json")).unwrap();
        let older = record_for("owner-1", "Old");
        let mut newer = record_for("owner-1", "New");
        newer.updated_at = older.updated_at + Duration::seconds(10);
        let other = record_for("owner-2", "Else");
        for r in [&older, &newer, &other] {
            store.save(r).unwrap();
        }

        let listed = store.list_by_owner("owner-1").unwrap();
        let names: Vec<_> = listed.iter().map(|r| r.data.personal_info.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("resumes.json");
        let record = record_for("owner-1", "Ada");
        {
            let store = LocalStore::open(&path).unwrap();
            store.save(&record).unwrap();
        }
        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.load_by_id(record.id).unwrap(), Some(record));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumes.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            LocalStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }
}
