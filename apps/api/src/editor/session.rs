//! Editing sessions: one open document per session, owned by the registry.
//!
//! Each session sits behind its own `tokio::sync::Mutex`, so operations on a
//! document apply in call order. Store writes happen outside that lock on a
//! snapshot of the record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editor::completion::{completion_percentage, completion_report, CompletionReport};
use crate::editor::history::History;
use crate::editor::mutations;
use crate::models::customization::{Customization, CustomizationError};
use crate::models::record::{record_title, ResumeStatus, SavedResumeRecord};
use crate::models::resume::{empty_document, ResumeDocument, Section};
use crate::models::template::template_or_default;
use crate::storage::{validate_for_save, SaveReceipt, StoreError, ValidationError, WriteThroughStore};

pub type SessionHandle = Arc<Mutex<EditorSession>>;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ────────────────────────────────────────────────────────────────────────────
// EditorSession
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EditorSession {
    id: Uuid,
    owner_id: String,
    record_id: Option<Uuid>,
    template_id: String,
    customization: Customization,
    history: History,
    /// Bumped by every change that would alter the persisted record.
    revision: u64,
    saved_revision: u64,
    last_saved_at: Option<DateTime<Utc>>,
    exporting: bool,
    created_at: Option<DateTime<Utc>>,
    download_count: u32,
    /// Held across a whole save so writes of one session land in revision order.
    save_gate: Arc<Mutex<()>>,
}

/// What the client sees after every editing call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub owner_id: String,
    pub resume_id: Option<Uuid>,
    pub template_id: String,
    pub document: ResumeDocument,
    pub customization: Customization,
    pub completion: CompletionReport,
    pub can_undo: bool,
    pub can_redo: bool,
    pub revision: u64,
    pub dirty: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub exporting: bool,
}

impl EditorSession {
    /// A blank document styled after `template_id`. Unknown ids get the
    /// default template.
    pub fn new(owner_id: impl Into<String>, template_id: &str, history_limit: Option<usize>) -> Self {
        let template = template_or_default(template_id);
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            record_id: None,
            template_id: template.id.to_string(),
            customization: Customization::for_template(template.id),
            history: History::new(empty_document(), history_limit),
            revision: 0,
            saved_revision: 0,
            last_saved_at: None,
            exporting: false,
            created_at: None,
            download_count: 0,
            save_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Resumes editing a saved record. History starts at the loaded document.
    pub fn from_record(record: SavedResumeRecord, history_limit: Option<usize>) -> Self {
        let mut session = Self::new(record.owner_id.clone(), &record.template_id, history_limit);
        session.load_record(record);
        session
    }

    /// Replaces the session's content with a saved record and clears
    /// undo/redo.
    pub fn load_record(&mut self, record: SavedResumeRecord) {
        let mut data = record.data;
        let replaced = data.ensure_unique_ids();
        if replaced > 0 {
            warn!("Replaced {replaced} duplicate entry ids in resume {}", record.id);
        }
        self.history.reset(data);
        self.owner_id = record.owner_id;
        self.record_id = Some(record.id);
        self.customization = match record.customization.validate() {
            Ok(()) => record.customization,
            Err(e) => {
                warn!("Resume {} has an unusable customization ({e}), using template style", record.id);
                Customization::for_template(&record.template_id)
            }
        };
        self.template_id = record.template_id;
        self.saved_revision = self.revision;
        self.last_saved_at = Some(record.updated_at);
        self.created_at = Some(record.created_at);
        self.download_count = record.download_count;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record_id(&self) -> Option<Uuid> {
        self.record_id
    }

    pub fn document(&self) -> &ResumeDocument {
        self.history.current()
    }

    pub fn customization(&self) -> &Customization {
        &self.customization
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            owner_id: self.owner_id.clone(),
            resume_id: self.record_id,
            template_id: self.template_id.clone(),
            document: self.document().clone(),
            customization: self.customization.clone(),
            completion: completion_report(self.document()),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            revision: self.revision,
            dirty: self.is_dirty(),
            last_saved_at: self.last_saved_at,
            exporting: self.exporting,
        }
    }

    // ── Editing ────────────────────────────────────────────────────────────

    pub fn set_scalar_field(&mut self, path: &str, value: &str) {
        self.mutate(|history, doc| mutations::set_scalar_field(history, doc, path, value));
    }

    pub fn set_entry_field(&mut self, section: Section, index: usize, field: &str, value: Value) {
        self.mutate(|history, doc| {
            mutations::set_entry_field(history, doc, section, index, field, value)
        });
    }

    pub fn add_entry(&mut self, section: Section) {
        self.mutate(|history, doc| mutations::add_entry(history, doc, section));
    }

    pub fn remove_entry(&mut self, section: Section, index: usize) {
        self.mutate(|history, doc| mutations::remove_entry(history, doc, section, index));
    }

    /// Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo().is_some();
        if moved {
            self.revision += 1;
        }
        moved
    }

    /// Returns false when there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo().is_some();
        if moved {
            self.revision += 1;
        }
        moved
    }

    /// Customization is persisted with the record but not tracked by history.
    pub fn set_customization(&mut self, customization: Customization) -> Result<(), CustomizationError> {
        customization.validate()?;
        if self.customization != customization {
            self.customization = customization;
            self.revision += 1;
        }
        Ok(())
    }

    fn mutate(&mut self, op: impl FnOnce(&mut History, &ResumeDocument) -> ResumeDocument) {
        let current = self.history.snapshot();
        let next = op(&mut self.history, &current);
        if next != *current {
            self.revision += 1;
        }
    }

    // ── Saving ─────────────────────────────────────────────────────────────

    /// Builds the record to persist. The first call on a new session fixes
    /// the record id and creation time.
    fn prepare_record(&mut self, now: DateTime<Utc>) -> SavedResumeRecord {
        let id = *self.record_id.get_or_insert_with(Uuid::new_v4);
        let created_at = *self.created_at.get_or_insert(now);
        let data = self.document().clone();
        let status = if completion_percentage(&data) == 100 {
            ResumeStatus::Completed
        } else {
            ResumeStatus::Draft
        };
        SavedResumeRecord {
            id,
            owner_id: self.owner_id.clone(),
            title: record_title(&data),
            customization: self.customization.clone(),
            template_id: self.template_id.clone(),
            created_at,
            updated_at: now,
            download_count: self.download_count,
            status,
            data,
        }
    }

    fn mark_saved(&mut self, revision: u64, at: DateTime<Utc>) {
        // Edits made while the write was in flight keep the session dirty.
        self.saved_revision = self.saved_revision.max(revision);
        self.last_saved_at = Some(at);
    }

    // ── Exporting ──────────────────────────────────────────────────────────

    /// Claims the export slot. False when an export is already running.
    pub fn begin_export(&mut self) -> bool {
        if self.exporting {
            return false;
        }
        self.exporting = true;
        true
    }

    /// Releases the export slot; `succeeded` counts a download.
    pub fn finish_export(&mut self, succeeded: bool) {
        self.exporting = false;
        if succeeded {
            self.download_count = self.download_count.saturating_add(1);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Save operations
// ────────────────────────────────────────────────────────────────────────────

/// Explicit save: validates, then writes through outside the session lock.
/// Saves of the same session run one at a time, each snapshotting the
/// document only once the previous write has landed.
pub async fn save_session(
    store: &WriteThroughStore,
    handle: &SessionHandle,
) -> Result<SaveReceipt, SaveError> {
    let gate = Arc::clone(&handle.lock().await.save_gate);
    let _saving = gate.lock().await;

    let (record, revision) = {
        let mut session = handle.lock().await;
        validate_for_save(session.document())?;
        let revision = session.revision;
        (session.prepare_record(Utc::now()), revision)
    };

    let receipt = store.save(&record).await?;
    handle.lock().await.mark_saved(revision, record.updated_at);
    info!("Saved resume {} (revision {revision})", record.id);
    Ok(receipt)
}

/// Auto-save variant: skips clean sessions and documents that would fail
/// validation. Returns `None` when nothing was written.
pub async fn save_if_dirty(
    store: &WriteThroughStore,
    handle: &SessionHandle,
) -> Result<Option<SaveReceipt>, StoreError> {
    {
        let session = handle.lock().await;
        if !session.is_dirty() {
            return Ok(None);
        }
        if let Err(e) = validate_for_save(session.document()) {
            debug!("Auto-save skipped for session {}: {e}", session.id);
            return Ok(None);
        }
    }
    match save_session(store, handle).await {
        Ok(receipt) => Ok(Some(receipt)),
        // The document changed between the check and the save.
        Err(SaveError::Validation(_)) => Ok(None),
        Err(SaveError::Store(e)) => Err(e),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SessionRegistry
// ────────────────────────────────────────────────────────────────────────────

/// Single owner of all open sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    history_limit: Option<usize>,
}

impl SessionRegistry {
    pub fn new(history_limit: Option<usize>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            history_limit,
        }
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }

    pub async fn insert(&self, session: EditorSession) -> SessionHandle {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&handle));
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn handles(&self) -> Vec<SessionHandle> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Saves every dirty session once. Returns how many were written.
pub async fn autosave_pass(registry: &SessionRegistry, store: &WriteThroughStore) -> usize {
    let mut saved = 0;
    for handle in registry.handles().await {
        match save_if_dirty(store, &handle).await {
            Ok(Some(_)) => saved += 1,
            Ok(None) => {}
            Err(e) => warn!("Auto-save failed: {e}"),
        }
    }
    saved
}

/// Background auto-save loop. Failures are logged and never surfaced.
pub fn spawn_autosave(
    registry: SessionRegistry,
    store: Arc<WriteThroughStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let saved = autosave_pass(&registry, &store).await;
            if saved > 0 {
                info!("Auto-saved {saved} session(s)");
            }
        }
    })
}
