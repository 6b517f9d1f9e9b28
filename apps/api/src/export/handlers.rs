use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::editor::handlers::session_handle;
use crate::editor::session::SessionHandle;
use crate::errors::AppError;
use crate::export::ExportOutcome;
use crate::render::project;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    #[serde(flatten)]
    pub outcome: ExportOutcome,
    pub resume_id: Option<Uuid>,
}

/// A claimed export slot. Dropped without `finish` (the request was
/// cancelled mid-export), it releases the slot as a failed export.
struct ExportSlot {
    handle: Option<SessionHandle>,
}

impl ExportSlot {
    async fn finish(mut self, succeeded: bool) {
        let Some(handle) = self.handle.clone() else {
            return;
        };
        handle.lock().await.finish_export(succeeded);
        self.handle = None;
    }
}

impl Drop for ExportSlot {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    handle.lock().await.finish_export(false);
                });
            }
            Err(_) => warn!("Export slot dropped outside the runtime; it stays claimed"),
        }
    }
}

/// POST /api/v1/editor/sessions/:id/export
///
/// One export per session at a time; a second request while one is running
/// gets 409. The pipeline runs outside the session lock.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportResponse>, AppError> {
    let handle = session_handle(&state, id).await?;

    let (slot, projection, name, resume_id) = {
        let mut session = handle.lock().await;
        if !session.begin_export() {
            return Err(AppError::Conflict(
                "An export is already running for this resume".to_string(),
            ));
        }
        let slot = ExportSlot {
            handle: Some(Arc::clone(&handle)),
        };
        (
            slot,
            project(session.document(), session.customization()),
            session.document().personal_info.name.clone(),
            session.record_id(),
        )
    };

    let result = state
        .exporter
        .export(&projection, &name, Utc::now().date_naive())
        .await;
    slot.finish(result.is_ok()).await;
    let outcome = result?;

    if let Some(resume_id) = resume_id {
        if let Err(e) = state.store.record_download(resume_id).await {
            warn!("Failed to record download for resume {resume_id}: {e}");
        }
    }

    Ok(Json(ExportResponse { outcome, resume_id }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::editor::session::{EditorSession, SessionRegistry};
    use crate::export::tests::MemorySink;
    use crate::export::{ExportError, ExportPipeline, PageSize, RasterImage, Rasterizer};
    use crate::render::RenderSurface;
    use crate::storage::{LocalStore, WriteThroughStore};

    /// Rasterizer that never answers.
    struct StalledRasterizer;

    #[async_trait]
    impl Rasterizer for StalledRasterizer {
        async fn render(&self, _surface: &RenderSurface) -> Result<RasterImage, ExportError> {
            std::future::pending().await
        }

        async fn build_document(&self, _images: &[RasterImage], _page: PageSize) -> Result<Bytes, ExportError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_export_releases_slot() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path().join("resumes.json")).unwrap();
        let state = AppState {
            store: Arc::new(WriteThroughStore::new(local, None)),
            sessions: SessionRegistry::new(None),
            exporter: ExportPipeline::new(Arc::new(StalledRasterizer), Arc::new(MemorySink::default())),
        };
        let handle = state.sessions.insert(EditorSession::new("owner-1", "1", None)).await;
        let id = handle.lock().await.id();

        let request = handle_export(State(state.clone()), Path(id));
        assert!(tokio::time::timeout(Duration::from_millis(50), request).await.is_err());

        // The release runs on a spawned task.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut session = handle.lock().await;
        assert!(!session.view().exporting);
        assert!(session.begin_export());
    }
}
