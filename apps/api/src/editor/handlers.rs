use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::editor::session::{save_session, EditorSession, SessionHandle, SessionView};
use crate::errors::AppError;
use crate::models::customization::Customization;
use crate::models::resume::Section;
use crate::models::template::DEFAULT_TEMPLATE_ID;
use crate::render::html::render_surface;
use crate::render::text::plain_text;
use crate::render::{project, Projection};
use crate::state::AppState;
use crate::storage::SaveReceipt;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    pub owner_id: String,
    pub resume_id: Option<Uuid>,
    pub template_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ScalarFieldUpdate {
    /// `summary` or `personalInfo.<field>`.
    pub path: String,
    pub value: String,
}

#[derive(Deserialize)]
pub struct EntryFieldUpdate {
    pub field: String,
    pub value: Value,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub receipt: SaveReceipt,
    pub session: SessionView,
}

pub(crate) async fn session_handle(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Editor session {id} not found")))
}

fn parse_section(raw: &str) -> Result<Section, AppError> {
    raw.parse::<Section>()
        .map_err(|e| AppError::NotFound(e.to_string()))
}

/// POST /api/v1/editor/sessions
pub async fn handle_open_session(
    State(state): State<AppState>,
    Json(req): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    if req.owner_id.trim().is_empty() {
        return Err(AppError::Validation("ownerId is required".to_string()));
    }
    let limit = state.sessions.history_limit();

    let session = match req.resume_id {
        Some(resume_id) => {
            let record = state
                .store
                .load_by_id(resume_id)
                .await?
                .filter(|r| r.owner_id == req.owner_id)
                .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
            EditorSession::from_record(record, limit)
        }
        None => {
            let template_id = req.template_id.as_deref().unwrap_or(DEFAULT_TEMPLATE_ID);
            EditorSession::new(req.owner_id.clone(), template_id, limit)
        }
    };

    let handle = state.sessions.insert(session).await;
    let view = handle.lock().await.view();
    info!(
        "Opened editor session {} for owner {} (resume: {:?})",
        view.session_id, view.owner_id, view.resume_id
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/editor/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, id).await?;
    let view = handle.lock().await.view();
    Ok(Json(view))
}

/// DELETE /api/v1/editor/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Editor session {id} not found")))?;
    info!("Closed editor session {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/editor/sessions/:id/fields
pub async fn handle_set_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScalarFieldUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.set_scalar_field(&req.path, &req.value);
    Ok(Json(session.view()))
}

/// POST /api/v1/editor/sessions/:id/entries/:section
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, AppError> {
    let section = parse_section(&section)?;
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.add_entry(section);
    Ok(Json(session.view()))
}

/// PATCH /api/v1/editor/sessions/:id/entries/:section/:index
pub async fn handle_set_entry_field(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, String, usize)>,
    Json(req): Json<EntryFieldUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let section = parse_section(&section)?;
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.set_entry_field(section, index, &req.field, req.value);
    Ok(Json(session.view()))
}

/// DELETE /api/v1/editor/sessions/:id/entries/:section/:index
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, String, usize)>,
) -> Result<Json<SessionView>, AppError> {
    let section = parse_section(&section)?;
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.remove_entry(section, index);
    Ok(Json(session.view()))
}

/// POST /api/v1/editor/sessions/:id/undo
pub async fn handle_undo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.undo();
    Ok(Json(session.view()))
}

/// POST /api/v1/editor/sessions/:id/redo
pub async fn handle_redo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.redo();
    Ok(Json(session.view()))
}

/// PUT /api/v1/editor/sessions/:id/customization
pub async fn handle_set_customization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(customization): Json<Customization>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.set_customization(customization)?;
    Ok(Json(session.view()))
}

/// POST /api/v1/editor/sessions/:id/save
pub async fn handle_save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaveResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let receipt = save_session(&state.store, &handle).await?;
    let session = handle.lock().await.view();
    Ok(Json(SaveResponse { receipt, session }))
}

/// GET /api/v1/editor/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Projection>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(project(session.document(), session.customization())))
}

/// GET /api/v1/editor/sessions/:id/preview/html
pub async fn handle_preview_html(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let handle = session_handle(&state, id).await?;
    let projection = {
        let session = handle.lock().await;
        project(session.document(), session.customization())
    };
    Ok(Html(render_surface(&projection).html))
}

/// GET /api/v1/editor/sessions/:id/text
pub async fn handle_plain_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<String, AppError> {
    let handle = session_handle(&state, id).await?;
    let projection = {
        let session = handle.lock().await;
        project(session.document(), session.customization())
    };
    Ok(plain_text(&projection))
}
