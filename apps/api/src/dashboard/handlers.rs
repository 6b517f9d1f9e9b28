use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::dashboard::stats::DashboardStats;
use crate::errors::AppError;
use crate::models::customization::Customization;
use crate::models::record::{imported_title, ResumeStatus, SavedResumeRecord};
use crate::models::resume::ResumeDocument;
use crate::models::template::{catalog, Template, DEFAULT_TEMPLATE_ID};
use crate::state::AppState;
use crate::storage::SaveReceipt;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub owner_id: String,
}

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<SavedResumeRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub owner_id: String,
    /// Structured content extracted by the client-side importer.
    pub document: ResumeDocument,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub receipt: SaveReceipt,
    pub resume: SavedResumeRecord,
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<&'static [Template]> {
    Json(catalog())
}

/// GET /api/v1/resumes?ownerId=
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.store.list_by_owner(&params.owner_id).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/v1/resumes/stats?ownerId=
pub async fn handle_stats(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    let resumes = state.store.list_by_owner(&params.owner_id).await?;
    Ok(Json(DashboardStats::from_records(&resumes)))
}

/// POST /api/v1/resumes/import
pub async fn handle_import(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    if req.owner_id.trim().is_empty() {
        return Err(AppError::Validation("ownerId is required".to_string()));
    }

    let mut data = req.document;
    data.ensure_unique_ids();
    let now = Utc::now();
    let resume = SavedResumeRecord {
        id: Uuid::new_v4(),
        owner_id: req.owner_id,
        title: imported_title(&data),
        data,
        customization: Customization::for_template(DEFAULT_TEMPLATE_ID),
        template_id: DEFAULT_TEMPLATE_ID.to_string(),
        created_at: now,
        updated_at: now,
        download_count: 0,
        status: ResumeStatus::Draft,
    };

    let receipt = state.store.save(&resume).await?;
    info!("Imported resume {} for owner {}", resume.id, resume.owner_id);
    Ok((StatusCode::CREATED, Json(ImportResponse { receipt, resume })))
}

/// Loads a record for its owner. Records of other owners read as missing.
async fn owned_record(state: &AppState, id: Uuid, owner_id: &str) -> Result<SavedResumeRecord, AppError> {
    state
        .store
        .load_by_id(id)
        .await?
        .filter(|r| r.owner_id == owner_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// GET /api/v1/resumes/:id?ownerId=
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<SavedResumeRecord>, AppError> {
    owned_record(&state, id, &params.owner_id).await.map(Json)
}

/// DELETE /api/v1/resumes/:id?ownerId=
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    owned_record(&state, id, &params.owner_id).await?;
    if state.store.delete(id).await? {
        info!("Owner {} deleted resume {id}", params.owner_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}
