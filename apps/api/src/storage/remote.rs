//! Postgres-backed remote store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::models::customization::Customization;
use crate::models::record::{ResumeStatus, SavedResumeRecord};
use crate::models::resume::ResumeDocument;
use crate::storage::{ResumeStore, StoreError};

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    owner_id: String,
    title: String,
    data: Json<ResumeDocument>,
    customization: Json<Customization>,
    template_id: String,
    status: String,
    download_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for SavedResumeRecord {
    fn from(row: ResumeRow) -> Self {
        SavedResumeRecord {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            data: row.data.0,
            customization: row.customization.0,
            template_id: row.template_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            download_count: row.download_count.max(0) as u32,
            status: ResumeStatus::parse(&row.status),
        }
    }
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn save(&self, record: &SavedResumeRecord) -> Result<Uuid, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO resumes
                (id, owner_id, title, data, customization, template_id,
                 status, download_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                data = EXCLUDED.data,
                customization = EXCLUDED.customization,
                template_id = EXCLUDED.template_id,
                status = EXCLUDED.status,
                download_count = EXCLUDED.download_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.owner_id)
        .bind(&record.title)
        .bind(Json(&record.data))
        .bind(Json(&record.customization))
        .bind(&record.template_id)
        .bind(record.status.as_str())
        .bind(i32::try_from(record.download_count).unwrap_or(i32::MAX))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        debug!("Remote store saved resume {}", record.id);
        Ok(record.id)
    }

    async fn load_by_id(&self, id: Uuid) -> Result<Option<SavedResumeRecord>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedResumeRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
