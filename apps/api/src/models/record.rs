use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::customization::Customization;
use crate::models::resume::ResumeDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    Draft,
    Completed,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Draft => "draft",
            ResumeStatus::Completed => "completed",
        }
    }

    /// Unknown values read back from storage are treated as drafts.
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => ResumeStatus::Completed,
            _ => ResumeStatus::Draft,
        }
    }
}

/// A resume as it is persisted: document content plus metadata, owned by
/// exactly one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResumeRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub data: ResumeDocument,
    pub customization: Customization,
    pub template_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub download_count: u32,
    pub status: ResumeStatus,
}

pub const UNTITLED_RESUME: &str = "Untitled Resume";

/// Record title derived from the document's professional title.
pub fn record_title(doc: &ResumeDocument) -> String {
    let title = doc.personal_info.title.trim();
    if title.is_empty() {
        UNTITLED_RESUME.to_string()
    } else {
        title.to_string()
    }
}

/// Title given to a record created by importing an extracted document.
pub fn imported_title(doc: &ResumeDocument) -> String {
    let name = doc.personal_info.name.trim();
    if name.is_empty() {
        "Imported Resume".to_string()
    } else {
        format!("{name} Resume")
    }
}
