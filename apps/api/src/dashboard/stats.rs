use serde::Serialize;

use crate::models::record::{ResumeStatus, SavedResumeRecord};

/// Summary counters shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub drafts: usize,
    pub downloads: u64,
}

impl DashboardStats {
    pub fn from_records(records: &[SavedResumeRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.status {
                ResumeStatus::Completed => stats.completed += 1,
                ResumeStatus::Draft => stats.drafts += 1,
            }
            stats.downloads += u64::from(record.download_count);
            stats
        })
    }
}
