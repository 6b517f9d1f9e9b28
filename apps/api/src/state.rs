use std::sync::Arc;

use crate::editor::session::SessionRegistry;
use crate::export::ExportPipeline;
use crate::storage::WriteThroughStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<WriteThroughStore>,
    pub sessions: SessionRegistry,
    /// Rasterizer + sink. Swapped for in-memory doubles in tests.
    pub exporter: ExportPipeline,
}
