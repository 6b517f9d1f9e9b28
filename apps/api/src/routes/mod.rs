pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::dashboard::handlers as dashboard;
use crate::editor::handlers as editor;
use crate::export::handlers as export;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(dashboard::handle_list_templates))
        // Editor sessions
        .route("/api/v1/editor/sessions", post(editor::handle_open_session))
        .route(
            "/api/v1/editor/sessions/:id",
            get(editor::handle_get_session).delete(editor::handle_close_session),
        )
        .route(
            "/api/v1/editor/sessions/:id/fields",
            patch(editor::handle_set_field),
        )
        .route(
            "/api/v1/editor/sessions/:id/entries/:section",
            post(editor::handle_add_entry),
        )
        .route(
            "/api/v1/editor/sessions/:id/entries/:section/:index",
            patch(editor::handle_set_entry_field).delete(editor::handle_remove_entry),
        )
        .route("/api/v1/editor/sessions/:id/undo", post(editor::handle_undo))
        .route("/api/v1/editor/sessions/:id/redo", post(editor::handle_redo))
        .route(
            "/api/v1/editor/sessions/:id/customization",
            put(editor::handle_set_customization),
        )
        .route("/api/v1/editor/sessions/:id/save", post(editor::handle_save))
        .route("/api/v1/editor/sessions/:id/preview", get(editor::handle_preview))
        .route(
            "/api/v1/editor/sessions/:id/preview/html",
            get(editor::handle_preview_html),
        )
        .route("/api/v1/editor/sessions/:id/text", get(editor::handle_plain_text))
        .route("/api/v1/editor/sessions/:id/export", post(export::handle_export))
        // Saved resumes
        .route("/api/v1/resumes", get(dashboard::handle_list_resumes))
        .route("/api/v1/resumes/stats", get(dashboard::handle_stats))
        .route("/api/v1/resumes/import", post(dashboard::handle_import))
        .route(
            "/api/v1/resumes/:id",
            get(dashboard::handle_get_resume).delete(dashboard::handle_delete_resume),
        )
        .with_state(state)
}
