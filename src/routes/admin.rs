use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Admin Router Module
///
/// Publication and moderation endpoints.
///
/// Access Control:
/// Publish, unpublish and stats need admin rank or above. Delete is limited to the
/// exact set `{super-admin}`; an `admin` caller is refused with 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /pages/{id}/publish
        .route("/pages/{id}/publish", post(handlers::publish_page))
        // POST /pages/{id}/unpublish
        .route("/pages/{id}/unpublish", post(handlers::unpublish_page))
        // DELETE /pages/{id}
        .route("/pages/{id}", delete(handlers::delete_page))
        // GET /admin/stats
        // Page counts by status.
        .route("/admin/stats", get(handlers::get_page_stats))
}
