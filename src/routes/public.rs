use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints any client may call, with or without an `x-actor-role` header. What a
/// caller actually sees still depends on the role it presents.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /roles
        // The role hierarchy with ranks.
        .route("/roles", get(handlers::list_roles))
        // GET /me
        // The role resolved for this request; 401 when none was presented.
        .route("/me", get(handlers::get_me))
        // GET /pages
        // Published pages for anonymous callers and viewers, everything for editors and above.
        .route("/pages", get(handlers::list_pages))
        // GET /pages/by-slug/{slug}
        // Single page lookup. Drafts are gated to editors and above.
        .route("/pages/by-slug/{slug}", get(handlers::get_page_by_slug))
}
