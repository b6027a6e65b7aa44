use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Editorial Router Module
///
/// Draft authoring endpoints. The lifecycle requires editor rank or above for both.
pub fn editorial_routes() -> Router<AppState> {
    Router::new()
        // POST /pages
        // Creates a draft owned by the caller's role.
        .route("/pages", post(handlers::create_page))
        // PUT /pages/{id}
        // Partial update of title and content; status is left alone.
        .route("/pages/{id}", put(handlers::update_page))
}
