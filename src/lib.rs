use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The authorization policy and the page lifecycle built on it.
pub mod rbac;
pub mod lifecycle;

// Data, storage and error types the lifecycle works with.
pub mod error;
pub mod models;
pub mod repository;

// HTTP adapter.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod routes;
use routes::{admin, editorial, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use rbac::Role;
pub use repository::{InMemoryRepository, PageRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// The OpenAPI document for the page API, served at `/api-docs/openapi.json` and
/// browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_pages, handlers::get_page_by_slug, handlers::list_roles,
        handlers::get_me, handlers::create_page, handlers::update_page,
        handlers::publish_page, handlers::unpublish_page, handlers::delete_page,
        handlers::get_page_stats
    ),
    components(
        schemas(
            models::Page, models::PageStatus, rbac::Role, models::CreatePageRequest,
            models::UpdatePageRequest, models::RoleInfo, models::ActorProfile,
            models::PageStats,
        )
    ),
    tags(
        (name = "page-desk", description = "Page publication API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The page store (in-memory or Postgres).
    pub repo: RepositoryState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// An in-memory state with default configuration. Used by tests and local runs
    /// without a database.
    pub fn in_memory() -> Self {
        Self {
            repo: std::sync::Arc::new(InMemoryRepository::new()),
            config: AppConfig::default(),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the observability layers and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(editorial::editorial_routes())
        .merge(admin::admin_routes())
        .fallback(|| async { ApiError::NotFound })
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Every request gets a UUID `x-request-id` ...
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // ... which the request span records ...
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // ... and the response echoes back.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span: method, uri, request id and the presented actor role,
/// so every log line of a request can be correlated and attributed.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string()
    };

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %header("x-request-id"),
        actor = %header(auth::ACTOR_ROLE_HEADER),
    )
}
