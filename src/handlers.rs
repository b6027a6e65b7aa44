use crate::{
    AppState,
    auth::Actor,
    error::ApiError,
    lifecycle,
    models::{
        ActorProfile, ApiResponse, CreatePageRequest, Page, PageStats, RoleInfo,
        UpdatePageRequest,
    },
    rbac::Role,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

/// The success half of every handler: HTTP status plus the envelope repeating it.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn respond<T>(status: StatusCode, data: Option<T>) -> (StatusCode, Json<ApiResponse<T>>) {
    (status, Json(ApiResponse::success(status.as_u16(), data)))
}

// --- Public Reads ---

/// list_pages
///
/// [Public Route] Lists the pages visible to the caller. Anonymous callers and viewers
/// get published pages only; editors and above get the whole collection.
#[utoipa::path(
    get,
    path = "/pages",
    params(("x-actor-role" = Option<String>, Header, description = "Caller role")),
    responses(
        (status = 200, description = "Visible pages", body = ApiResponse<Vec<Page>>),
        (status = 500, description = "Internal error")
    )
)]
pub async fn list_pages(actor: Actor, State(state): State<AppState>) -> ApiResult<Vec<Page>> {
    let pages = lifecycle::list_visible(state.repo.as_ref(), actor.role()).await?;
    Ok(respond(StatusCode::OK, Some(pages)))
}

/// get_page_by_slug
///
/// [Public Route] Fetches one page by slug. Published pages are open; drafts need
/// editor rank.
///
/// *Note*: an unknown slug answers 404 while a hidden draft answers 401/403, so the
/// existence of a slug is observable.
#[utoipa::path(
    get,
    path = "/pages/by-slug/{slug}",
    params(
        ("slug" = String, Path, description = "Page slug"),
        ("x-actor-role" = Option<String>, Header, description = "Caller role")
    ),
    responses(
        (status = 200, description = "Found", body = ApiResponse<Page>),
        (status = 401, description = "Draft, no identity presented"),
        (status = 403, description = "Draft, insufficient role"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_page_by_slug(
    actor: Actor,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Page> {
    let page = lifecycle::get_by_slug(state.repo.as_ref(), actor.role(), &slug).await?;
    Ok(respond(StatusCode::OK, Some(page)))
}

/// list_roles
///
/// [Public Route] The role catalog, lowest rank first.
#[utoipa::path(
    get,
    path = "/roles",
    responses((status = 200, description = "Role catalog", body = ApiResponse<Vec<RoleInfo>>))
)]
pub async fn list_roles() -> ApiResult<Vec<RoleInfo>> {
    let roles = Role::ALL
        .into_iter()
        .map(|role| RoleInfo {
            role,
            rank: role.rank(),
        })
        .collect();
    Ok(respond(StatusCode::OK, Some(roles)))
}

/// get_me
///
/// [Public Route] Echoes the role resolved for this request.
#[utoipa::path(
    get,
    path = "/me",
    params(("x-actor-role" = Option<String>, Header, description = "Caller role")),
    responses(
        (status = 200, description = "Resolved actor", body = ApiResponse<ActorProfile>),
        (status = 401, description = "No identity presented")
    )
)]
pub async fn get_me(actor: Actor) -> ApiResult<ActorProfile> {
    let role = actor.role().ok_or(ApiError::Unauthenticated)?;
    Ok(respond(StatusCode::OK, Some(ActorProfile { role })))
}

// --- Editorial Mutations ---

/// create_page
///
/// [Editor Route] Creates a draft. `created_by` is taken from the caller's role, never
/// from the payload.
#[utoipa::path(
    post,
    path = "/pages",
    params(("x-actor-role" = Option<String>, Header, description = "Caller role")),
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Draft created", body = ApiResponse<Page>),
        (status = 400, description = "Unreadable body"),
        (status = 401, description = "No identity presented"),
        (status = 403, description = "Below editor")
    )
)]
pub async fn create_page(
    actor: Actor,
    State(state): State<AppState>,
    payload: Result<Json<CreatePageRequest>, JsonRejection>,
) -> ApiResult<Page> {
    lifecycle::authorize_edit(actor.role(), "create")?;
    let Json(payload) = payload?;
    let page = lifecycle::create_draft(state.repo.as_ref(), actor.role(), payload).await?;
    Ok(respond(StatusCode::CREATED, Some(page)))
}

/// update_page
///
/// [Editor Route] Partial update of title and content.
#[utoipa::path(
    put,
    path = "/pages/{id}",
    params(
        ("id" = String, Path, description = "Page ID"),
        ("x-actor-role" = Option<String>, Header, description = "Caller role")
    ),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Page>),
        (status = 400, description = "Unreadable body"),
        (status = 401, description = "No identity presented"),
        (status = 403, description = "Below editor"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_page(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePageRequest>, JsonRejection>,
) -> ApiResult<Page> {
    lifecycle::authorize_edit(actor.role(), "update")?;
    let Json(payload) = payload?;
    let page = lifecycle::update_draft(state.repo.as_ref(), actor.role(), &id, payload).await?;
    Ok(respond(StatusCode::OK, Some(page)))
}

/// publish_page
///
/// [Admin Route] Makes a page visible to everyone.
#[utoipa::path(
    post,
    path = "/pages/{id}/publish",
    params(
        ("id" = String, Path, description = "Page ID"),
        ("x-actor-role" = Option<String>, Header, description = "Caller role")
    ),
    responses(
        (status = 200, description = "Published", body = ApiResponse<Page>),
        (status = 401, description = "No identity presented"),
        (status = 403, description = "Below admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn publish_page(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Page> {
    let page = lifecycle::publish(state.repo.as_ref(), actor.role(), &id).await?;
    Ok(respond(StatusCode::OK, Some(page)))
}

/// unpublish_page
///
/// [Admin Route] Returns a page to draft.
#[utoipa::path(
    post,
    path = "/pages/{id}/unpublish",
    params(
        ("id" = String, Path, description = "Page ID"),
        ("x-actor-role" = Option<String>, Header, description = "Caller role")
    ),
    responses(
        (status = 200, description = "Unpublished", body = ApiResponse<Page>),
        (status = 401, description = "No identity presented"),
        (status = 403, description = "Below admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn unpublish_page(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Page> {
    let page = lifecycle::unpublish(state.repo.as_ref(), actor.role(), &id).await?;
    Ok(respond(StatusCode::OK, Some(page)))
}

/// delete_page
///
/// [Super-Admin Route] Removes a page from the collection.
///
/// *RBAC*: only `super-admin` may delete; `admin` gets 403 despite its rank.
#[utoipa::path(
    delete,
    path = "/pages/{id}",
    params(
        ("id" = String, Path, description = "Page ID"),
        ("x-actor-role" = Option<String>, Header, description = "Caller role")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "No identity presented"),
        (status = 403, description = "Not super-admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_page(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    lifecycle::delete_by_id(state.repo.as_ref(), actor.role(), &id).await?;
    Ok(respond(StatusCode::OK, None))
}

/// get_page_stats
///
/// [Admin Route] Page counts by status.
#[utoipa::path(
    get,
    path = "/admin/stats",
    params(("x-actor-role" = Option<String>, Header, description = "Caller role")),
    responses(
        (status = 200, description = "Stats", body = ApiResponse<PageStats>),
        (status = 401, description = "No identity presented"),
        (status = 403, description = "Below admin")
    )
)]
pub async fn get_page_stats(actor: Actor, State(state): State<AppState>) -> ApiResult<PageStats> {
    let stats = lifecycle::page_stats(state.repo.as_ref(), actor.role()).await?;
    Ok(respond(StatusCode::OK, Some(stats)))
}
