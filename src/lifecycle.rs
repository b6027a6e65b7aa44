//! Page lifecycle and visibility.
//!
//! Every operation runs the authorization gate first and only then touches the page
//! collection, so a denied call never mutates anything. The actor role is always an
//! explicit argument; `None` means no identity was presented.

use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{CreatePageRequest, Page, PageStats, PageStatus, UpdatePageRequest},
    rbac::{AuthzError, Role, has_min_role, require_role, roles_at_or_above},
    repository::{PagePatch, PageRepository},
};

/// Minimum rank to create or edit pages, and to see drafts.
pub const EDIT_MIN_ROLE: Role = Role::Editor;
/// Minimum rank to publish or unpublish.
pub const PUBLISH_MIN_ROLE: Role = Role::Admin;
/// The exact set allowed to delete.
pub const DELETE_ROLES: [Role; 1] = [Role::SuperAdmin];

/// Runs the policy and hands back the authorized role.
fn gate(actor: Option<Role>, allowed: &[Role], action: &str) -> Result<Role, ApiError> {
    require_role(actor, allowed).map_err(|err| {
        tracing::warn!(actor = ?actor, action, reason = %err, "authorization denied");
        ApiError::from(err)
    })?;
    actor.ok_or(ApiError::Unauthenticated)
}

/// authorize_edit
///
/// The editor gate on its own, for adapters that must decide 401/403 before they
/// look at a request body.
pub fn authorize_edit(actor: Option<Role>, action: &str) -> Result<Role, ApiError> {
    gate(actor, &roles_at_or_above(EDIT_MIN_ROLE), action)
}

/// An id that does not parse cannot name a stored page.
fn parse_page_id(page_id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(page_id).map_err(|_| ApiError::NotFound)
}

// --- Visibility ---

/// can_view
///
/// Published pages are open to everyone. Drafts go back through the editor gate, so
/// a hidden draft reports 401/403 while an unknown slug reports 404.
pub fn can_view(actor: Option<Role>, page: &Page) -> Result<(), AuthzError> {
    match page.status {
        PageStatus::Published => Ok(()),
        PageStatus::Draft => require_role(actor, &roles_at_or_above(EDIT_MIN_ROLE)),
    }
}

/// visible_pages
///
/// Filters a listing for `actor`: editors and above see the whole collection,
/// viewers and anonymous callers only published pages. Order is preserved.
pub fn visible_pages(actor: Option<Role>, pages: Vec<Page>) -> Vec<Page> {
    match actor {
        Some(role) if has_min_role(role, EDIT_MIN_ROLE) => pages,
        _ => pages.into_iter().filter(Page::is_published).collect(),
    }
}

// --- Operations ---

pub async fn create_draft(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    req: CreatePageRequest,
) -> Result<Page, ApiError> {
    let created_by = authorize_edit(actor, "create")?;

    let page = repo.insert(Page::new_draft(created_by, req)).await?;
    tracing::info!(page_id = %page.id, slug = %page.slug, %created_by, "draft created");
    Ok(page)
}

/// update_draft
///
/// Changes title and/or content. Status is left alone, so editing a published page
/// keeps it published.
pub async fn update_draft(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    page_id: &str,
    req: UpdatePageRequest,
) -> Result<Page, ApiError> {
    authorize_edit(actor, "update")?;
    let id = parse_page_id(page_id)?;

    let patch = PagePatch {
        title: req.title,
        content: req.content,
        status: None,
    };
    let page = repo.update(id, patch).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(page_id = %page.id, "page updated");
    Ok(page)
}

/// Sets the status to published. Re-publishing still refreshes `updated_at`.
pub async fn publish(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    page_id: &str,
) -> Result<Page, ApiError> {
    transition(repo, actor, page_id, PageStatus::Published, "publish").await
}

pub async fn unpublish(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    page_id: &str,
) -> Result<Page, ApiError> {
    transition(repo, actor, page_id, PageStatus::Draft, "unpublish").await
}

async fn transition(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    page_id: &str,
    to: PageStatus,
    action: &str,
) -> Result<Page, ApiError> {
    gate(actor, &roles_at_or_above(PUBLISH_MIN_ROLE), action)?;
    let id = parse_page_id(page_id)?;

    let page = repo
        .update(id, PagePatch::status(to))
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(page_id = %page.id, status = %page.status, action, "status changed");
    Ok(page)
}

/// get_by_slug
///
/// Resolves the slug before gating: the status of the page decides which gate applies.
pub async fn get_by_slug(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    slug: &str,
) -> Result<Page, ApiError> {
    let page = repo.find_by_slug(slug).await?.ok_or(ApiError::NotFound)?;
    can_view(actor, &page).map_err(|err| {
        tracing::warn!(actor = ?actor, slug, reason = %err, "draft hidden from caller");
        ApiError::from(err)
    })?;
    Ok(page)
}

pub async fn list_visible(
    repo: &dyn PageRepository,
    actor: Option<Role>,
) -> Result<Vec<Page>, ApiError> {
    let pages = repo.list_all().await?;
    Ok(visible_pages(actor, pages))
}

/// delete_by_id
///
/// Allowed for exactly the roles in `DELETE_ROLES`, not for a rank range.
pub async fn delete_by_id(
    repo: &dyn PageRepository,
    actor: Option<Role>,
    page_id: &str,
) -> Result<(), ApiError> {
    gate(actor, &DELETE_ROLES, "delete")?;
    let id = parse_page_id(page_id)?;

    if !repo.remove(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(page_id = %id, "page deleted");
    Ok(())
}

/// Counts of the whole collection by status. Admin and above.
pub async fn page_stats(
    repo: &dyn PageRepository,
    actor: Option<Role>,
) -> Result<PageStats, ApiError> {
    gate(actor, &roles_at_or_above(PUBLISH_MIN_ROLE), "stats")?;
    let pages = repo.list_all().await?;
    let published = pages.iter().filter(|p| p.is_published()).count();
    Ok(PageStats {
        total: pages.len(),
        drafts: pages.len() - published,
        published,
    })
}
