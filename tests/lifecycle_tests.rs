use async_trait::async_trait;
use page_desk::{
    ApiError,
    lifecycle,
    models::{CreatePageRequest, Page, PageStatus, UpdatePageRequest},
    rbac::Role,
    repository::{InMemoryRepository, PagePatch, PageRepository, RepositoryError},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

// --- Test Helpers ---

fn new_page(title: &str, slug: &str) -> CreatePageRequest {
    CreatePageRequest {
        title: title.to_string(),
        content: format!("{title} content"),
        slug: slug.to_string(),
    }
}

async fn seed_draft(repo: &InMemoryRepository, slug: &str) -> Page {
    lifecycle::create_draft(repo, Some(Role::Editor), new_page("Test", slug))
        .await
        .expect("editor can create a draft")
}

async fn seed_published(repo: &InMemoryRepository, slug: &str) -> Page {
    let draft = seed_draft(repo, slug).await;
    lifecycle::publish(repo, Some(Role::Admin), &draft.id.to_string())
        .await
        .expect("admin can publish")
}

fn status_of(err: &ApiError) -> u16 {
    err.status_code().as_u16()
}

/// Counts every storage call so tests can assert that denied operations never reach it.
#[derive(Default)]
struct CountingRepo {
    inner: InMemoryRepository,
    calls: AtomicUsize,
}

impl CountingRepo {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageRepository for CountingRepo {
    async fn insert(&self, page: Page) -> Result<Page, RepositoryError> {
        self.touch();
        self.inner.insert(page).await
    }
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        self.touch();
        self.inner.find_by_id(id).await
    }
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        self.touch();
        self.inner.find_by_slug(slug).await
    }
    async fn update(&self, id: Uuid, patch: PagePatch) -> Result<Option<Page>, RepositoryError> {
        self.touch();
        self.inner.update(id, patch).await
    }
    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.touch();
        self.inner.remove(id).await
    }
    async fn list_all(&self) -> Result<Vec<Page>, RepositoryError> {
        self.touch();
        self.inner.list_all().await
    }
}

/// A store whose every call fails, standing in for a storage outage.
struct BrokenRepo;

#[async_trait]
impl PageRepository for BrokenRepo {
    async fn insert(&self, _page: Page) -> Result<Page, RepositoryError> {
        Err(RepositoryError::Unavailable("disk on fire".to_string()))
    }
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Page>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk on fire".to_string()))
    }
    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Page>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk on fire".to_string()))
    }
    async fn update(&self, _id: Uuid, _patch: PagePatch) -> Result<Option<Page>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk on fire".to_string()))
    }
    async fn remove(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("disk on fire".to_string()))
    }
    async fn list_all(&self) -> Result<Vec<Page>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk on fire".to_string()))
    }
}

// --- create_draft ---

#[tokio::test]
async fn test_create_draft_by_editor() {
    let repo = InMemoryRepository::new();

    let page = lifecycle::create_draft(&repo, Some(Role::Editor), new_page("Home", "home"))
        .await
        .unwrap();

    assert_eq!(page.status, PageStatus::Draft);
    assert_eq!(page.created_by, Role::Editor);
    assert_eq!(page.slug, "home");
    assert_eq!(page.created_at, page.updated_at);
    assert_eq!(repo.list_all().await.unwrap(), vec![page]);
}

#[tokio::test]
async fn test_create_draft_records_creator_role() {
    let repo = InMemoryRepository::new();

    let page = lifecycle::create_draft(&repo, Some(Role::SuperAdmin), new_page("A", "a"))
        .await
        .unwrap();

    assert_eq!(page.created_by, Role::SuperAdmin);
}

#[tokio::test]
async fn test_create_draft_denied_without_touching_storage() {
    let repo = CountingRepo::default();

    let err = lifecycle::create_draft(&repo, Some(Role::Viewer), new_page("A", "a"))
        .await
        .unwrap_err();
    assert_eq!(status_of(&err), 403);

    let err = lifecycle::create_draft(&repo, None, new_page("A", "a"))
        .await
        .unwrap_err();
    assert_eq!(status_of(&err), 401);

    assert_eq!(repo.calls(), 0);
}

#[tokio::test]
async fn test_create_draft_allows_duplicate_slugs_and_first_match_wins() {
    let repo = InMemoryRepository::new();
    let first = lifecycle::create_draft(&repo, Some(Role::Editor), new_page("First", "dup"))
        .await
        .unwrap();
    let second = lifecycle::create_draft(&repo, Some(Role::Editor), new_page("Second", "dup"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let found = lifecycle::get_by_slug(&repo, Some(Role::Editor), "dup")
        .await
        .unwrap();
    assert_eq!(found.id, first.id);
}

// --- update_draft ---

#[tokio::test]
async fn test_update_draft_applies_only_provided_fields() {
    let repo = InMemoryRepository::new();
    let draft = seed_draft(&repo, "upd").await;

    let updated = lifecycle::update_draft(
        &repo,
        Some(Role::Editor),
        &draft.id.to_string(),
        UpdatePageRequest {
            title: Some("New Title".to_string()),
            content: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "New Title");
    assert_eq!(updated.content, draft.content);
    assert_eq!(updated.status, PageStatus::Draft);
    assert_eq!(updated.created_at, draft.created_at);
    assert!(updated.updated_at > draft.updated_at);
}

#[tokio::test]
async fn test_update_draft_keeps_published_status() {
    let repo = InMemoryRepository::new();
    let page = seed_published(&repo, "live").await;

    let updated = lifecycle::update_draft(
        &repo,
        Some(Role::Editor),
        &page.id.to_string(),
        UpdatePageRequest {
            title: None,
            content: Some("Fixed typo".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.status, PageStatus::Published);
    assert_eq!(updated.content, "Fixed typo");
}

#[tokio::test]
async fn test_update_draft_by_viewer_is_forbidden_and_leaves_page_unchanged() {
    let repo = InMemoryRepository::new();
    let draft = seed_draft(&repo, "upd2").await;

    let err = lifecycle::update_draft(
        &repo,
        Some(Role::Viewer),
        &draft.id.to_string(),
        UpdatePageRequest {
            title: Some("Hacked".to_string()),
            content: None,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(status_of(&err), 403);
    assert_eq!(repo.find_by_id(draft.id).await.unwrap(), Some(draft));
}

#[tokio::test]
async fn test_update_draft_missing_page_is_not_found() {
    let repo = InMemoryRepository::new();

    let err = lifecycle::update_draft(
        &repo,
        Some(Role::Editor),
        &Uuid::new_v4().to_string(),
        UpdatePageRequest::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // An id that is not even a UUID cannot name a page either.
    let err = lifecycle::update_draft(
        &repo,
        Some(Role::Editor),
        "not-a-uuid",
        UpdatePageRequest::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn test_gate_runs_before_id_resolution() {
    let repo = InMemoryRepository::new();

    // A viewer gets 403 even for an id that does not exist.
    let err = lifecycle::update_draft(
        &repo,
        Some(Role::Viewer),
        "not-a-uuid",
        UpdatePageRequest::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(&err), 403);

    let err = lifecycle::delete_by_id(&repo, None, &Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert_eq!(status_of(&err), 401);
}

// --- publish / unpublish ---

#[tokio::test]
async fn test_publish_by_admin_and_super_admin() {
    let repo = InMemoryRepository::new();

    for (slug, role) in [("p1", Role::Admin), ("p2", Role::SuperAdmin)] {
        let draft = seed_draft(&repo, slug).await;
        let page = lifecycle::publish(&repo, Some(role), &draft.id.to_string())
            .await
            .unwrap();
        assert_eq!(page.status, PageStatus::Published);
    }
}

#[tokio::test]
async fn test_publish_by_editor_is_forbidden() {
    let repo = InMemoryRepository::new();
    let draft = seed_draft(&repo, "p").await;

    let err = lifecycle::publish(&repo, Some(Role::Editor), &draft.id.to_string())
        .await
        .unwrap_err();

    assert_eq!(status_of(&err), 403);
    let stored = repo.find_by_id(draft.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PageStatus::Draft);
}

#[tokio::test]
async fn test_publish_missing_page_is_not_found() {
    let repo = InMemoryRepository::new();

    let err = lifecycle::publish(&repo, Some(Role::Admin), &Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let err = lifecycle::unpublish(&repo, Some(Role::Admin), &Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn test_republish_refreshes_updated_at() {
    let repo = InMemoryRepository::new();
    let page = seed_published(&repo, "again").await;

    let again = lifecycle::publish(&repo, Some(Role::Admin), &page.id.to_string())
        .await
        .unwrap();

    assert_eq!(again.status, PageStatus::Published);
    assert!(again.updated_at > page.updated_at);
}

#[tokio::test]
async fn test_publish_unpublish_round_trip() {
    let repo = InMemoryRepository::new();
    let draft = seed_draft(&repo, "unpub").await;
    let id = draft.id.to_string();

    let published = lifecycle::publish(&repo, Some(Role::Admin), &id).await.unwrap();
    let unpublished = lifecycle::unpublish(&repo, Some(Role::Admin), &id).await.unwrap();

    assert_eq!(unpublished.status, PageStatus::Draft);
    assert!(published.updated_at > draft.updated_at);
    assert!(unpublished.updated_at > published.updated_at);
    assert_eq!(unpublished.created_at, draft.created_at);
}

#[tokio::test]
async fn test_unpublish_by_editor_is_forbidden() {
    let repo = InMemoryRepository::new();
    let page = seed_published(&repo, "stay").await;

    let err = lifecycle::unpublish(&repo, Some(Role::Editor), &page.id.to_string())
        .await
        .unwrap_err();

    assert_eq!(status_of(&err), 403);
}

// --- get_by_slug ---

#[tokio::test]
async fn test_get_by_slug_draft_visibility() {
    let repo = InMemoryRepository::new();
    seed_draft(&repo, "x").await;

    let page = lifecycle::get_by_slug(&repo, Some(Role::Editor), "x")
        .await
        .unwrap();
    assert_eq!(page.status, PageStatus::Draft);

    let err = lifecycle::get_by_slug(&repo, Some(Role::Viewer), "x")
        .await
        .unwrap_err();
    assert_eq!(status_of(&err), 403);

    let err = lifecycle::get_by_slug(&repo, None, "x").await.unwrap_err();
    assert_eq!(status_of(&err), 401);
}

#[tokio::test]
async fn test_get_by_slug_published_is_open_to_everyone() {
    let repo = InMemoryRepository::new();
    seed_published(&repo, "open").await;

    for actor in [None, Some(Role::Viewer), Some(Role::Editor), Some(Role::SuperAdmin)] {
        let page = lifecycle::get_by_slug(&repo, actor, "open").await.unwrap();
        assert_eq!(page.status, PageStatus::Published);
    }
}

#[tokio::test]
async fn test_get_by_slug_unknown_slug_is_not_found_for_everyone() {
    let repo = InMemoryRepository::new();

    for actor in [None, Some(Role::Viewer), Some(Role::SuperAdmin)] {
        let err = lifecycle::get_by_slug(&repo, actor, "nope").await.unwrap_err();
        assert_eq!(status_of(&err), 404);
    }
}

// --- list_visible ---

#[tokio::test]
async fn test_list_visible_filters_drafts_for_viewers_and_anonymous() {
    let repo = InMemoryRepository::new();
    seed_draft(&repo, "d1").await;
    let live = seed_published(&repo, "p1").await;
    seed_draft(&repo, "d2").await;

    for actor in [None, Some(Role::Viewer)] {
        let pages = lifecycle::list_visible(&repo, actor).await.unwrap();
        assert_eq!(pages, vec![live.clone()]);
    }
}

#[tokio::test]
async fn test_list_visible_returns_everything_in_insertion_order_for_editors() {
    let repo = InMemoryRepository::new();
    let d1 = seed_draft(&repo, "d1").await;
    let p1 = seed_published(&repo, "p1").await;
    let d2 = seed_draft(&repo, "d2").await;

    for role in [Role::Editor, Role::Admin, Role::SuperAdmin] {
        let pages = lifecycle::list_visible(&repo, Some(role)).await.unwrap();
        let slugs: Vec<_> = pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec![d1.slug.as_str(), p1.slug.as_str(), d2.slug.as_str()]);
        assert_eq!(pages.len(), repo.list_all().await.unwrap().len());
    }
}

#[tokio::test]
async fn test_publish_unpublish_scenario_visibility() {
    let repo = InMemoryRepository::new();
    let a = lifecycle::create_draft(&repo, Some(Role::Editor), new_page("A", "x"))
        .await
        .unwrap();
    let id = a.id.to_string();

    assert!(lifecycle::list_visible(&repo, Some(Role::Viewer)).await.unwrap().is_empty());

    lifecycle::publish(&repo, Some(Role::Admin), &id).await.unwrap();
    let visible = lifecycle::list_visible(&repo, Some(Role::Viewer)).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, a.id);
    assert_eq!(visible[0].status, PageStatus::Published);

    lifecycle::unpublish(&repo, Some(Role::Admin), &id).await.unwrap();
    assert!(lifecycle::list_visible(&repo, Some(Role::Viewer)).await.unwrap().is_empty());
}

// --- delete_by_id ---

#[tokio::test]
async fn test_delete_only_by_super_admin() {
    let repo = InMemoryRepository::new();
    let page = seed_published(&repo, "del").await;
    let id = page.id.to_string();

    for role in [Role::Viewer, Role::Editor, Role::Admin] {
        let err = lifecycle::delete_by_id(&repo, Some(role), &id).await.unwrap_err();
        assert_eq!(status_of(&err), 403, "{role} must not delete");
    }
    assert!(repo.find_by_id(page.id).await.unwrap().is_some());

    lifecycle::delete_by_id(&repo, Some(Role::SuperAdmin), &id)
        .await
        .unwrap();

    let err = lifecycle::get_by_slug(&repo, Some(Role::SuperAdmin), "del")
        .await
        .unwrap_err();
    assert_eq!(status_of(&err), 404);
}

#[tokio::test]
async fn test_delete_missing_page_is_not_found() {
    let repo = InMemoryRepository::new();
    let page = seed_draft(&repo, "once").await;
    let id = page.id.to_string();

    lifecycle::delete_by_id(&repo, Some(Role::SuperAdmin), &id).await.unwrap();
    let err = lifecycle::delete_by_id(&repo, Some(Role::SuperAdmin), &id)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound));
}

// --- page_stats ---

#[tokio::test]
async fn test_page_stats_counts_by_status() {
    let repo = InMemoryRepository::new();
    seed_draft(&repo, "d1").await;
    seed_draft(&repo, "d2").await;
    seed_published(&repo, "p1").await;

    let stats = lifecycle::page_stats(&repo, Some(Role::Admin)).await.unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.drafts, 2);
    assert_eq!(stats.published, 1);

    let err = lifecycle::page_stats(&repo, Some(Role::Editor)).await.unwrap_err();
    assert_eq!(status_of(&err), 403);
}

// --- Storage failures ---

#[tokio::test]
async fn test_storage_failure_is_internal_error_with_generic_message() {
    let repo = BrokenRepo;

    let err = lifecycle::list_visible(&repo, None).await.unwrap_err();
    assert_eq!(status_of(&err), 500);
    assert_eq!(err.to_string(), "Internal error");

    let err = lifecycle::create_draft(&repo, Some(Role::Editor), new_page("A", "a"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Internal(_)));
    assert!(!err.to_string().contains("disk on fire"));
}

#[tokio::test]
async fn test_authorization_is_checked_before_storage_failure() {
    let repo = BrokenRepo;

    let err = lifecycle::publish(&repo, Some(Role::Editor), &Uuid::new_v4().to_string())
        .await
        .unwrap_err();

    assert_eq!(status_of(&err), 403);
}

#[test]
fn test_authorize_edit_returns_the_authorized_role() {
    assert_eq!(
        lifecycle::authorize_edit(Some(Role::Admin), "create").unwrap(),
        Role::Admin
    );
    assert_eq!(
        status_of(&lifecycle::authorize_edit(Some(Role::Viewer), "create").unwrap_err()),
        403
    );
    assert_eq!(
        status_of(&lifecycle::authorize_edit(None, "create").unwrap_err()),
        401
    );
}
