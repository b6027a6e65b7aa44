use crate::models::{Page, PageStatus};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// RepositoryError
///
/// Any failure of the storage layer. The lifecycle never inspects these beyond
/// reporting them; they all surface to callers as a generic internal error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// PagePatch
///
/// The fields a mutation may change. `None` leaves the stored value untouched.
/// Every applied patch also refreshes `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PageStatus>,
}

impl PagePatch {
    pub fn status(status: PageStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn apply(self, page: &mut Page) {
        if let Some(title) = self.title {
            page.title = title;
        }
        if let Some(content) = self.content {
            page.content = content;
        }
        if let Some(status) = self.status {
            page.status = status;
        }
        page.updated_at = refreshed_timestamp(page.updated_at);
    }
}

/// refreshed_timestamp
///
/// The next `updated_at` for a page last touched at `previous`. Never returns a value
/// at or before `previous`, even when the wall clock has not advanced.
pub fn refreshed_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

/// PageRepository
///
/// The storage collaborator for the page collection. The lifecycle treats it as the
/// sole source of truth and performs every authorization check before calling it.
///
/// Implementations must serialise mutations on the same id and give list/lookup
/// calls a consistent snapshot.
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn insert(&self, page: Page) -> Result<Page, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError>;
    // First match in insertion order when several pages share a slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, RepositoryError>;
    async fn update(&self, id: Uuid, patch: PagePatch) -> Result<Option<Page>, RepositoryError>;
    // True if a page was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError>;
    // Insertion order.
    async fn list_all(&self) -> Result<Vec<Page>, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the page store across the application state.
pub type RepositoryState = Arc<dyn PageRepository>;

// --- In-Memory Store ---

/// InMemoryRepository
///
/// An ordered in-process page collection. A single `RwLock` over the whole vector
/// gives per-id mutual exclusion for writers and snapshot reads for listings.
#[derive(Default)]
pub struct InMemoryRepository {
    pages: RwLock<Vec<Page>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageRepository for InMemoryRepository {
    async fn insert(&self, page: Page) -> Result<Page, RepositoryError> {
        self.pages.write().await.push(page.clone());
        Ok(page)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        let pages = self.pages.read().await;
        Ok(pages.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        let pages = self.pages.read().await;
        Ok(pages.iter().find(|p| p.slug == slug).cloned())
    }

    async fn update(&self, id: Uuid, patch: PagePatch) -> Result<Option<Page>, RepositoryError> {
        let mut pages = self.pages.write().await;
        let Some(page) = pages.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply(page);
        Ok(Some(page.clone()))
    }

    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut pages = self.pages.write().await;
        let before = pages.len();
        pages.retain(|p| p.id != id);
        Ok(pages.len() != before)
    }

    async fn list_all(&self) -> Result<Vec<Page>, RepositoryError> {
        Ok(self.pages.read().await.clone())
    }
}

// --- Postgres Store ---

const PAGE_COLUMNS: &str =
    "id, slug, title, content, status, created_by, created_at, updated_at";

/// PostgresRepository
///
/// The `PageRepository` backed by the `pages` table (see `migrations/`). The `seq`
/// column records insertion order; single-statement `UPDATE ... RETURNING` keeps
/// each mutation atomic per row.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for PostgresRepository {
    async fn insert(&self, page: Page) -> Result<Page, RepositoryError> {
        let sql = format!(
            "INSERT INTO pages ({PAGE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PAGE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Page>(&sql)
            .bind(page.id)
            .bind(&page.slug)
            .bind(&page.title)
            .bind(&page.content)
            .bind(page.status.as_str())
            .bind(page.created_by.as_str())
            .bind(page.created_at)
            .bind(page.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1");
        let page = sqlx::query_as::<_, Page>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1 ORDER BY seq LIMIT 1");
        let page = sqlx::query_as::<_, Page>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    /// update
    ///
    /// Uses `COALESCE` so only the `Some` fields of the patch are written. `updated_at`
    /// moves to `NOW()` or one microsecond past its old value, whichever is later.
    async fn update(&self, id: Uuid, patch: PagePatch) -> Result<Option<Page>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE pages
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                status = COALESCE($4, status),
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING {PAGE_COLUMNS}
            "#
        );
        let page = sqlx::query_as::<_, Page>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .bind(patch.status.map(PageStatus::as_str))
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Page>, RepositoryError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages ORDER BY seq");
        let pages = sqlx::query_as::<_, Page>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(pages)
    }
}
