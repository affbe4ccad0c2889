//! Mock repositories for testing

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use folio_db::{
    ArticleListRow, ArticleRepository, ArticleRow, CreateArticle, CreatePrincipal, DbError,
    DbResult, PrincipalRepository, PrincipalRow, UpdateArticle,
};
use folio_types::ArticleFilter;
use tokio::sync::Notify;
use uuid::Uuid;

/// In-memory principal repository for testing
#[derive(Default, Clone)]
pub struct MockPrincipalRepository {
    principals: Arc<DashMap<Uuid, PrincipalRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

#[allow(dead_code)]
impl MockPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a principal, leaving any issued tokens dangling
    pub fn remove(&self, id: Uuid) {
        if let Some((_, row)) = self.principals.remove(&id) {
            self.by_email.remove(&row.email);
        }
    }

    /// Stored hash for a principal
    pub fn password_hash(&self, email: &str) -> Option<String> {
        let id = *self.by_email.get(email)?;
        self.principals.get(&id).map(|r| r.password_hash.clone())
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }
}

#[async_trait]
impl PrincipalRepository for MockPrincipalRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PrincipalRow>> {
        Ok(self.principals.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<PrincipalRow>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.principals.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create(&self, principal: CreatePrincipal) -> DbResult<PrincipalRow> {
        // Same guarantee as the unique constraint on principals.email
        match self.by_email.entry(principal.email.clone()) {
            Entry::Occupied(_) => Err(DbError::Conflict),
            Entry::Vacant(slot) => {
                let row = PrincipalRow {
                    id: principal.id,
                    email: principal.email,
                    password_hash: principal.password_hash,
                    name: principal.name,
                    created_at: Utc::now(),
                };
                slot.insert(row.id);
                self.principals.insert(row.id, row.clone());
                Ok(row)
            }
        }
    }
}

/// Pauses one repository call after it has done its work.
///
/// `reached` fires once the call is parked; it returns when `release` fires.
#[derive(Clone, Default)]
pub struct Hold {
    pub reached: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Hold {
    async fn park(&self) {
        self.reached.notify_one();
        self.release.notified().await;
    }
}

/// In-memory article repository for testing.
///
/// Joins authors through the principal mock and counts listing queries so
/// tests can tell cache hits from store reads.
pub struct MockArticleRepository {
    articles: DashMap<Uuid, ArticleRow>,
    principals: Arc<MockPrincipalRepository>,
    find_page_calls: AtomicUsize,
    fail_find_page: AtomicBool,
    read_hold: Mutex<Option<Hold>>,
    create_hold: Mutex<Option<Hold>>,
}

#[allow(dead_code)]
impl MockArticleRepository {
    pub fn new(principals: Arc<MockPrincipalRepository>) -> Self {
        Self {
            articles: DashMap::new(),
            principals,
            find_page_calls: AtomicUsize::new(0),
            fail_find_page: AtomicBool::new(false),
            read_hold: Mutex::new(None),
            create_hold: Mutex::new(None),
        }
    }

    /// Park the next `find_page` after it has read the rows
    pub fn hold_next_read(&self) -> Hold {
        let hold = Hold::default();
        *self.read_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    /// Park the next `create` after the row is stored
    pub fn hold_next_create(&self) -> Hold {
        let hold = Hold::default();
        *self.create_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    /// Number of `find_page` calls so far
    pub fn find_page_calls(&self) -> usize {
        self.find_page_calls.load(Ordering::SeqCst)
    }

    /// Make every later `find_page` call fail
    pub fn fail_find_page(&self, fail: bool) {
        self.fail_find_page.store(fail, Ordering::SeqCst);
    }

    /// Stored row, bypassing the service
    pub fn get(&self, id: Uuid) -> Option<ArticleRow> {
        self.articles.get(&id).map(|r| r.value().clone())
    }

    /// Insert a row directly
    pub fn insert(&self, row: ArticleRow) {
        self.articles.insert(row.id, row);
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    fn matches(row: &ArticleRow, filter: &ArticleFilter) -> bool {
        if let Some(owner) = filter.owner_id() {
            if row.author_id != owner.0 {
                return false;
            }
        }
        if let Some(after) = filter.published_after() {
            match row.published_at {
                Some(at) if at >= after => {}
                _ => return false,
            }
        }
        true
    }

    /// published_at DESC NULLS LAST, id ASC
    fn listing_order(a: &ArticleRow, b: &ArticleRow) -> CmpOrdering {
        match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => CmpOrdering::Less,
            (None, Some(_)) => CmpOrdering::Greater,
            (None, None) => CmpOrdering::Equal,
        }
        .then_with(|| a.id.cmp(&b.id))
    }
}

#[async_trait]
impl ArticleRepository for MockArticleRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ArticleRow>> {
        Ok(self.get(id))
    }

    async fn find_page(&self, filter: &ArticleFilter) -> DbResult<(Vec<ArticleListRow>, u64)> {
        self.find_page_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find_page.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(folio_db::sqlx::Error::PoolTimedOut));
        }

        let mut rows: Vec<ArticleRow> = self
            .articles
            .iter()
            .map(|r| r.value().clone())
            .filter(|row| Self::matches(row, filter))
            .collect();
        rows.sort_by(Self::listing_order);

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .filter_map(|row| {
                let author = self.principals.principals.get(&row.author_id)?;
                Some(ArticleListRow {
                    id: row.id,
                    title: row.title,
                    description: row.description,
                    published_at: row.published_at,
                    author_id: row.author_id,
                    author_email: author.email.clone(),
                    author_name: author.name.clone(),
                })
            })
            .collect();

        let hold = self.read_hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.park().await;
        }

        Ok((items, total))
    }

    async fn create(&self, article: CreateArticle) -> DbResult<ArticleRow> {
        let row = ArticleRow {
            id: article.id,
            title: article.title,
            description: article.description,
            published_at: article.published_at,
            author_id: article.author_id,
        };
        self.insert(row.clone());

        let hold = self.create_hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.park().await;
        }
        Ok(row)
    }

    async fn update(&self, article: UpdateArticle) -> DbResult<ArticleRow> {
        let mut row = self.articles.get_mut(&article.id).ok_or(DbError::NotFound)?;
        row.title = article.title;
        row.description = article.description;
        row.published_at = article.published_at;
        Ok(row.value().clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        Ok(self.articles.remove(&id).is_some())
    }
}
