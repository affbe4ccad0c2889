//! Pagination and listing filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Article, PrincipalId, ValidationError};

/// Page size used when the caller does not supply one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size accepted
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw listing parameters as they arrive from the request layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Page number (1-indexed)
    pub page: Option<u32>,
    /// Items per page
    pub limit: Option<u32>,
    /// Only articles owned by this principal
    pub author_id: Option<PrincipalId>,
    /// Only articles published at or after this instant
    pub published_after: Option<DateTime<Utc>>,
}

impl PageQuery {
    /// Query for a page with the given size
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Restrict to one owner
    #[must_use]
    pub fn with_author(mut self, author_id: PrincipalId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Restrict to articles published at or after `after`
    #[must_use]
    pub fn with_published_after(mut self, after: DateTime<Utc>) -> Self {
        self.published_after = Some(after);
        self
    }

    /// Apply defaults and bounds, producing a validated filter
    pub fn into_filter(
        self,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Result<ArticleFilter, ValidationError> {
        ArticleFilter::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(default_page_size),
            self.author_id,
            self.published_after,
        )
        .and_then(|filter| filter.bounded(max_page_size))
    }
}

/// Validated listing filter.
///
/// Every instance has `page >= 1` and `page_size >= 1`; the only way to build
/// one is through [`ArticleFilter::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArticleFilter {
    page: u32,
    page_size: u32,
    owner_id: Option<PrincipalId>,
    published_after: Option<DateTime<Utc>>,
}

impl ArticleFilter {
    /// Build a filter, rejecting zero page or page size
    pub fn new(
        page: u32,
        page_size: u32,
        owner_id: Option<PrincipalId>,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::new("page must be at least 1"));
        }
        if page_size == 0 {
            return Err(ValidationError::new("limit must be at least 1"));
        }
        Ok(Self {
            page,
            page_size,
            owner_id,
            published_after,
        })
    }

    /// Reject page sizes above `max_page_size`
    pub fn bounded(self, max_page_size: u32) -> Result<Self, ValidationError> {
        if self.page_size > max_page_size {
            return Err(ValidationError::new(format!(
                "limit must be at most {max_page_size}"
            )));
        }
        Ok(self)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn owner_id(&self) -> Option<PrincipalId> {
        self.owner_id
    }

    pub fn published_after(&self) -> Option<DateTime<Utc>> {
        self.published_after
    }

    /// Get the offset for database queries
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of listed articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePage {
    /// Items in this page, owner-joined
    pub items: Vec<Article>,
    /// Total number of matching articles
    pub total: u64,
    /// Current page (1-indexed)
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total number of pages
    pub total_pages: u32,
}

impl ArticlePage {
    /// Create a new page for the given filter
    pub fn new(items: Vec<Article>, total: u64, filter: &ArticleFilter) -> Self {
        let page_size = u64::from(filter.page_size());
        let total_pages = u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page: filter.page(),
            limit: filter.page_size(),
            total_pages,
        }
    }
}
