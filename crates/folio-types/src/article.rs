//! Article types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{PrincipalId, ValidationError};

/// Unique article identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    /// Create a new random article ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an article ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ArticleId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Owner fields joined onto listed articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleAuthor {
    pub id: PrincipalId,
    pub email: String,
    pub name: String,
}

/// An article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: PrincipalId,
    /// Present on listed articles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ArticleAuthor>,
}

/// Fields accepted when creating an article.
///
/// There is deliberately no owner field: the owner is always the
/// authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "published_at")]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    /// Create a new article input with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            published_at: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the publication time
    #[must_use]
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Reject blank titles
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

/// Partial update of an article.
///
/// Absent fields keep their stored value. For the nullable fields an
/// explicit JSON `null` clears the stored value, which is why they are
/// `Option<Option<_>>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        alias = "published_at",
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl ArticlePatch {
    /// Set a new title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the description
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set or clear the publication time
    #[must_use]
    pub fn published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.published_at.is_none()
    }

    /// Reject a present-but-blank title
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    /// Apply present fields onto an article
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            article.description.clone_from(description);
        }
        if let Some(published_at) = self.published_at {
            article.published_at = published_at;
        }
    }
}

/// Marks a field as present, so `null` becomes `Some(None)`
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title must not be empty"));
    }
    Ok(())
}
