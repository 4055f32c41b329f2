use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::article::ArticleStatus;

/// Body of create and update. On update, title/content/excerpt replace the
/// stored values wholesale.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArticleRequest {
    #[validate(custom(function = "crate::utils::validator_utils::validate_not_blank"))]
    #[validate(length(min = 5, max = 255, message = "Title must be between 5 and 255 characters"))]
    pub title: String,

    #[validate(custom(function = "crate::utils::validator_utils::validate_not_blank"))]
    #[validate(length(min = 50, message = "Content must be at least 50 characters"))]
    pub content: String,

    #[validate(length(max = 255, message = "Excerpt too long"))]
    pub excerpt: Option<String>,

    pub category_id: Uuid,

    /// DRAFT, PUBLISHED or ARCHIVED; any case.
    pub status: Option<String>,

    /// `None` keeps the current tags on update; `Some(vec![])` clears them.
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    pub view_count: i64,
    pub author: AuthorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySummary>,
    pub tags: Vec<TagSummary>,
    pub comment_count: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// `?q=`; a missing or blank query matches everything.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}
