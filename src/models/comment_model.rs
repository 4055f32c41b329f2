use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::article_model::AuthorSummary;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(custom(function = "crate::utils::validator_utils::validate_not_blank"))]
    #[validate(length(min = 5, max = 1000, message = "Comment must be between 5 and 1000 characters"))]
    pub content: String,
}

/// No article back-reference: the comment is always listed under its article.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub user: AuthorSummary,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
