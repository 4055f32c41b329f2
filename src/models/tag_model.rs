use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(custom(function = "crate::utils::validator_utils::validate_not_blank"))]
    #[validate(length(min = 2, max = 50, message = "Tag name must be between 2 and 50 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub article_count: u64,
}
