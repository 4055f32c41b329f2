pub mod article_service;
pub mod auth_service;
pub mod category_service;
pub mod comment_service;
pub mod storage_service;
pub mod tag_service;
pub mod user_service;
