pub mod article_model;
pub mod auth_model;
pub mod category_model;
pub mod comment_model;
pub mod page_model;
pub mod tag_model;
