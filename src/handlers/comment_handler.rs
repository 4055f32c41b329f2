use axum::{
    extract::State,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::auth::Identity;
use crate::config::AppState;
use crate::models::comment_model::CommentRequest;
use crate::models::page_model::{PageParams, DEFAULT_COMMENT_PAGE_SIZE};
use crate::services::comment_service::CommentService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list_comments_handler(
    State(state): State<AppState>,
    ValidatedPath(article_id): ValidatedPath<Uuid>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.window(DEFAULT_COMMENT_PAGE_SIZE) {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match CommentService::list_by_article(&state.db, article_id, page).await {
        Ok(res) => ResponseBuilder::success("COMMENTS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(article_id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CommentRequest>,
) -> impl IntoResponse {
    match CommentService::create(&state.db, identity.principal(), article_id, payload).await {
        Ok(res) => ResponseBuilder::created("COMMENT_CREATED", "Comment added", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_comment_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CommentRequest>,
) -> impl IntoResponse {
    match CommentService::update(&state.db, identity.principal(), id, payload).await {
        Ok(res) => ResponseBuilder::success("COMMENT_UPDATED", "Comment updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    match CommentService::delete(&state.db, identity.principal(), id).await {
        Ok(_) => ResponseBuilder::done("COMMENT_DELETED", "Comment deleted").into_response(),
        Err(e) => e.into_response(),
    }
}
