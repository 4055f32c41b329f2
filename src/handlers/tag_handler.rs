use axum::{
    extract::State,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::auth::{require_admin, Identity};
use crate::config::AppState;
use crate::models::page_model::{PageParams, DEFAULT_PAGE_SIZE};
use crate::models::tag_model::TagRequest;
use crate::services::tag_service::TagService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list_tags_handler(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.window(DEFAULT_PAGE_SIZE) {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match TagService::list(&state.db, page).await {
        Ok(res) => ResponseBuilder::success("TAGS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_tag_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    match TagService::get_by_id(&state.db, id).await {
        Ok(res) => ResponseBuilder::success("TAG_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_tag_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<TagRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_admin(identity.principal()) {
        return e.into_response();
    }
    match TagService::create(&state.db, payload).await {
        Ok(res) => ResponseBuilder::created("TAG_CREATED", "Tag created", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_tag_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    if let Err(e) = require_admin(identity.principal()) {
        return e.into_response();
    }
    match TagService::delete(&state.db, id).await {
        Ok(_) => ResponseBuilder::done("TAG_DELETED", "Tag deleted").into_response(),
        Err(e) => e.into_response(),
    }
}
