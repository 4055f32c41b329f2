use axum::{
    extract::State,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::auth::{require_admin, Identity};
use crate::config::AppState;
use crate::models::category_model::CategoryRequest;
use crate::models::page_model::{PageParams, DEFAULT_PAGE_SIZE};
use crate::services::category_service::CategoryService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list_categories_handler(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.window(DEFAULT_PAGE_SIZE) {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match CategoryService::list(&state.db, page).await {
        Ok(res) => ResponseBuilder::success("CATEGORIES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_category_handler(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    match CategoryService::get_by_id(&state.db, id).await {
        Ok(res) => ResponseBuilder::success("CATEGORY_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_category_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_admin(identity.principal()) {
        return e.into_response();
    }
    match CategoryService::create(&state.db, payload).await {
        Ok(res) => ResponseBuilder::created("CATEGORY_CREATED", "Category created", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_category_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_admin(identity.principal()) {
        return e.into_response();
    }
    match CategoryService::update(&state.db, id, payload).await {
        Ok(res) => ResponseBuilder::success("CATEGORY_UPDATED", "Category updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_category_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    if let Err(e) = require_admin(identity.principal()) {
        return e.into_response();
    }
    match CategoryService::delete(&state.db, id).await {
        Ok(_) => ResponseBuilder::done("CATEGORY_DELETED", "Category deleted").into_response(),
        Err(e) => e.into_response(),
    }
}
