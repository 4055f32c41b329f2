use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::auth::{require_author, Identity};
use crate::config::AppState;
use crate::models::article_model::{ArticleRequest, SearchParams};
use crate::models::page_model::PageParams;
use crate::services::article_service::ArticleService;
use crate::services::storage_service::BlobMetadata;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list_published_handler(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.article_request() {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match ArticleService::list_published(&state.db, page).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_by_slug_handler(
    State(state): State<AppState>,
    ValidatedPath(slug): ValidatedPath<String>,
) -> impl IntoResponse {
    match ArticleService::get_by_slug(&state.db, &slug).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_by_category_handler(
    State(state): State<AppState>,
    ValidatedPath(category_id): ValidatedPath<Uuid>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.article_request() {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match ArticleService::list_by_category(&state.db, state.listing_policy, category_id, page).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_by_tag_handler(
    State(state): State<AppState>,
    ValidatedPath(tag_id): ValidatedPath<Uuid>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.article_request() {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match ArticleService::list_by_tag(&state.db, state.listing_policy, tag_id, page).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    ValidatedQuery(search): ValidatedQuery<SearchParams>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    let page = match params.article_request() {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match ArticleService::search(&state.db, state.listing_policy, &search.q, page).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_mine_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> impl IntoResponse {
    if let Err(e) = require_author(identity.principal()) {
        return e.into_response();
    }
    let page = match params.article_request() {
        Ok(page) => page,
        Err(e) => return e.into_response(),
    };
    match ArticleService::list_mine(&state.db, identity.principal(), page).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_article_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(payload): ValidatedJson<ArticleRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_author(identity.principal()) {
        return e.into_response();
    }
    match ArticleService::create(&state.db, identity.principal(), payload).await {
        Ok(res) => ResponseBuilder::created("ARTICLE_CREATED", "Article created", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_article_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ArticleRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_author(identity.principal()) {
        return e.into_response();
    }
    match ArticleService::update(&state.db, identity.principal(), id, payload).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_UPDATED", "Article updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_article_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    if let Err(e) = require_author(identity.principal()) {
        return e.into_response();
    }
    match ArticleService::delete(&state.db, identity.principal(), id).await {
        Ok(_) => ResponseBuilder::done("ARTICLE_DELETED", "Article deleted").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Multipart upload; the image goes in the `file` field.
pub async fn upload_image_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    if let Err(e) = require_author(identity.principal()) {
        return e.into_response();
    }

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return ResponseBuilder::error::<()>(StatusCode::BAD_REQUEST, "UPLOAD_ERR", &e.body_text())
                    .into_response()
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let metadata = BlobMetadata {
            file_name: field.file_name().unwrap_or("upload").to_string(),
            content_type: field.content_type().unwrap_or("application/octet-stream").to_string(),
        };
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                return ResponseBuilder::error::<()>(StatusCode::BAD_REQUEST, "UPLOAD_ERR", &e.body_text())
                    .into_response()
            }
        };

        return match ArticleService::upload_featured_image(
            &state.db,
            state.blob_store.as_ref(),
            identity.principal(),
            id,
            bytes,
            metadata,
        )
        .await
        {
            Ok(res) => ResponseBuilder::success("ARTICLE_IMAGE_UPDATED", "Featured image updated", res).into_response(),
            Err(e) => e.into_response(),
        };
    }

    ResponseBuilder::error::<()>(StatusCode::BAD_REQUEST, "MISSING_FILE", "No file field").into_response()
}
