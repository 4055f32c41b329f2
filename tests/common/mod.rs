#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use pressroom::auth::Principal;
use pressroom::config::{AppState, ListingPolicy, UserDeletePolicy};
use pressroom::entities::user::{self, UserRole};
use pressroom::models::article_model::ArticleRequest;
use pressroom::models::category_model::{CategoryRequest, CategoryView};
use pressroom::models::tag_model::{TagRequest, TagView};
use pressroom::repositories::user_repository::{NewUser, UserRepository};
use pressroom::services::category_service::CategoryService;
use pressroom::services::storage_service::LocalBlobStore;
use pressroom::services::tag_service::TagService;
use pressroom::utils::jwt_utils::JwtUtils;

pub const JWT_SECRET: &str = "integration-test-secret";

pub const BODY: &str = "Go is a statically typed, compiled language designed at Google for simple, reliable software.";

/// Fresh in-memory database with every migration applied.
///
/// One pooled connection, so every test sees the same in-memory file.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

/// File-backed database with a pool of several connections, so transactions can overlap.
pub async fn setup_shared_db(dir: &Path) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.join("pressroom.db").display());
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(4).min_connections(4).sqlx_logging(false);

    let db = Database::connect(opts).await.expect("connect to sqlite file");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub fn test_state(db: DatabaseConnection, uploads: &Path) -> AppState {
    AppState {
        db,
        jwt: JwtUtils::new(JWT_SECRET, 60),
        blob_store: Arc::new(LocalBlobStore::new(uploads)),
        user_delete_policy: UserDeletePolicy::Block,
        listing_policy: ListingPolicy::default(),
    }
}

/// Inserts a user directly; the hash is a placeholder, so these accounts cannot log in.
pub async fn create_user(db: &DatabaseConnection, username: &str, role: UserRole) -> user::Model {
    UserRepository::create(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "unused".to_string(),
            full_name: Some(format!("{} Example", username)),
            bio: None,
            role,
        },
    )
    .await
    .expect("create user")
}

pub fn principal(user: &user::Model) -> Principal {
    Principal { username: user.username.clone(), role: user.role }
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> CategoryView {
    CategoryService::create(db, CategoryRequest { name: name.to_string(), description: None })
        .await
        .expect("create category")
}

pub async fn create_tag(db: &DatabaseConnection, name: &str) -> TagView {
    TagService::create(db, TagRequest { name: name.to_string() })
        .await
        .expect("create tag")
}

pub fn article_request(title: &str, category_id: Uuid, tag_ids: Option<Vec<Uuid>>) -> ArticleRequest {
    ArticleRequest {
        title: title.to_string(),
        content: BODY.to_string(),
        excerpt: None,
        category_id,
        status: None,
        tag_ids,
    }
}
