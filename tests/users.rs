mod common;

use pressroom::config::UserDeletePolicy;
use pressroom::entities::user::UserRole;
use pressroom::entities::{article, comment, user};
use pressroom::errors::ServiceError;
use pressroom::models::comment_model::CommentRequest;
use pressroom::services::article_service::ArticleService;
use pressroom::services::comment_service::CommentService;
use pressroom::services::user_service::UserService;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

use common::*;

async fn seed_content(db: &sea_orm::DatabaseConnection) -> (user::Model, user::Model, user::Model) {
    let alice = create_user(db, "alice", UserRole::Author).await;
    let bob = create_user(db, "bob", UserRole::Reader).await;
    let root = create_user(db, "root", UserRole::Admin).await;
    let tech = create_category(db, "Tech").await;
    let go = create_tag(db, "go").await;

    let article = ArticleService::create(db, Some(&principal(&alice)), article_request("Intro to Go", tech.id, Some(vec![go.id])))
        .await
        .unwrap();
    CommentService::create(db, Some(&principal(&bob)), article.id, CommentRequest { content: "Nice one!".into() })
        .await
        .unwrap();
    CommentService::create(db, Some(&principal(&alice)), article.id, CommentRequest { content: "Thank you".into() })
        .await
        .unwrap();

    (alice, bob, root)
}

#[tokio::test]
async fn block_policy_refuses_users_with_content() {
    let db = setup_db().await;
    let (alice, bob, root) = seed_content(&db).await;

    for target in [&alice, &bob] {
        let err = UserService::delete_user(&db, Some(&principal(&root)), target.public_id, UserDeletePolicy::Block)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { code: "USER_HAS_CONTENT", .. }));
    }
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 3);

    let carol = create_user(&db, "carol", UserRole::Reader).await;
    UserService::delete_user(&db, Some(&principal(&root)), carol.public_id, UserDeletePolicy::Block)
        .await
        .unwrap();
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 3);
}

#[tokio::test]
async fn cascade_policy_removes_everything_the_user_owns() {
    let db = setup_db().await;
    let (alice, bob, root) = seed_content(&db).await;

    UserService::delete_user(&db, Some(&principal(&root)), bob.public_id, UserDeletePolicy::Cascade)
        .await
        .unwrap();
    assert_eq!(comment::Entity::find().count(&db).await.unwrap(), 1, "only bob's comment goes");
    assert_eq!(article::Entity::find().count(&db).await.unwrap(), 1);

    UserService::delete_user(&db, Some(&principal(&root)), alice.public_id, UserDeletePolicy::Cascade)
        .await
        .unwrap();
    assert_eq!(article::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(comment::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn only_admins_delete_users() {
    let db = setup_db().await;
    let (alice, bob, root) = seed_content(&db).await;

    let err = UserService::delete_user(&db, Some(&principal(&alice)), bob.public_id, UserDeletePolicy::Cascade)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let err = UserService::delete_user(&db, None, bob.public_id, UserDeletePolicy::Cascade)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated { .. }));

    let err = UserService::delete_user(&db, Some(&principal(&root)), Uuid::now_v7(), UserDeletePolicy::Cascade)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { code: "USER_NOT_FOUND", .. }));
}
