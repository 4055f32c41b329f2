mod common;

use pressroom::config::ListingPolicy;
use pressroom::entities::article::ArticleStatus;
use pressroom::entities::user::UserRole;
use pressroom::entities::{article_tag, comment};
use pressroom::errors::ServiceError;
use pressroom::models::comment_model::CommentRequest;
use pressroom::models::page_model::{ArticlePageRequest, ArticleSort, PageRequest};
use pressroom::services::article_service::ArticleService;
use pressroom::services::category_service::CategoryService;
use pressroom::services::comment_service::CommentService;
use pressroom::services::storage_service::{BlobMetadata, LocalBlobStore};
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

use common::*;

fn first_page() -> ArticlePageRequest {
    ArticlePageRequest::default()
}

#[tokio::test]
async fn publish_read_and_comment_flow() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let bob = create_user(&db, "bob", UserRole::Reader).await;
    let tech = create_category(&db, "Tech").await;
    let go = create_tag(&db, "go").await;

    let created = ArticleService::create(
        &db,
        Some(&principal(&alice)),
        article_request("Intro to Go", tech.id, Some(vec![go.id])),
    )
    .await
    .unwrap();

    assert_eq!(created.slug, "intro-to-go");
    assert_eq!(created.status, ArticleStatus::Draft);
    assert_eq!(created.view_count, 0);
    assert_eq!(created.author.username, "alice");
    assert_eq!(created.category.as_ref().map(|c| c.slug.as_str()), Some("tech"));
    assert_eq!(created.tags.len(), 1);
    assert_eq!(created.tags[0].slug, "go");

    let listed = ArticleService::list_published(&db, first_page()).await.unwrap();
    assert_eq!(listed.meta.total, 0);

    let mut publish = article_request("Intro to Go", tech.id, None);
    publish.status = Some("published".to_string());
    let published = ArticleService::update(&db, Some(&principal(&alice)), created.id, publish)
        .await
        .unwrap();
    assert_eq!(published.status, ArticleStatus::Published);
    assert_eq!(published.slug, "intro-to-go");
    assert_eq!(published.tags.len(), 1, "absent tag_ids keeps the tags");

    let listed = ArticleService::list_published(&db, first_page()).await.unwrap();
    assert_eq!(listed.meta.total, 1);
    assert_eq!(listed.data[0].id, created.id);

    let viewed = ArticleService::get_by_slug(&db, "intro-to-go").await.unwrap();
    assert_eq!(viewed.view_count, 1);
    assert_eq!(viewed.comment_count, 0);

    CommentService::create(
        &db,
        Some(&principal(&bob)),
        created.id,
        CommentRequest { content: "Great intro, thanks!".to_string() },
    )
    .await
    .unwrap();

    let viewed = ArticleService::get_by_slug(&db, "intro-to-go").await.unwrap();
    assert_eq!(viewed.view_count, 2);
    assert_eq!(viewed.comment_count, 1);
}

#[tokio::test]
async fn colliding_titles_get_numbered_slugs() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;
    let who = principal(&alice);

    let first = ArticleService::create(&db, Some(&who), article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();
    let second = ArticleService::create(&db, Some(&who), article_request("intro to GO!", tech.id, None))
        .await
        .unwrap();
    let third = ArticleService::create(&db, Some(&who), article_request("Intro  to  Go", tech.id, None))
        .await
        .unwrap();

    assert_eq!(first.slug, "intro-to-go");
    assert_eq!(second.slug, "intro-to-go-1");
    assert_eq!(third.slug, "intro-to-go-2");
}

#[tokio::test]
async fn symbol_only_titles_fall_back_to_untitled() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;
    let who = principal(&alice);

    let first = ArticleService::create(&db, Some(&who), article_request("!!! ???", tech.id, None))
        .await
        .unwrap();
    let second = ArticleService::create(&db, Some(&who), article_request("*** ###", tech.id, None))
        .await
        .unwrap();

    assert_eq!(first.slug, "untitled-1");
    assert_eq!(second.slug, "untitled-2");
}

#[tokio::test]
async fn create_requires_known_category_and_tags() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;
    let go = create_tag(&db, "go").await;
    let who = principal(&alice);

    let err = ArticleService::create(&db, Some(&who), article_request("Intro to Go", Uuid::now_v7(), None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CATEGORY_NOT_FOUND");

    let err = ArticleService::create(
        &db,
        Some(&who),
        article_request("Intro to Go", tech.id, Some(vec![go.id, Uuid::now_v7()])),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "TAG_NOT_FOUND");

    let mine = ArticleService::list_mine(&db, Some(&who), first_page()).await.unwrap();
    assert_eq!(mine.meta.total, 0, "failed creates leave nothing behind");

    let err = ArticleService::create(&db, None, article_request("Intro to Go", tech.id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated { .. }));
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;

    let mut payload = article_request("Intro to Go", tech.id, None);
    payload.status = Some("LIVE".to_string());

    let err = ArticleService::create(&db, Some(&principal(&alice)), payload).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest { code: "INVALID_STATUS", .. }));
}

#[tokio::test]
async fn ownership_matrix_for_update_and_delete() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let mallory = create_user(&db, "mallory", UserRole::Author).await;
    let root = create_user(&db, "root", UserRole::Admin).await;
    let tech = create_category(&db, "Tech").await;

    let article = ArticleService::create(&db, Some(&principal(&alice)), article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();

    let err = ArticleService::update(&db, None, article.id, article_request("Changed title", tech.id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated { .. }));

    let err = ArticleService::update(
        &db,
        Some(&principal(&mallory)),
        article.id,
        article_request("Hijacked title", tech.id, None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let by_admin = ArticleService::update(
        &db,
        Some(&principal(&root)),
        article.id,
        article_request("Moderated title", tech.id, None),
    )
    .await
    .unwrap();
    assert_eq!(by_admin.title, "Moderated title");
    assert_eq!(by_admin.author.username, "alice", "admins edit without taking ownership");

    let err = ArticleService::delete(&db, Some(&principal(&mallory)), article.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    ArticleService::delete(&db, Some(&principal(&alice)), article.id).await.unwrap();

    let err = ArticleService::delete(&db, Some(&principal(&alice)), article.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { code: "ARTICLE_NOT_FOUND", .. }));
}

#[tokio::test]
async fn tag_ids_replace_or_preserve() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let who = principal(&alice);
    let tech = create_category(&db, "Tech").await;
    let go = create_tag(&db, "go").await;
    let rust = create_tag(&db, "rust").await;
    let web = create_tag(&db, "web").await;

    let article = ArticleService::create(
        &db,
        Some(&who),
        article_request("Intro to Go", tech.id, Some(vec![go.id, web.id])),
    )
    .await
    .unwrap();
    assert_eq!(article.tags.len(), 2);

    let kept = ArticleService::update(&db, Some(&who), article.id, article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();
    let names: Vec<_> = kept.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["go", "web"]);

    let replaced = ArticleService::update(
        &db,
        Some(&who),
        article.id,
        article_request("Intro to Go", tech.id, Some(vec![rust.id, rust.id])),
    )
    .await
    .unwrap();
    let names: Vec<_> = replaced.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["rust"]);

    let cleared = ArticleService::update(
        &db,
        Some(&who),
        article.id,
        article_request("Intro to Go", tech.id, Some(vec![])),
    )
    .await
    .unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test]
async fn deleting_an_article_removes_comments_and_links() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let bob = create_user(&db, "bob", UserRole::Reader).await;
    let tech = create_category(&db, "Tech").await;
    let go = create_tag(&db, "go").await;

    let article = ArticleService::create(
        &db,
        Some(&principal(&alice)),
        article_request("Intro to Go", tech.id, Some(vec![go.id])),
    )
    .await
    .unwrap();

    for n in 0..3 {
        CommentService::create(
            &db,
            Some(&principal(&bob)),
            article.id,
            CommentRequest { content: format!("Comment number {}", n) },
        )
        .await
        .unwrap();
    }

    ArticleService::delete(&db, Some(&principal(&alice)), article.id).await.unwrap();

    let err = CommentService::list_by_article(&db, article.id, PageRequest::new(0, 20))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { code: "ARTICLE_NOT_FOUND", .. }));

    assert_eq!(comment::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(article_tag::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_count_every_view() {
    let dir = tempfile::tempdir().unwrap();
    let db = setup_shared_db(dir.path()).await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;
    ArticleService::create(&db, Some(&principal(&alice)), article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();

    let readers = 20;
    let handles: Vec<_> = (0..readers)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move { ArticleService::get_by_slug(&db, "intro-to-go").await })
        })
        .collect();

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap().unwrap().view_count);
    }
    seen.sort_unstable();
    assert_eq!(seen, (1..=readers).collect::<Vec<i64>>(), "each read sees a distinct count");

    let mine = ArticleService::list_mine(&db, Some(&principal(&alice)), first_page()).await.unwrap();
    assert_eq!(mine.data[0].view_count, readers);
}

#[tokio::test]
async fn missing_slug_is_not_found() {
    let db = setup_db().await;
    let err = ArticleService::get_by_slug(&db, "nope").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { code: "ARTICLE_NOT_FOUND", .. }));
}

#[tokio::test]
async fn search_matches_title_or_content_ignoring_case() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let who = principal(&alice);
    let tech = create_category(&db, "Tech").await;

    ArticleService::create(&db, Some(&who), article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();

    let mut sale = article_request("Spring sale notes", tech.id, None);
    sale.content = "Everything is 100% off for members during the spring event this year.".to_string();
    ArticleService::create(&db, Some(&who), sale).await.unwrap();

    let policy = ListingPolicy::default();

    let by_title = ArticleService::search(&db, policy, "INTRO", first_page()).await.unwrap();
    assert_eq!(by_title.meta.total, 1);
    assert_eq!(by_title.data[0].slug, "intro-to-go");

    let by_content = ArticleService::search(&db, policy, "google", first_page()).await.unwrap();
    assert_eq!(by_content.meta.total, 1);

    let literal_percent = ArticleService::search(&db, policy, "100%", first_page()).await.unwrap();
    assert_eq!(literal_percent.meta.total, 1);
    assert_eq!(literal_percent.data[0].slug, "spring-sale-notes");

    let wildcard = ArticleService::search(&db, policy, "%", first_page()).await.unwrap();
    assert_eq!(wildcard.meta.total, 1, "% is matched literally");

    let none = ArticleService::search(&db, policy, "haskell", first_page()).await.unwrap();
    assert_eq!(none.meta.total, 0);
}

#[tokio::test]
async fn listing_policy_controls_drafts_on_public_listings() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let who = principal(&alice);
    let tech = create_category(&db, "Tech").await;
    let go = create_tag(&db, "go").await;

    ArticleService::create(&db, Some(&who), article_request("Draft about Go", tech.id, Some(vec![go.id])))
        .await
        .unwrap();

    let open = ListingPolicy { published_only: false };
    let strict = ListingPolicy { published_only: true };

    assert_eq!(ArticleService::search(&db, open, "go", first_page()).await.unwrap().meta.total, 1);
    assert_eq!(ArticleService::search(&db, strict, "go", first_page()).await.unwrap().meta.total, 0);

    let by_cat = ArticleService::list_by_category(&db, open, tech.id, first_page()).await.unwrap();
    assert_eq!(by_cat.meta.total, 1);
    let by_cat = ArticleService::list_by_category(&db, strict, tech.id, first_page()).await.unwrap();
    assert_eq!(by_cat.meta.total, 0);

    let by_tag = ArticleService::list_by_tag(&db, open, go.id, first_page()).await.unwrap();
    assert_eq!(by_tag.meta.total, 1);
    let by_tag = ArticleService::list_by_tag(&db, strict, go.id, first_page()).await.unwrap();
    assert_eq!(by_tag.meta.total, 0);
}

#[tokio::test]
async fn unknown_category_or_tag_listing_is_not_found() {
    let db = setup_db().await;
    let policy = ListingPolicy::default();

    let err = ArticleService::list_by_category(&db, policy, Uuid::now_v7(), first_page())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CATEGORY_NOT_FOUND");

    let err = ArticleService::list_by_tag(&db, policy, Uuid::now_v7(), first_page())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TAG_NOT_FOUND");
}

#[tokio::test]
async fn list_mine_shows_every_status_and_only_mine() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let bob = create_user(&db, "bob", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;

    let mut archived = article_request("Old news about Go", tech.id, None);
    archived.status = Some("ARCHIVED".to_string());
    ArticleService::create(&db, Some(&principal(&alice)), archived).await.unwrap();
    ArticleService::create(&db, Some(&principal(&alice)), article_request("Fresh draft here", tech.id, None))
        .await
        .unwrap();
    ArticleService::create(&db, Some(&principal(&bob)), article_request("Bob writes too", tech.id, None))
        .await
        .unwrap();

    let mine = ArticleService::list_mine(&db, Some(&principal(&alice)), first_page()).await.unwrap();
    assert_eq!(mine.meta.total, 2);
    assert!(mine.data.iter().all(|a| a.author.username == "alice"));

    let err = ArticleService::list_mine(&db, None, first_page()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated { .. }));
}

#[tokio::test]
async fn pages_are_zero_based_and_sortable() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let who = principal(&alice);
    let tech = create_category(&db, "Tech").await;

    for title in ["Charlie article", "Alpha article", "Bravo article"] {
        let mut payload = article_request(title, tech.id, None);
        payload.status = Some("PUBLISHED".to_string());
        ArticleService::create(&db, Some(&who), payload).await.unwrap();
    }

    let page = ArticlePageRequest {
        window: PageRequest::new(0, 2),
        sort: ArticleSort::Title,
        descending: false,
    };
    let first = ArticleService::list_published(&db, page).await.unwrap();
    assert_eq!(first.meta.total, 3);
    assert_eq!(first.meta.total_pages, 2);
    let titles: Vec<_> = first.data.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha article", "Bravo article"]);

    let second = ArticleService::list_published(
        &db,
        ArticlePageRequest { window: PageRequest::new(1, 2), ..page },
    )
    .await
    .unwrap();
    assert_eq!(second.data.len(), 1);
    assert_eq!(second.data[0].title, "Charlie article");

    let oldest_first = ArticleService::list_published(&db, first_page()).await.unwrap();
    let titles: Vec<_> = oldest_first.data.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Charlie article", "Alpha article", "Bravo article"]);

    let newest_first = ArticleService::list_published(
        &db,
        ArticlePageRequest { descending: true, ..first_page() },
    )
    .await
    .unwrap();
    let titles: Vec<_> = newest_first.data.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Bravo article", "Alpha article", "Charlie article"]);
}

#[tokio::test]
async fn far_page_index_is_empty_not_a_crash() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;
    let mut payload = article_request("Intro to Go", tech.id, None);
    payload.status = Some("PUBLISHED".to_string());
    ArticleService::create(&db, Some(&principal(&alice)), payload).await.unwrap();

    let far = ArticleService::list_published(&db, ArticlePageRequest::new(u64::MAX / 2, 10))
        .await
        .unwrap();
    assert_eq!(far.meta.total, 1);
    assert!(far.data.is_empty());
}

#[tokio::test]
async fn featured_image_is_stored_then_recorded() {
    let db = setup_db().await;
    let uploads = tempfile::tempdir().unwrap();
    let store = LocalBlobStore::new(uploads.path());
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let bob = create_user(&db, "bob", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;

    let article = ArticleService::create(&db, Some(&principal(&alice)), article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();

    let meta = || BlobMetadata { file_name: "cover.png".to_string(), content_type: "image/png".to_string() };

    let err = ArticleService::upload_featured_image(&db, &store, Some(&principal(&bob)), article.id, vec![1, 2], meta())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0, "nothing stored for non-owners");

    let updated = ArticleService::upload_featured_image(
        &db,
        &store,
        Some(&principal(&alice)),
        article.id,
        vec![1, 2],
        meta(),
    )
    .await
    .unwrap();
    let handle = updated.featured_image.expect("image handle");
    assert!(uploads.path().join(&handle).exists());

    let replaced = ArticleService::update_featured_image(&db, Some(&principal(&alice)), article.id, "other.png".into())
        .await
        .unwrap();
    assert_eq!(replaced.featured_image.as_deref(), Some("other.png"));
}

#[tokio::test]
async fn deleting_a_category_detaches_its_articles() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Author).await;
    let tech = create_category(&db, "Tech").await;

    let article = ArticleService::create(&db, Some(&principal(&alice)), article_request("Intro to Go", tech.id, None))
        .await
        .unwrap();

    CategoryService::delete(&db, tech.id).await.unwrap();

    let mine = ArticleService::list_mine(&db, Some(&principal(&alice)), first_page()).await.unwrap();
    assert_eq!(mine.data[0].id, article.id);
    assert!(mine.data[0].category.is_none());
    assert!(mine.data[0].updated_at > article.updated_at, "detaching counts as a mutation");
}
