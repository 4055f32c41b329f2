use std::future::Future;
use std::pin::Pin;

use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{ensure_article_owner, require_principal, Principal};
use crate::config::ListingPolicy;
use crate::entities::article::{ArticleStatus, Entity as Article};
use crate::entities::{article, article_tag, category, comment, tag, user};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::article_model::*;
use crate::models::page_model::{ArticlePageRequest, ArticleSort, Page};
use crate::repositories::user_repository::UserRepository;
use crate::services::storage_service::{BlobMetadata, BlobStore};
use crate::utils::slug_utils::resolve_unique_slug;

const SLUG_CONFLICT: &str = "SLUG_CONFLICT";

/// Whole-transaction attempts for a create that loses a slug race.
const SLUG_CREATE_ATTEMPTS: u32 = 3;

type SlugLookup<'c> = Pin<Box<dyn Future<Output = Result<bool, DbErr>> + Send + 'c>>;

/// Answers whether a slug candidate is already stored, as seen from the create transaction.
type SlugProbe = for<'c> fn(&'c DatabaseTransaction, String) -> SlugLookup<'c>;

pub struct ArticleService;

impl ArticleService {
    pub async fn list_published(
        db: &DatabaseConnection,
        page: ArticlePageRequest,
    ) -> ServiceResult<Page<ArticleView>> {
        let query = Article::find().filter(article::Column::Status.eq(ArticleStatus::Published));
        Self::fetch_page(db, query, page).await
    }

    /// Reads an article and counts the view in the same transaction.
    pub async fn get_by_slug(db: &DatabaseConnection, slug: &str) -> ServiceResult<ArticleView> {
        let txn = db.begin().await?;

        let bumped = Article::update_many()
            .col_expr(
                article::Column::ViewCount,
                Expr::col(article::Column::ViewCount).add(1),
            )
            .filter(article::Column::Slug.eq(slug))
            .exec(&txn)
            .await?;

        if bumped.rows_affected == 0 {
            return Err(Self::article_not_found());
        }

        let (article, author) = Article::find()
            .filter(article::Column::Slug.eq(slug))
            .find_also_related(user::Entity)
            .one(&txn)
            .await?
            .ok_or_else(Self::article_not_found)?;
        let author = Self::require_author_row(&article, author)?;

        let view = Self::project(&txn, article, author).await?;
        txn.commit().await?;

        Ok(view)
    }

    pub async fn list_by_category(
        db: &DatabaseConnection,
        policy: ListingPolicy,
        category_id: Uuid,
        page: ArticlePageRequest,
    ) -> ServiceResult<Page<ArticleView>> {
        let category = Self::resolve_category(db, category_id).await?;
        let query = Self::public_listing(policy)
            .filter(article::Column::CategoryId.eq(category.id));
        Self::fetch_page(db, query, page).await
    }

    pub async fn list_by_tag(
        db: &DatabaseConnection,
        policy: ListingPolicy,
        tag_id: Uuid,
        page: ArticlePageRequest,
    ) -> ServiceResult<Page<ArticleView>> {
        let tag = tag::Entity::find()
            .filter(tag::Column::PublicId.eq(tag_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("TAG_NOT_FOUND", "Tag not found"))?;

        let tagged = Query::select()
            .column(article_tag::Column::ArticleId)
            .from(article_tag::Entity)
            .and_where(article_tag::Column::TagId.eq(tag.id))
            .to_owned();

        let query = Self::public_listing(policy).filter(article::Column::Id.in_subquery(tagged));
        Self::fetch_page(db, query, page).await
    }

    /// Case-insensitive substring match on title OR content.
    pub async fn search(
        db: &DatabaseConnection,
        policy: ListingPolicy,
        text: &str,
        page: ArticlePageRequest,
    ) -> ServiceResult<Page<ArticleView>> {
        let pattern = format!("%{}%", Self::escape_like(&text.trim().to_lowercase()));

        let matches_column = |column: article::Column| {
            Expr::expr(Func::lower(Expr::col((article::Entity, column))))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };

        let query = Self::public_listing(policy).filter(
            Condition::any()
                .add(matches_column(article::Column::Title))
                .add(matches_column(article::Column::Content)),
        );
        Self::fetch_page(db, query, page).await
    }

    /// The caller's own articles in every status.
    pub async fn list_mine(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        page: ArticlePageRequest,
    ) -> ServiceResult<Page<ArticleView>> {
        let principal = require_principal(identity)?;
        let author = Self::resolve_user(db, principal).await?;

        let query = Article::find().filter(article::Column::AuthorId.eq(author.id));
        Self::fetch_page(db, query, page).await
    }

    pub async fn create(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        payload: ArticleRequest,
    ) -> ServiceResult<ArticleView> {
        Self::create_with(db, identity, payload, Self::stored_slug).await
    }

    async fn create_with(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        payload: ArticleRequest,
        slug_taken: SlugProbe,
    ) -> ServiceResult<ArticleView> {
        let principal = require_principal(identity)?;
        let status = Self::parse_status(payload.status.as_deref())?.unwrap_or(ArticleStatus::Draft);

        let mut attempt = 1;
        loop {
            match Self::insert_article(db, principal, &payload, status, slug_taken).await {
                Err(ServiceError::Conflict { code: SLUG_CONFLICT, .. }) if attempt < SLUG_CREATE_ATTEMPTS => {
                    tracing::warn!("Slug race on \"{}\" (attempt {}), retrying", payload.title, attempt);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    pub async fn update(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        article_id: Uuid,
        payload: ArticleRequest,
    ) -> ServiceResult<ArticleView> {
        let txn = db.begin().await?;

        let (article, author) = Self::find_with_author(&txn, article_id).await?;
        ensure_article_owner(identity, &author.username)?;

        let status = Self::parse_status(payload.status.as_deref())?;
        let category = Self::resolve_category(&txn, payload.category_id).await?;

        let mut active: article::ActiveModel = article.into();
        active.title = Set(payload.title);
        active.content = Set(payload.content);
        active.excerpt = Set(payload.excerpt);
        active.category_id = Set(Some(category.id));
        if let Some(status) = status {
            active.status = Set(status);
        }

        let updated = active.update(&txn).await?;

        if let Some(tag_ids) = payload.tag_ids.as_deref() {
            let tags = Self::resolve_tags(&txn, tag_ids).await?;
            article_tag::Entity::delete_many()
                .filter(article_tag::Column::ArticleId.eq(updated.id))
                .exec(&txn)
                .await?;
            Self::link_tags(&txn, updated.id, &tags).await?;
        }

        let view = Self::project(&txn, updated, author).await?;
        txn.commit().await?;

        tracing::info!("Article {} updated", view.id);
        Ok(view)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        article_id: Uuid,
    ) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let (article, author) = Self::find_with_author(&txn, article_id).await?;
        ensure_article_owner(identity, &author.username)?;

        Self::purge(&txn, article.id).await?;
        txn.commit().await?;

        tracing::info!("Article {} deleted", article.public_id);
        Ok(())
    }

    /// Records a blob handle on the article. No storage I/O happens here.
    pub async fn update_featured_image(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        article_id: Uuid,
        handle: String,
    ) -> ServiceResult<ArticleView> {
        let txn = db.begin().await?;

        let (article, author) = Self::find_with_author(&txn, article_id).await?;
        ensure_article_owner(identity, &author.username)?;

        let mut active: article::ActiveModel = article.into();
        active.featured_image = Set(Some(handle));
        let updated = active.update(&txn).await?;

        let view = Self::project(&txn, updated, author).await?;
        txn.commit().await?;

        Ok(view)
    }

    /// Ownership is checked before any bytes reach the store.
    pub async fn upload_featured_image(
        db: &DatabaseConnection,
        store: &dyn BlobStore,
        identity: Option<&Principal>,
        article_id: Uuid,
        bytes: Vec<u8>,
        metadata: BlobMetadata,
    ) -> ServiceResult<ArticleView> {
        let (_, author) = Self::find_with_author(db, article_id).await?;
        ensure_article_owner(identity, &author.username)?;

        let handle = store.store(bytes, metadata).await?;
        Self::update_featured_image(db, identity, article_id, handle).await
    }

    /// Removes an article with its comments and tag links. Caller owns the transaction.
    pub(crate) async fn purge<C: ConnectionTrait>(conn: &C, article_id: i64) -> Result<(), DbErr> {
        comment::Entity::delete_many()
            .filter(comment::Column::ArticleId.eq(article_id))
            .exec(conn)
            .await?;
        article_tag::Entity::delete_many()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .exec(conn)
            .await?;
        Article::delete_by_id(article_id).exec(conn).await?;
        Ok(())
    }

    // --- Helpers ---

    async fn insert_article(
        db: &DatabaseConnection,
        principal: &Principal,
        payload: &ArticleRequest,
        status: ArticleStatus,
        slug_taken: SlugProbe,
    ) -> ServiceResult<ArticleView> {
        let txn = db.begin().await?;

        let author = Self::resolve_user(&txn, principal).await?;
        let category = Self::resolve_category(&txn, payload.category_id).await?;
        let tags = Self::resolve_tags(&txn, payload.tag_ids.as_deref().unwrap_or_default()).await?;

        let conn = &txn;
        let slug = resolve_unique_slug(&payload.title, move |candidate| slug_taken(conn, candidate)).await?;

        let saved = article::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            title: Set(payload.title.clone()),
            slug: Set(slug.clone()),
            content: Set(payload.content.clone()),
            excerpt: Set(payload.excerpt.clone()),
            featured_image: Set(None),
            status: Set(status),
            view_count: Set(0),
            author_id: Set(author.id),
            category_id: Set(Some(category.id)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if ServiceError::is_unique_violation(&e) {
                ServiceError::conflict(SLUG_CONFLICT, format!("Slug '{}' was taken concurrently", slug))
            } else {
                e.into()
            }
        })?;

        Self::link_tags(&txn, saved.id, &tags).await?;

        let view = Self::project(&txn, saved, author).await?;
        txn.commit().await?;

        tracing::info!("Article {} created with slug {}", view.id, view.slug);
        Ok(view)
    }

    fn stored_slug(conn: &DatabaseTransaction, slug: String) -> SlugLookup<'_> {
        Box::pin(async move {
            let count = Article::find()
                .filter(article::Column::Slug.eq(slug))
                .count(conn)
                .await?;
            Ok(count > 0)
        })
    }

    fn public_listing(policy: ListingPolicy) -> Select<article::Entity> {
        if policy.published_only {
            Article::find().filter(article::Column::Status.eq(ArticleStatus::Published))
        } else {
            Article::find()
        }
    }

    async fn fetch_page<C: ConnectionTrait>(
        conn: &C,
        query: Select<article::Entity>,
        page: ArticlePageRequest,
    ) -> ServiceResult<Page<ArticleView>> {
        let column = match page.sort {
            ArticleSort::CreatedAt => article::Column::CreatedAt,
            ArticleSort::UpdatedAt => article::Column::UpdatedAt,
            ArticleSort::Title => article::Column::Title,
            ArticleSort::ViewCount => article::Column::ViewCount,
        };
        let order = if page.descending { Order::Desc } else { Order::Asc };

        let paginator = query
            .order_by(column, order.clone())
            .order_by(article::Column::Id, order)
            .find_also_related(user::Entity)
            .paginate(conn, page.window.size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.window.page).await?;

        let mut data = Vec::with_capacity(rows.len());
        for (article, author) in rows {
            let author = Self::require_author_row(&article, author)?;
            data.push(Self::project(conn, article, author).await?);
        }

        Ok(Page::new(data, page.window, total))
    }

    /// Builds the one-level view: author, category, tags and a live comment count.
    async fn project<C: ConnectionTrait>(
        conn: &C,
        article: article::Model,
        author: user::Model,
    ) -> ServiceResult<ArticleView> {
        let category = match article.category_id {
            Some(id) => category::Entity::find_by_id(id).one(conn).await?,
            None => None,
        };

        let tags = article
            .find_related(tag::Entity)
            .order_by_asc(tag::Column::Name)
            .all(conn)
            .await?;

        let comment_count = comment::Entity::find()
            .filter(comment::Column::ArticleId.eq(article.id))
            .count(conn)
            .await?;

        Ok(ArticleView {
            id: article.public_id,
            title: article.title,
            slug: article.slug,
            content: article.content,
            excerpt: article.excerpt,
            featured_image: article.featured_image,
            status: article.status,
            view_count: article.view_count,
            author: AuthorSummary {
                id: author.public_id,
                username: author.username,
                full_name: author.full_name,
            },
            category: category.map(|c| CategorySummary {
                id: c.public_id,
                name: c.name,
                slug: c.slug,
            }),
            tags: tags
                .into_iter()
                .map(|t| TagSummary { id: t.public_id, name: t.name, slug: t.slug })
                .collect(),
            comment_count,
            created_at: article.created_at,
            updated_at: article.updated_at,
        })
    }

    async fn find_with_author<C: ConnectionTrait>(
        conn: &C,
        article_id: Uuid,
    ) -> ServiceResult<(article::Model, user::Model)> {
        let (article, author) = Article::find()
            .filter(article::Column::PublicId.eq(article_id))
            .find_also_related(user::Entity)
            .one(conn)
            .await?
            .ok_or_else(Self::article_not_found)?;
        let author = Self::require_author_row(&article, author)?;
        Ok((article, author))
    }

    async fn resolve_user<C: ConnectionTrait>(conn: &C, principal: &Principal) -> ServiceResult<user::Model> {
        UserRepository::find_by_username(conn, &principal.username)
            .await?
            .ok_or_else(|| ServiceError::not_found("USER_NOT_FOUND", "User not found"))
    }

    async fn resolve_category<C: ConnectionTrait>(conn: &C, category_id: Uuid) -> ServiceResult<category::Model> {
        category::Entity::find()
            .filter(category::Column::PublicId.eq(category_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("CATEGORY_NOT_FOUND", "Category not found"))
    }

    /// All-or-nothing: one unknown id fails the whole set.
    async fn resolve_tags<C: ConnectionTrait>(conn: &C, tag_ids: &[Uuid]) -> ServiceResult<Vec<tag::Model>> {
        let mut wanted: Vec<Uuid> = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !wanted.contains(id) {
                wanted.push(*id);
            }
        }
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let found = tag::Entity::find()
            .filter(tag::Column::PublicId.is_in(wanted.clone()))
            .all(conn)
            .await?;

        if let Some(missing) = wanted.iter().find(|id| !found.iter().any(|t| t.public_id == **id)) {
            return Err(ServiceError::not_found(
                "TAG_NOT_FOUND",
                format!("Tag with ID {} not found", missing),
            ));
        }
        Ok(found)
    }

    async fn link_tags<C: ConnectionTrait>(conn: &C, article_id: i64, tags: &[tag::Model]) -> Result<(), DbErr> {
        if tags.is_empty() {
            return Ok(());
        }
        let links = tags.iter().map(|t| article_tag::ActiveModel {
            article_id: Set(article_id),
            tag_id: Set(t.id),
        });
        article_tag::Entity::insert_many(links)
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    fn parse_status(raw: Option<&str>) -> ServiceResult<Option<ArticleStatus>> {
        raw.map(|s| {
            s.parse::<ArticleStatus>().map_err(|e| {
                ServiceError::bad_request(
                    "INVALID_STATUS",
                    format!("Unknown status '{}'; expected DRAFT, PUBLISHED or ARCHIVED", e.0),
                )
            })
        })
        .transpose()
    }

    fn escape_like(raw: &str) -> String {
        let mut escaped = String::with_capacity(raw.len());
        for c in raw.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    fn require_author_row(article: &article::Model, author: Option<user::Model>) -> ServiceResult<user::Model> {
        author.ok_or_else(|| {
            tracing::error!("Article {} has no author row", article.public_id);
            ServiceError::Internal("article has no author".to_string())
        })
    }

    fn article_not_found() -> ServiceError {
        ServiceError::not_found("ARTICLE_NOT_FOUND", "Article not found")
    }
}
