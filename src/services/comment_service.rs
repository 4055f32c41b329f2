use sea_orm::*;
use uuid::Uuid;

use crate::auth::{ensure_comment_owner, require_principal, Principal};
use crate::entities::{article, comment, comment::Entity as Comment, user};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::article_model::AuthorSummary;
use crate::models::comment_model::{CommentRequest, CommentView};
use crate::models::page_model::{Page, PageRequest};
use crate::repositories::user_repository::UserRepository;

pub struct CommentService;

impl CommentService {
    /// Oldest first, so a thread reads top to bottom.
    pub async fn list_by_article(
        db: &DatabaseConnection,
        article_id: Uuid,
        page: PageRequest,
    ) -> ServiceResult<Page<CommentView>> {
        let article = Self::find_article(db, article_id).await?;

        let paginator = Comment::find()
            .filter(comment::Column::ArticleId.eq(article.id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .find_also_related(user::Entity)
            .paginate(db, page.size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page).await?;

        let data = rows
            .into_iter()
            .map(|(comment, author)| Self::project_with(comment, author))
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Page::new(data, page, total))
    }

    pub async fn create(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        article_id: Uuid,
        payload: CommentRequest,
    ) -> ServiceResult<CommentView> {
        let principal = require_principal(identity)?;
        let txn = db.begin().await?;

        let author = UserRepository::find_by_username(&txn, &principal.username)
            .await?
            .ok_or_else(|| ServiceError::not_found("USER_NOT_FOUND", "User not found"))?;
        let article = Self::find_article(&txn, article_id).await?;

        let saved = comment::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            content: Set(payload.content),
            article_id: Set(article.id),
            user_id: Set(author.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!("Comment {} added to article {} by {}", saved.public_id, article.public_id, author.username);
        Ok(Self::project(saved, author))
    }

    pub async fn update(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        comment_id: Uuid,
        payload: CommentRequest,
    ) -> ServiceResult<CommentView> {
        let txn = db.begin().await?;

        let (comment, author) = Self::find_with_author(&txn, comment_id).await?;
        ensure_comment_owner(identity, &author.username)?;

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(payload.content);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(Self::project(updated, author))
    }

    pub async fn delete(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        comment_id: Uuid,
    ) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let (comment, author) = Self::find_with_author(&txn, comment_id).await?;
        ensure_comment_owner(identity, &author.username)?;

        Comment::delete_by_id(comment.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Comment {} deleted", comment.public_id);
        Ok(())
    }

    // --- Helpers ---

    async fn find_article<C: ConnectionTrait>(conn: &C, article_id: Uuid) -> ServiceResult<article::Model> {
        article::Entity::find()
            .filter(article::Column::PublicId.eq(article_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("ARTICLE_NOT_FOUND", "Article not found"))
    }

    async fn find_with_author<C: ConnectionTrait>(
        conn: &C,
        comment_id: Uuid,
    ) -> ServiceResult<(comment::Model, user::Model)> {
        let (comment, author) = Comment::find()
            .filter(comment::Column::PublicId.eq(comment_id))
            .find_also_related(user::Entity)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("COMMENT_NOT_FOUND", "Comment not found"))?;

        let author = author.ok_or_else(|| {
            tracing::error!("Comment {} has no author row", comment.public_id);
            ServiceError::Internal("comment has no author".to_string())
        })?;
        Ok((comment, author))
    }

    fn project_with(comment: comment::Model, author: Option<user::Model>) -> ServiceResult<CommentView> {
        match author {
            Some(author) => Ok(Self::project(comment, author)),
            None => {
                tracing::error!("Comment {} has no author row", comment.public_id);
                Err(ServiceError::Internal("comment has no author".to_string()))
            }
        }
    }

    fn project(comment: comment::Model, author: user::Model) -> CommentView {
        CommentView {
            id: comment.public_id,
            content: comment.content,
            user: AuthorSummary {
                id: author.public_id,
                username: author.username,
                full_name: author.full_name,
            },
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
