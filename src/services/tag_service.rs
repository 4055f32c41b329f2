use sea_orm::*;
use uuid::Uuid;

use crate::entities::{article_tag, tag, tag::Entity as Tag};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::page_model::{Page, PageRequest};
use crate::models::tag_model::{TagRequest, TagView};
use crate::utils::slug_utils::generate_slug;

pub struct TagService;

impl TagService {
    pub async fn list(db: &DatabaseConnection, page: PageRequest) -> ServiceResult<Page<TagView>> {
        let paginator = Tag::find()
            .order_by_asc(tag::Column::Name)
            .paginate(db, page.size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page).await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            data.push(Self::project(db, row).await?);
        }
        Ok(Page::new(data, page, total))
    }

    pub async fn get_by_id(db: &DatabaseConnection, tag_id: Uuid) -> ServiceResult<TagView> {
        let found = Self::find(db, tag_id).await?;
        Self::project(db, found).await
    }

    pub async fn create(db: &DatabaseConnection, payload: TagRequest) -> ServiceResult<TagView> {
        let name = payload.name.trim().to_string();
        let txn = db.begin().await?;

        let duplicate = Tag::find()
            .filter(tag::Column::Name.eq(name.as_str()))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::bad_request("TAG_EXISTS", "Tag name already exists"));
        }

        let slug = generate_slug(&name);
        if slug.is_empty() {
            return Err(ServiceError::bad_request(
                "INVALID_NAME",
                "Tag name must contain at least one letter or digit",
            ));
        }
        let clash = Tag::find()
            .filter(tag::Column::Slug.eq(slug.as_str()))
            .one(&txn)
            .await?;
        if let Some(other) = clash {
            return Err(ServiceError::conflict(
                "TAG_SLUG_TAKEN",
                format!("Slug '{}' is already used by tag '{}'", slug, other.name),
            ));
        }

        let saved = tag::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            name: Set(name),
            slug: Set(slug),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if ServiceError::is_unique_violation(&e) {
                ServiceError::conflict("TAG_SLUG_TAKEN", "Tag name or slug already exists")
            } else {
                e.into()
            }
        })?;

        txn.commit().await?;

        tracing::info!("Tag {} created", saved.slug);
        Ok(TagView { id: saved.public_id, name: saved.name, slug: saved.slug, article_count: 0 })
    }

    /// Unlinks the tag from every article, then removes it.
    pub async fn delete(db: &DatabaseConnection, tag_id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let existing = Self::find(&txn, tag_id).await?;

        article_tag::Entity::delete_many()
            .filter(article_tag::Column::TagId.eq(existing.id))
            .exec(&txn)
            .await?;
        Tag::delete_by_id(existing.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!("Tag {} deleted", existing.slug);
        Ok(())
    }

    async fn find<C: ConnectionTrait>(conn: &C, tag_id: Uuid) -> ServiceResult<tag::Model> {
        Tag::find()
            .filter(tag::Column::PublicId.eq(tag_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("TAG_NOT_FOUND", "Tag not found"))
    }

    async fn project<C: ConnectionTrait>(conn: &C, row: tag::Model) -> ServiceResult<TagView> {
        let article_count = article_tag::Entity::find()
            .filter(article_tag::Column::TagId.eq(row.id))
            .count(conn)
            .await?;

        Ok(TagView {
            id: row.public_id,
            name: row.name,
            slug: row.slug,
            article_count,
        })
    }
}
