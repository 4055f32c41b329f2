use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::entities::{article, category, category::Entity as Category};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::category_model::{CategoryRequest, CategoryView};
use crate::models::page_model::{Page, PageRequest};
use crate::utils::slug_utils::generate_slug;

pub struct CategoryService;

impl CategoryService {
    pub async fn list(db: &DatabaseConnection, page: PageRequest) -> ServiceResult<Page<CategoryView>> {
        let paginator = Category::find()
            .order_by_asc(category::Column::Name)
            .paginate(db, page.size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page).await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            data.push(Self::project(db, row).await?);
        }
        Ok(Page::new(data, page, total))
    }

    pub async fn get_by_id(db: &DatabaseConnection, category_id: Uuid) -> ServiceResult<CategoryView> {
        let found = Self::find(db, category_id).await?;
        Self::project(db, found).await
    }

    /// Slug comes straight from the name; a clash is reported, never suffixed.
    pub async fn create(db: &DatabaseConnection, payload: CategoryRequest) -> ServiceResult<CategoryView> {
        let name = payload.name.trim().to_string();
        let txn = db.begin().await?;

        if Self::find_by_name(&txn, &name).await?.is_some() {
            return Err(ServiceError::bad_request("CATEGORY_EXISTS", "Category name already exists"));
        }
        let slug = Self::derive_slug(&txn, &name, None).await?;

        let saved = category::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            name: Set(name),
            slug: Set(slug),
            description: Set(payload.description),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(Self::map_write_err)?;

        let view = Self::project(&txn, saved).await?;
        txn.commit().await?;

        tracing::info!("Category {} created", view.slug);
        Ok(view)
    }

    /// Renames re-derive the slug every time.
    pub async fn update(
        db: &DatabaseConnection,
        category_id: Uuid,
        payload: CategoryRequest,
    ) -> ServiceResult<CategoryView> {
        let name = payload.name.trim().to_string();
        let txn = db.begin().await?;

        let existing = Self::find(&txn, category_id).await?;
        if let Some(other) = Self::find_by_name(&txn, &name).await? {
            if other.id != existing.id {
                return Err(ServiceError::bad_request("CATEGORY_EXISTS", "Category name already exists"));
            }
        }
        let slug = Self::derive_slug(&txn, &name, Some(existing.id)).await?;

        let mut active: category::ActiveModel = existing.into();
        active.name = Set(name);
        active.slug = Set(slug);
        active.description = Set(payload.description);
        let updated = active.update(&txn).await.map_err(Self::map_write_err)?;

        let view = Self::project(&txn, updated).await?;
        txn.commit().await?;

        tracing::info!("Category {} updated", view.id);
        Ok(view)
    }

    /// Articles in the category survive with no category.
    pub async fn delete(db: &DatabaseConnection, category_id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;
        let existing = Self::find(&txn, category_id).await?;

        article::Entity::update_many()
            .col_expr(article::Column::CategoryId, Expr::value(Option::<i64>::None))
            .col_expr(article::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(article::Column::CategoryId.eq(existing.id))
            .exec(&txn)
            .await?;
        Category::delete_by_id(existing.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!("Category {} deleted", existing.slug);
        Ok(())
    }

    // --- Helpers ---

    async fn find<C: ConnectionTrait>(conn: &C, category_id: Uuid) -> ServiceResult<category::Model> {
        Category::find()
            .filter(category::Column::PublicId.eq(category_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("CATEGORY_NOT_FOUND", "Category not found"))
    }

    async fn find_by_name<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Option<category::Model>, DbErr> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(conn)
            .await
    }

    async fn derive_slug<C: ConnectionTrait>(conn: &C, name: &str, owner: Option<i64>) -> ServiceResult<String> {
        let slug = generate_slug(name);
        if slug.is_empty() {
            return Err(ServiceError::bad_request(
                "INVALID_NAME",
                "Category name must contain at least one letter or digit",
            ));
        }

        let clash = Category::find()
            .filter(category::Column::Slug.eq(slug.as_str()))
            .one(conn)
            .await?;
        match clash {
            Some(other) if Some(other.id) != owner => Err(ServiceError::conflict(
                "CATEGORY_SLUG_TAKEN",
                format!("Slug '{}' is already used by category '{}'", slug, other.name),
            )),
            _ => Ok(slug),
        }
    }

    fn map_write_err(err: DbErr) -> ServiceError {
        if ServiceError::is_unique_violation(&err) {
            ServiceError::conflict("CATEGORY_SLUG_TAKEN", "Category name or slug already exists")
        } else {
            err.into()
        }
    }

    async fn project<C: ConnectionTrait>(conn: &C, row: category::Model) -> ServiceResult<CategoryView> {
        let article_count = article::Entity::find()
            .filter(article::Column::CategoryId.eq(row.id))
            .count(conn)
            .await?;

        Ok(CategoryView {
            id: row.public_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            article_count,
            created_at: row.created_at,
        })
    }
}
