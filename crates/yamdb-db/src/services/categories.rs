use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::SlugInput;
use crate::entities::category;
use crate::error::ModelError;

pub async fn create<C>(db: &C, input: SlugInput) -> Result<category::Model, ModelError>
where
    C: ConnectionTrait,
{
    let slug = input.resolved_slug()?;
    ensure_slug_free(db, &slug, None).await?;

    let model = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        slug: Set(slug),
    };
    model.validate()?;
    let created = model.insert(db).await?;
    tracing::debug!(category = %created.slug, "category created");
    Ok(created)
}

pub async fn get<C>(db: &C, id: Uuid) -> Result<category::Model, ModelError>
where
    C: ConnectionTrait,
{
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound { entity: "category" })
}

pub async fn find_by_slug<C>(db: &C, slug: &str) -> Result<Option<category::Model>, ModelError>
where
    C: ConnectionTrait,
{
    Ok(category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await?)
}

pub async fn list<C>(db: &C) -> Result<Vec<category::Model>, ModelError>
where
    C: ConnectionTrait,
{
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?)
}

pub async fn update<C>(db: &C, id: Uuid, input: SlugInput) -> Result<category::Model, ModelError>
where
    C: ConnectionTrait,
{
    let existing = get(db, id).await?;
    let slug = input.resolved_slug()?;
    ensure_slug_free(db, &slug, Some(id)).await?;

    let mut active = existing.into_active_model();
    active.name = Set(input.name);
    active.slug = Set(slug);
    active.validate()?;
    Ok(active.update(db).await?)
}

/// Titles in the category keep existing with no category.
pub async fn delete<C>(db: &C, id: Uuid) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let res = category::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound { entity: "category" });
    }
    tracing::debug!(category_id = %id, "category deleted");
    Ok(())
}

async fn ensure_slug_free<C>(db: &C, slug: &str, except: Option<Uuid>) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    match find_by_slug(db, slug).await? {
        Some(found) if Some(found.id) != except => Err(ModelError::duplicate("slug")),
        _ => Ok(()),
    }
}
