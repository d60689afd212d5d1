use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{comment, review, user};
use crate::error::ModelError;

pub async fn create<C>(
    db: &C,
    author_id: Uuid,
    review_id: Uuid,
    text: &str,
) -> Result<comment::Model, ModelError>
where
    C: ConnectionTrait,
{
    let model = comment::ActiveModel {
        id: Set(Uuid::new_v4()),
        text: Set(text.to_string()),
        author_id: Set(author_id),
        review_id: Set(review_id),
        ..Default::default()
    };
    model.validate()?;

    if user::Entity::find_by_id(author_id).count(db).await? == 0 {
        return Err(ModelError::missing("author"));
    }
    if review::Entity::find_by_id(review_id).count(db).await? == 0 {
        return Err(ModelError::missing("review"));
    }

    Ok(model.insert(db).await?)
}

pub async fn get<C>(db: &C, id: Uuid) -> Result<comment::Model, ModelError>
where
    C: ConnectionTrait,
{
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound { entity: "comment" })
}

/// Oldest first, in reading order.
pub async fn list_for_review<C>(
    db: &C,
    review_id: Uuid,
) -> Result<Vec<comment::Model>, ModelError>
where
    C: ConnectionTrait,
{
    Ok(comment::Entity::find()
        .filter(comment::Column::ReviewId.eq(review_id))
        .order_by_asc(comment::Column::PubDate)
        .all(db)
        .await?)
}

pub async fn update<C>(db: &C, id: Uuid, text: &str) -> Result<comment::Model, ModelError>
where
    C: ConnectionTrait,
{
    let mut active = get(db, id).await?.into_active_model();
    active.text = Set(text.to_string());
    active.validate()?;
    Ok(active.update(db).await?)
}

pub async fn delete<C>(db: &C, id: Uuid) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let res = comment::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound { entity: "comment" });
    }
    Ok(())
}
