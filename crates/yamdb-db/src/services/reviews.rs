use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{review, title, user};
use crate::error::ModelError;

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub text: String,
    pub score: i16,
}

pub async fn create<C>(
    db: &C,
    author_id: Uuid,
    title_id: Uuid,
    input: ReviewInput,
) -> Result<review::Model, ModelError>
where
    C: ConnectionTrait,
{
    let model = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        text: Set(input.text),
        score: Set(input.score),
        author_id: Set(author_id),
        title_id: Set(title_id),
        ..Default::default()
    };
    model.validate()?;

    if user::Entity::find_by_id(author_id).count(db).await? == 0 {
        return Err(ModelError::missing("author"));
    }
    if title::Entity::find_by_id(title_id).count(db).await? == 0 {
        return Err(ModelError::missing("title"));
    }
    let already_reviewed = review::Entity::find()
        .filter(review::Column::AuthorId.eq(author_id))
        .filter(review::Column::TitleId.eq(title_id))
        .count(db)
        .await?
        > 0;
    if already_reviewed {
        return Err(ModelError::duplicate("author, title"));
    }

    let created = model.insert(db).await?;
    tracing::debug!(review_id = %created.id, score = created.score, "review created");
    Ok(created)
}

pub async fn get<C>(db: &C, id: Uuid) -> Result<review::Model, ModelError>
where
    C: ConnectionTrait,
{
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound { entity: "review" })
}

/// Newest first.
pub async fn list_for_title<C>(db: &C, title_id: Uuid) -> Result<Vec<review::Model>, ModelError>
where
    C: ConnectionTrait,
{
    Ok(review::Entity::find()
        .filter(review::Column::TitleId.eq(title_id))
        .order_by_desc(review::Column::PubDate)
        .all(db)
        .await?)
}

pub async fn update<C>(db: &C, id: Uuid, input: ReviewInput) -> Result<review::Model, ModelError>
where
    C: ConnectionTrait,
{
    let mut active = get(db, id).await?.into_active_model();
    active.text = Set(input.text);
    active.score = Set(input.score);
    active.validate()?;
    Ok(active.update(db).await?)
}

/// Deletes the review's comments as well.
pub async fn delete<C>(db: &C, id: Uuid) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let res = review::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound { entity: "review" });
    }
    Ok(())
}

/// Mean score of a title's reviews, `None` when nobody reviewed it.
pub async fn title_rating<C>(db: &C, title_id: Uuid) -> Result<Option<f64>, ModelError>
where
    C: ConnectionTrait,
{
    let scores: Vec<i16> = review::Entity::find()
        .select_only()
        .column(review::Column::Score)
        .filter(review::Column::TitleId.eq(title_id))
        .into_tuple()
        .all(db)
        .await?;
    if scores.is_empty() {
        return Ok(None);
    }
    let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    Ok(Some(total as f64 / scores.len() as f64))
}
