use std::collections::BTreeSet;

use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{category, genre, title, title_genre};
use crate::error::ModelError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleInput {
    pub name: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub genre_ids: Vec<Uuid>,
}

/// Listing filter; unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Substring of the title name, matched literally.
    pub name: Option<String>,
    pub year: Option<i32>,
}

pub async fn create<C>(db: &C, input: TitleInput) -> Result<title::Model, ModelError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let model = title::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        year: Set(input.year),
        category_id: Set(input.category_id),
        description: Set(input.description),
    };
    model.validate()?;

    let txn = db.begin().await?;
    ensure_category(&txn, input.category_id).await?;
    let genre_ids = ensure_genres(&txn, &input.genre_ids).await?;
    let created = model.insert(&txn).await?;
    link_genres(&txn, created.id, &genre_ids).await?;
    txn.commit().await?;

    tracing::debug!(title_id = %created.id, genres = genre_ids.len(), "title created");
    Ok(created)
}

pub async fn get<C>(db: &C, id: Uuid) -> Result<title::Model, ModelError>
where
    C: ConnectionTrait,
{
    title::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound { entity: "title" })
}

pub async fn list<C>(db: &C, filter: &TitleFilter) -> Result<Vec<title::Model>, ModelError>
where
    C: ConnectionTrait,
{
    let mut query = title::Entity::find();
    if let Some(slug) = filter.category.as_deref() {
        query = query
            .inner_join(category::Entity)
            .filter(category::Column::Slug.eq(slug));
    }
    if let Some(slug) = filter.genre.as_deref() {
        query = query
            .inner_join(genre::Entity)
            .filter(genre::Column::Slug.eq(slug));
    }
    if let Some(name) = filter.name.as_deref() {
        query = query.filter(title::Column::Name.like(name_contains(name)));
    }
    if let Some(year) = filter.year {
        query = query.filter(title::Column::Year.eq(year));
    }
    Ok(query.order_by_asc(title::Column::Name).all(db).await?)
}

/// Replace every column, the category and the genre set.
pub async fn update<C>(db: &C, id: Uuid, input: TitleInput) -> Result<title::Model, ModelError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let existing = get(db, id).await?;
    let mut active = existing.into_active_model();
    active.name = Set(input.name);
    active.year = Set(input.year);
    active.category_id = Set(input.category_id);
    active.description = Set(input.description);
    active.validate()?;

    let txn = db.begin().await?;
    ensure_category(&txn, input.category_id).await?;
    let genre_ids = ensure_genres(&txn, &input.genre_ids).await?;
    let updated = active.update(&txn).await?;
    title_genre::Entity::delete_many()
        .filter(title_genre::Column::TitleId.eq(id))
        .exec(&txn)
        .await?;
    link_genres(&txn, id, &genre_ids).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Deletes the title's reviews (and their comments) as well.
pub async fn delete<C>(db: &C, id: Uuid) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let res = title::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound { entity: "title" });
    }
    tracing::debug!(title_id = %id, "title deleted");
    Ok(())
}

pub async fn genres_of<C>(db: &C, id: Uuid) -> Result<Vec<genre::Model>, ModelError>
where
    C: ConnectionTrait,
{
    let title = get(db, id).await?;
    Ok(title
        .find_related(genre::Entity)
        .order_by_asc(genre::Column::Name)
        .all(db)
        .await?)
}

const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `needle` anywhere, with wildcards in it escaped.
fn name_contains(needle: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

async fn ensure_category<C>(db: &C, category_id: Option<Uuid>) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let Some(id) = category_id else {
        return Ok(());
    };
    let exists = category::Entity::find_by_id(id).count(db).await? > 0;
    if !exists {
        return Err(ModelError::missing("category"));
    }
    Ok(())
}

/// Deduplicated genre ids, all known to exist.
async fn ensure_genres<C>(db: &C, ids: &[Uuid]) -> Result<Vec<Uuid>, ModelError>
where
    C: ConnectionTrait,
{
    let wanted: BTreeSet<Uuid> = ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }
    let found = genre::Entity::find()
        .filter(genre::Column::Id.is_in(wanted.iter().copied()))
        .count(db)
        .await?;
    if found as usize != wanted.len() {
        return Err(ModelError::missing("genre"));
    }
    Ok(wanted.into_iter().collect())
}

async fn link_genres<C>(db: &C, title_id: Uuid, genre_ids: &[Uuid]) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    if genre_ids.is_empty() {
        return Ok(());
    }
    let links = genre_ids.iter().map(|genre_id| title_genre::ActiveModel {
        title_id: Set(title_id),
        genre_id: Set(*genre_id),
    });
    title_genre::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
