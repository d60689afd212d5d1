use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::validation::{self, active};

/// A user's scored review of a title. At most one per (author, title).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub pub_date: DateTimeWithTimeZone,
    pub score: i16,
    pub author_id: Uuid,
    pub title_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::title::Entity",
        from = "Column::TitleId",
        to = "super::title::Column::Id",
        on_delete = "Cascade"
    )]
    Title,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::title::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Title.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModel {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if let Some(text) = active(&self.text) {
            validation::required("text", text)?;
        }
        if let Some(score) = active(&self.score) {
            validation::score(*score)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.id.is_not_set() {
                self.id = ActiveValue::Set(Uuid::new_v4());
            }
            if self.pub_date.is_not_set() {
                self.pub_date = ActiveValue::Set(Utc::now().fixed_offset());
            }
        }
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: i16) -> ActiveModel {
        ActiveModel {
            text: ActiveValue::Set("Slow, but worth it".into()),
            score: ActiveValue::Set(score),
            ..Default::default()
        }
    }

    #[test]
    fn test_score_window() {
        assert!(scored(0).validate().is_err());
        assert!(scored(1).validate().is_ok());
        assert!(scored(10).validate().is_ok());
        assert!(scored(11).validate().is_err());
    }

    #[test]
    fn test_empty_text_rejected() {
        let active = ActiveModel {
            text: ActiveValue::Set(String::new()),
            ..Default::default()
        };
        assert_eq!(active.validate().unwrap_err().field(), Some("text"));
    }
}
