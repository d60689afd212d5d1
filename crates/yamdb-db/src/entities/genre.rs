use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::validation::{self, active};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "genres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::title_genre::Entity")]
    TitleGenre,
}

impl Related<super::title_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TitleGenre.def()
    }
}

/// Titles tagged with a genre, through `title_genres`.
impl Related<super::title::Entity> for Entity {
    fn to() -> RelationDef {
        super::title_genre::Relation::Title.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::title_genre::Relation::Genre.def().rev())
    }
}

impl ActiveModel {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if let Some(name) = active(&self.name) {
            validation::required("name", name)?;
            validation::max_len("name", name, validation::CLASSIFIER_NAME_MAX_LEN)?;
        }
        if let Some(slug) = active(&self.slug) {
            validation::slug(slug)?;
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
        if insert && self.id.is_not_set() {
            self.id = ActiveValue::Set(Uuid::new_v4());
        }
        self.validate()?;
        Ok(self)
    }
}
