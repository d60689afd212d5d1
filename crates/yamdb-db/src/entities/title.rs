use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::validation::{self, active};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "titles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Release year, between 1600 and the current year.
    pub year: Option<i32>,
    /// Nulled when the category is deleted.
    pub category_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::title_genre::Entity")]
    TitleGenre,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::title_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TitleGenre.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::title_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::title_genre::Relation::Title.def().rev())
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModel {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if let Some(name) = active(&self.name) {
            validation::required("name", name)?;
            validation::max_len("name", name, validation::TITLE_NAME_MAX_LEN)?;
        }
        if let Some(year) = active(&self.year) {
            validation::year(*year)?;
        }
        if let Some(description) = active(&self.description) {
            validation::max_len("description", description, validation::DESCRIPTION_MAX_LEN)?;
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
            if self.description.is_not_set() {
                self.description = ActiveValue::Set(String::new());
            }
        }
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::current_year;

    fn with_year(year: Option<i32>) -> ActiveModel {
        ActiveModel {
            name: ActiveValue::Set("Stalker".into()),
            year: ActiveValue::Set(year),
            ..Default::default()
        }
    }

    #[test]
    fn test_year_window() {
        assert!(with_year(Some(1599)).validate().is_err());
        assert!(with_year(Some(1600)).validate().is_ok());
        assert!(with_year(Some(current_year())).validate().is_ok());
        assert!(with_year(Some(current_year() + 1)).validate().is_err());
        assert!(with_year(None).validate().is_ok());
    }

    #[test]
    fn test_description_limit() {
        let active = ActiveModel {
            description: ActiveValue::Set("d".repeat(validation::DESCRIPTION_MAX_LEN + 1)),
            ..Default::default()
        };
        assert_eq!(active.validate().unwrap_err().field(), Some("description"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let active = ActiveModel {
            name: ActiveValue::Set("   ".into()),
            ..Default::default()
        };
        assert_eq!(active.validate().unwrap_err().field(), Some("name"));
    }
}
