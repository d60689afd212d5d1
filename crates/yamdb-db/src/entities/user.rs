use std::str::FromStr;

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::validation::{self, active};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(13))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::User => "user",
            UserRole::Moderator => "moderator",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            other => Err(ModelError::validation(
                "role",
                format!("unknown role `{other}`"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTimeWithTimeZone,
    pub last_login: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub confirmation_code: Option<String>,
}

/// Login identity and bookkeeping columns of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub has_usable_password: bool,
    pub is_active: bool,
    pub date_joined: DateTimeWithTimeZone,
    pub last_login: Option<DateTimeWithTimeZone>,
}

/// Review-site specific columns of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub bio: Option<&'a str>,
    pub role: UserRole,
    pub confirmation_code: Option<&'a str>,
}

impl Model {
    pub fn account(&self) -> Account<'_> {
        Account {
            id: self.id,
            username: &self.username,
            email: &self.email,
            has_usable_password: self.password_hash.is_some(),
            is_active: self.is_active,
            date_joined: self.date_joined,
            last_login: self.last_login,
        }
    }

    pub fn profile(&self) -> Profile<'_> {
        Profile {
            first_name: &self.first_name,
            last_name: &self.last_name,
            bio: self.bio.as_deref(),
            role: self.role,
            confirmation_code: self.confirmation_code.as_deref(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_moderator(&self) -> bool {
        self.role == UserRole::Moderator
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModel {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if let Some(email) = active(&self.email) {
            validation::email(email)?;
        }
        if let Some(username) = active(&self.username) {
            validation::username(username)?;
        }
        if let Some(first_name) = active(&self.first_name) {
            validation::max_len("first_name", first_name, validation::PERSON_NAME_MAX_LEN)?;
        }
        if let Some(last_name) = active(&self.last_name) {
            validation::max_len("last_name", last_name, validation::PERSON_NAME_MAX_LEN)?;
        }
        if let Some(Some(bio)) = active(&self.bio) {
            validation::max_len("bio", bio, validation::BIO_MAX_LEN)?;
        }
        if let Some(Some(code)) = active(&self.confirmation_code) {
            validation::max_len(
                "confirmation_code",
                code,
                validation::CONFIRMATION_CODE_MAX_LEN,
            )?;
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
            if self.date_joined.is_not_set() {
                self.date_joined = ActiveValue::Set(Utc::now().fixed_offset());
            }
            if self.role.is_not_set() {
                self.role = ActiveValue::Set(UserRole::default());
            }
            if self.is_active.is_not_set() {
                self.is_active = ActiveValue::Set(true);
            }
            if self.first_name.is_not_set() {
                self.first_name = ActiveValue::Set(String::new());
            }
            if self.last_name.is_not_set() {
                self.last_name = ActiveValue::Set(String::new());
            }
        }
        self.validate()?;
        Ok(self)
    }
}
