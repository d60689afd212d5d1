//! Error type shared by entities and services.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("duplicate {constraint}")]
    Duplicate { constraint: String },

    #[error("referenced {field} does not exist")]
    MissingRelation { field: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[source] DbErr),
}

impl ModelError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ModelError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn duplicate(constraint: impl Into<String>) -> Self {
        ModelError::Duplicate {
            constraint: constraint.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        ModelError::MissingRelation {
            field: field.into(),
        }
    }

    /// Field name for validation failures, constraint for duplicates.
    pub fn field(&self) -> Option<&str> {
        match self {
            ModelError::Validation { field, .. } => Some(*field),
            ModelError::Duplicate { constraint } => Some(constraint.as_str()),
            ModelError::MissingRelation { field } => Some(field.as_str()),
            _ => None,
        }
    }
}

impl From<DbErr> for ModelError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ModelError::Duplicate {
                constraint: constraint_hint(&msg),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ModelError::MissingRelation {
                field: constraint_hint(&msg),
            },
            _ => ModelError::Database(err),
        }
    }
}

impl From<ModelError> for DbErr {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Database(db) => db,
            other => DbErr::Custom(other.to_string()),
        }
    }
}

impl From<argon2::password_hash::Error> for ModelError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ModelError::PasswordHash(err.to_string())
    }
}

/// Field names for the constraints the migrations create, as PostgreSQL
/// reports them.
const CONSTRAINT_FIELDS: &[(&str, &str)] = &[
    ("users_email_key", "email"),
    ("users_username_key", "username"),
    ("categories_slug_key", "slug"),
    ("genres_slug_key", "slug"),
    ("idx_reviews_author_title", "author, title"),
    ("title_genres_pkey", "title, genre"),
    ("fk_titles_category_id", "category"),
    ("fk_title_genres_title_id", "title"),
    ("fk_title_genres_genre_id", "genre"),
    ("fk_reviews_author_id", "author"),
    ("fk_reviews_title_id", "title"),
    ("fk_comments_author_id", "author"),
    ("fk_comments_review_id", "review"),
];

/// Field name(s) behind a driver constraint message, in the form the
/// services report them.
///
/// SQLite lists columns (`UNIQUE constraint failed: users.email`); PostgreSQL
/// quotes the constraint name last.
fn constraint_hint(msg: &str) -> String {
    if let Some((_, columns)) = msg.split_once("constraint failed: ") {
        return columns
            .split(',')
            .map(|column| {
                let column = column.trim();
                let column = column.rsplit_once('.').map_or(column, |(_, c)| c);
                column.strip_suffix("_id").unwrap_or(column)
            })
            .collect::<Vec<_>>()
            .join(", ");
    }
    match msg.split('"').skip(1).step_by(2).last() {
        Some(name) if !name.is_empty() => CONSTRAINT_FIELDS
            .iter()
            .find(|(constraint, _)| *constraint == name)
            .map_or(name, |(_, field)| field)
            .to_string(),
        _ => msg.to_string(),
    }
}
