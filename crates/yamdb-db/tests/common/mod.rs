// Shared test utilities for integration tests
#![allow(dead_code)]

use sea_orm::DatabaseConnection;
use uuid::Uuid;
use yamdb_db::entities::{category, genre, title, user};
use yamdb_db::services::titles::TitleInput;
use yamdb_db::services::users::UserExtra;
use yamdb_db::services::{categories, genres, titles, users, SlugInput};
use yamdb_db::DatabaseConfig;
use yamdb_migration::{Migrator, MigratorTrait};

/// Fresh in-memory SQLite database with the full schema applied.
pub async fn setup_test_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 5,
        idle_timeout_secs: 600,
    };
    let db = yamdb_db::connect(&config)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    db
}

pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> user::Model {
    users::create_user(
        db,
        &format!("{username}@example.com"),
        username,
        UserExtra::default(),
    )
    .await
    .expect("failed to create user")
}

pub async fn create_test_category(db: &DatabaseConnection, slug: &str) -> category::Model {
    categories::create(db, SlugInput::new(format!("Category {slug}"), slug))
        .await
        .expect("failed to create category")
}

pub async fn create_test_genre(db: &DatabaseConnection, slug: &str) -> genre::Model {
    genres::create(db, SlugInput::new(format!("Genre {slug}"), slug))
        .await
        .expect("failed to create genre")
}

pub async fn create_test_title(
    db: &DatabaseConnection,
    name: &str,
    category_id: Option<Uuid>,
    genre_ids: Vec<Uuid>,
) -> title::Model {
    titles::create(
        db,
        TitleInput {
            name: name.to_string(),
            year: Some(1979),
            description: String::new(),
            category_id,
            genre_ids,
        },
    )
    .await
    .expect("failed to create title")
}
