mod common;

use common::{create_test_user, setup_test_db};
use sea_orm::{ActiveModelTrait, Set};
use yamdb_db::entities::user::{self, UserRole};
use yamdb_db::services::users::{self, ProfileUpdate, UserExtra};
use yamdb_db::ModelError;

#[tokio::test]
async fn test_create_user_defaults() {
    let db = setup_test_db().await;
    let user = users::create_user(&db, "critic@Example.COM", "critic", UserExtra::default())
        .await
        .unwrap();

    assert_eq!(user.email, "critic@example.com");
    assert_eq!(user.username, "critic");
    assert_eq!(user.role, UserRole::User);
    assert!(user.is_active);
    assert!(!user.is_admin());
    assert!(!user.is_moderator());
    assert!(user.password_hash.is_none());
    assert!(user.bio.is_none());
}

#[tokio::test]
async fn test_create_user_requires_email() {
    let db = setup_test_db().await;
    let err = users::create_user(&db, "", "critic", UserExtra::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation { field: "email", .. }));
}

#[tokio::test]
async fn test_create_user_requires_username() {
    let db = setup_test_db().await;
    let err = users::create_user(&db, "critic@example.com", "", UserExtra::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation { field: "username", .. }));
}

#[tokio::test]
async fn test_domain_case_resolves_to_same_email() {
    let db = setup_test_db().await;
    users::create_user(&db, "fan@Films.ORG", "fan", UserExtra::default())
        .await
        .unwrap();

    let err = users::create_user(&db, "fan@films.org", "fan2", UserExtra::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Duplicate { ref constraint } if constraint == "email"));

    let found = users::find_by_email(&db, "fan@FILMS.org").await.unwrap();
    assert_eq!(found.map(|u| u.username), Some("fan".to_string()));
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let db = setup_test_db().await;
    create_test_user(&db, "critic").await;
    let err = users::create_user(&db, "other@example.com", "critic", UserExtra::default())
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("username"));
}

#[tokio::test]
async fn test_raw_duplicate_insert_names_same_field() {
    let db = setup_test_db().await;
    create_test_user(&db, "critic").await;

    let raw = user::ActiveModel {
        username: Set("other".to_string()),
        email: Set("critic@example.com".to_string()),
        ..Default::default()
    };
    let err: ModelError = raw.insert(&db).await.unwrap_err().into();
    assert!(matches!(err, ModelError::Duplicate { ref constraint } if constraint == "email"));
    assert_eq!(err.field(), Some("email"));

    let raw = user::ActiveModel {
        username: Set("critic".to_string()),
        email: Set("fresh@example.com".to_string()),
        ..Default::default()
    };
    let err: ModelError = raw.insert(&db).await.unwrap_err().into();
    assert_eq!(err.field(), Some("username"));
}

#[tokio::test]
async fn test_create_superuser_is_admin() {
    let db = setup_test_db().await;
    let user = users::create_superuser(&db, "root@example.com", "root", UserExtra::default())
        .await
        .unwrap();
    assert!(user.is_admin());
    assert!(!user.is_moderator());

    let stored = users::get(&db, user.id).await.unwrap();
    assert_eq!(stored.role, UserRole::Admin);
}

#[tokio::test]
async fn test_create_staff_is_moderator() {
    let db = setup_test_db().await;
    let user = users::create_staff(&db, "mod@example.com", "mod", UserExtra::default())
        .await
        .unwrap();
    assert!(user.is_moderator());
    assert!(!user.is_admin());
}

#[tokio::test]
async fn test_failed_superuser_leaves_nothing_behind() {
    let db = setup_test_db().await;
    let err = users::create_superuser(&db, "bad address", "root", UserExtra::default())
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("email"));
    assert!(users::find_by_username(&db, "root").await.unwrap().is_none());
}

#[tokio::test]
async fn test_extra_fields_are_stored() {
    let db = setup_test_db().await;
    let extra = UserExtra {
        password: Some("s3cret-pass".into()),
        first_name: Some("Andrei".into()),
        bio: Some("Sculpting in time".into()),
        ..Default::default()
    };
    let user = users::create_user(&db, "at@example.com", "andrei", extra)
        .await
        .unwrap();

    assert_eq!(user.profile().first_name, "Andrei");
    assert_eq!(user.profile().bio, Some("Sculpting in time"));
    assert!(user.account().has_usable_password);
    assert!(users::check_password(&user, "s3cret-pass").unwrap());
    assert!(!users::check_password(&user, "wrong").unwrap());
}

#[tokio::test]
async fn test_bio_length_limit() {
    let db = setup_test_db().await;
    let extra = UserExtra {
        bio: Some("b".repeat(501)),
        ..Default::default()
    };
    let err = users::create_user(&db, "long@example.com", "long", extra)
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("bio"));
}

#[tokio::test]
async fn test_set_role_and_profile_update() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "promoted").await;

    let user = users::set_role(&db, user.id, UserRole::Moderator).await.unwrap();
    assert!(user.is_moderator());

    let user = users::update_profile(
        &db,
        user.id,
        ProfileUpdate {
            last_name: Some("Tarkovsky".into()),
            bio: Some(Some("Director".into())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(user.last_name, "Tarkovsky");
    assert_eq!(user.bio.as_deref(), Some("Director"));
    assert_eq!(user.role, UserRole::Moderator);
}

#[tokio::test]
async fn test_set_password() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "nopass").await;
    assert!(!users::check_password(&user, "anything").unwrap());

    users::set_password(&db, user.id, "new-password").await.unwrap();
    let user = users::get(&db, user.id).await.unwrap();
    assert!(users::check_password(&user, "new-password").unwrap());
}

#[tokio::test]
async fn test_confirmation_code_is_single_use() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "confirm").await;

    let code = users::issue_confirmation_code(&db, user.id).await.unwrap();
    assert!(!users::confirm_code(&db, user.id, "nope").await.unwrap());
    assert!(users::confirm_code(&db, user.id, &code).await.unwrap());
    assert!(!users::confirm_code(&db, user.id, &code).await.unwrap());

    let user = users::get(&db, user.id).await.unwrap();
    assert!(user.confirmation_code.is_none());
}

#[tokio::test]
async fn test_delete_missing_user() {
    let db = setup_test_db().await;
    let err = users::delete_user(&db, uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ModelError::NotFound { entity: "user" }));
}
