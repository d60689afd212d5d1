//! User factory: the only sanctioned way to create accounts.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::ModelError;
use crate::password::{generate_confirmation_code, hash_password, verify_password};
use crate::validation::normalize_email;

/// Optional columns accepted at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserExtra {
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub confirmation_code: Option<String>,
}

/// Partial profile update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the bio.
    pub bio: Option<Option<String>>,
}

pub async fn create_user<C>(
    db: &C,
    email: &str,
    username: &str,
    extra: UserExtra,
) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait,
{
    if email.trim().is_empty() {
        return Err(ModelError::validation("email", "the email must be set"));
    }
    if username.trim().is_empty() {
        return Err(ModelError::validation("username", "the username must be set"));
    }
    let email = normalize_email(email);

    ensure_unique(db, user::Column::Email, &email, "email").await?;
    ensure_unique(db, user::Column::Username, username, "username").await?;

    let password_hash = extra
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        first_name: Set(extra.first_name.unwrap_or_default()),
        last_name: Set(extra.last_name.unwrap_or_default()),
        bio: Set(extra.bio),
        role: Set(UserRole::User),
        confirmation_code: Set(extra.confirmation_code),
        ..Default::default()
    };
    new_user.validate()?;

    let created = new_user.insert(db).await?;
    tracing::info!(user_id = %created.id, username = %created.username, "user created");
    Ok(created)
}

/// Create a user and promote them to admin.
pub async fn create_superuser<C>(
    db: &C,
    email: &str,
    username: &str,
    extra: UserExtra,
) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait + TransactionTrait,
{
    create_with_role(db, email, username, extra, UserRole::Admin).await
}

/// Create a user and promote them to moderator.
pub async fn create_staff<C>(
    db: &C,
    email: &str,
    username: &str,
    extra: UserExtra,
) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait + TransactionTrait,
{
    create_with_role(db, email, username, extra, UserRole::Moderator).await
}

async fn create_with_role<C>(
    db: &C,
    email: &str,
    username: &str,
    extra: UserExtra,
    role: UserRole,
) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let created = create_user(&txn, email, username, extra).await?;
    let promoted = assign_role(&txn, created, role).await?;
    txn.commit().await?;
    Ok(promoted)
}

async fn assign_role<C>(
    db: &C,
    user: user::Model,
    role: UserRole,
) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait,
{
    let mut active = user.into_active_model();
    active.role = Set(role);
    let updated = active.update(db).await?;
    tracing::info!(user_id = %updated.id, role = %role, "role assigned");
    Ok(updated)
}

pub async fn get<C>(db: &C, id: Uuid) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound { entity: "user" })
}

/// Look up by email; the address is normalized first.
pub async fn find_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>, ModelError>
where
    C: ConnectionTrait,
{
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn find_by_username<C>(
    db: &C,
    username: &str,
) -> Result<Option<user::Model>, ModelError>
where
    C: ConnectionTrait,
{
    Ok(user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?)
}

pub async fn set_role<C>(db: &C, id: Uuid, role: UserRole) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait,
{
    let user = get(db, id).await?;
    assign_role(db, user, role).await
}

pub async fn update_profile<C>(
    db: &C,
    id: Uuid,
    update: ProfileUpdate,
) -> Result<user::Model, ModelError>
where
    C: ConnectionTrait,
{
    let mut active = get(db, id).await?.into_active_model();
    if let Some(first_name) = update.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = update.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(bio) = update.bio {
        active.bio = Set(bio);
    }
    active.validate()?;
    Ok(active.update(db).await?)
}

pub async fn set_password<C>(db: &C, id: Uuid, password: &str) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let mut active = get(db, id).await?.into_active_model();
    active.password_hash = Set(Some(hash_password(password)?));
    active.update(db).await?;
    tracing::debug!(user_id = %id, "password changed");
    Ok(())
}

/// `false` for accounts created without a password.
pub fn check_password(user: &user::Model, password: &str) -> Result<bool, ModelError> {
    match user.password_hash.as_deref() {
        Some(hash) => Ok(verify_password(password, hash)?),
        None => Ok(false),
    }
}

/// Store a fresh confirmation code on the user and return it for delivery.
pub async fn issue_confirmation_code<C>(db: &C, id: Uuid) -> Result<String, ModelError>
where
    C: ConnectionTrait,
{
    let code = generate_confirmation_code();
    let mut active = get(db, id).await?.into_active_model();
    active.confirmation_code = Set(Some(code.clone()));
    active.update(db).await?;
    Ok(code)
}

/// Check a confirmation code. A matching code is consumed.
pub async fn confirm_code<C>(db: &C, id: Uuid, code: &str) -> Result<bool, ModelError>
where
    C: ConnectionTrait,
{
    let user = get(db, id).await?;
    if code.is_empty() || user.confirmation_code.as_deref() != Some(code) {
        return Ok(false);
    }
    let mut active = user.into_active_model();
    active.confirmation_code = Set(None);
    active.update(db).await?;
    Ok(true)
}

/// Delete a user together with their reviews and comments.
pub async fn delete_user<C>(db: &C, id: Uuid) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let res = user::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ModelError::NotFound { entity: "user" });
    }
    tracing::info!(user_id = %id, "user deleted");
    Ok(())
}

async fn ensure_unique<C>(
    db: &C,
    column: user::Column,
    value: &str,
    field: &'static str,
) -> Result<(), ModelError>
where
    C: ConnectionTrait,
{
    let taken = user::Entity::find()
        .filter(column.eq(value))
        .one(db)
        .await?
        .is_some();
    if taken {
        return Err(ModelError::duplicate(field));
    }
    Ok(())
}
