use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult, map_unique},
    mail::{Mailer, OutgoingEmail},
    models::User,
};

pub const EMAIL_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;

/// Input for the account constructors. Flags left as `None` take the
/// constructor's defaults; an explicit value is an override.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            is_staff: None,
            is_superuser: None,
        }
    }
}

/// Create a regular account: `is_staff` and `is_superuser` default to false
/// unless explicitly overridden.
pub async fn create_user(pool: &DbPool, new: NewUser) -> StoreResult<User> {
    let is_staff = new.is_staff.unwrap_or(false);
    let is_superuser = new.is_superuser.unwrap_or(false);
    insert_user(pool, new, is_staff, is_superuser).await
}

/// Create a superuser: both flags default to true, and an explicit false
/// override for either is rejected rather than silently corrected.
pub async fn create_superuser(pool: &DbPool, new: NewUser) -> StoreResult<User> {
    if new.is_staff == Some(false) {
        return Err(StoreError::Validation(
            "Superuser must have is_staff=true".to_string(),
        ));
    }
    if new.is_superuser == Some(false) {
        return Err(StoreError::Validation(
            "Superuser must have is_superuser=true".to_string(),
        ));
    }
    insert_user(pool, new, true, true).await
}

/// Shared constructor step: validate, hash the password, persist.
async fn insert_user(
    pool: &DbPool,
    new: NewUser,
    is_staff: bool,
    is_superuser: bool,
) -> StoreResult<User> {
    if new.email.is_empty() {
        return Err(StoreError::Validation(
            "The given email must be set".to_string(),
        ));
    }
    if new.email.chars().count() > EMAIL_MAX_LEN {
        return Err(StoreError::Validation(format!(
            "email must be at most {EMAIL_MAX_LEN} characters"
        )));
    }
    if new.name.is_empty() {
        return Err(StoreError::Validation("name must be set".to_string()));
    }
    if new.name.chars().count() > NAME_MAX_LEN {
        return Err(StoreError::Validation(format!(
            "name must be at most {NAME_MAX_LEN} characters"
        )));
    }

    let password_hash = hash_password(&new.password)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, is_staff, is_superuser)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.email)
    .bind(&new.name)
    .bind(password_hash)
    .bind(is_staff)
    .bind(is_superuser)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique(e, "Email is already taken"))?;

    tracing::debug!(user_id = %user.id, is_staff, is_superuser, "user created");
    Ok(user)
}

pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(user: &User, password: &str) -> StoreResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| StoreError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn get_user(pool: &DbPool, id: Uuid) -> StoreResult<User> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> StoreResult<User> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
}

/// Soft-disable (or re-enable) an account instead of deleting the row.
pub async fn set_active(pool: &DbPool, id: Uuid, is_active: bool) -> StoreResult<User> {
    let user: Option<User> =
        sqlx::query_as("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await?;

    let user = user.ok_or(StoreError::NotFound)?;
    tracing::debug!(user_id = %user.id, is_active, "user active flag updated");
    Ok(user)
}

/// Send an email to this user through the transport collaborator. Transport
/// failures propagate to the caller untranslated.
pub async fn email_user<M: Mailer>(
    mailer: &M,
    user: &User,
    subject: &str,
    message: &str,
    from_email: Option<&str>,
    options: Option<Value>,
) -> anyhow::Result<()> {
    mailer
        .send(OutgoingEmail {
            subject: subject.to_string(),
            body: message.to_string(),
            from: from_email.map(str::to_string),
            to: vec![user.email.clone()],
            options,
        })
        .await
}
