use crate::{
    modules::video::repository::Video,
    utils::{auth, database::DatabaseConnection},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    /// Always a bcrypt hash once the record exists; plaintext only ever
    /// lives inside `CreateUserPayload` on its way into `create`.
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Full name must not be empty"))]
    pub full_name: String,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl CreateUserPayload {
    /// Trims and lowercases the identifying fields so uniqueness checks and
    /// lookups always operate on the canonical form.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_lowercase(),
            email: self.email.trim().to_lowercase(),
            full_name: self.full_name.trim().to_string(),
            ..self
        }
    }
}

pub enum Error {
    InvalidPayload(ValidationErrors),
    EmailInUse,
    UsernameInUse,
    UnexpectedError,
}

pub async fn create(db: DatabaseConnection, payload: CreateUserPayload) -> Result<User, Error> {
    let payload = payload.normalized();
    payload.validate().map_err(Error::InvalidPayload)?;

    // Pre-check for friendlier errors; the unique constraints below remain
    // the actual guarantee under concurrent inserts.
    if let Some(existing) = find_by_email_or_username(
        db.clone(),
        payload.email.clone(),
        payload.username.clone(),
    )
    .await?
    {
        if existing.email == payload.email {
            return Err(Error::EmailInUse);
        }
        return Err(Error::UsernameInUse);
    }

    let password_hash = auth::hash_password(payload.password.as_str()).map_err(|err| {
        tracing::error!("Failed to hash password: {}", err);
        Error::UnexpectedError
    })?;

    sqlx::query_as::<_, User>(
        "
        INSERT INTO users (id, username, email, full_name, avatar_url, cover_image_url, password)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.username)
    .bind(payload.email)
    .bind(payload.full_name)
    .bind(payload.avatar_url)
    .bind(payload.cover_image_url)
    .bind(password_hash)
    .fetch_one(&db.pool)
    .await
    .map_err(|err| {
        match err.as_database_error().and_then(|db_err| db_err.constraint()) {
            Some("users_email_key") => Error::EmailInUse,
            Some("users_username_key") => Error::UsernameInUse,
            _ => {
                tracing::error!("Error occurred while creating a user: {}", err);
                Error::UnexpectedError
            }
        }
    })
}

pub async fn find_by_id(db: DatabaseConnection, id: String) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching user by id: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_by_email(db: DatabaseConnection, email: String) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.to_lowercase())
        .fetch_optional(&db.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching user by email: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_by_username(
    db: DatabaseConnection,
    username: String,
) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username.to_lowercase())
        .fetch_optional(&db.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching user by username: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_by_email_or_username(
    db: DatabaseConnection,
    email: String,
    username: String,
) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 OR username = $2")
        .bind(email.to_lowercase())
        .bind(username.to_lowercase())
        .fetch_optional(&db.pool)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while fetching user by email or username: {}",
                err
            );
            Error::UnexpectedError
        })
}

/// Stores (or clears, with `None`) the long-lived renewal token. The
/// password column is untouched here, so a plain profile-level update
/// never re-hashes anything.
pub async fn update_refresh_token(
    db: DatabaseConnection,
    id: String,
    refresh_token: Option<String>,
) -> Result<(), Error> {
    sqlx::query("UPDATE users SET refresh_token = $1, updated_at = NOW() WHERE id = $2")
        .bind(refresh_token)
        .bind(id)
        .execute(&db.pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Error occurred while updating refresh token: {}", err);
            Error::UnexpectedError
        })
}

/// The only path that ever rewrites the password column, so the stored
/// value is hashed exactly when it changes and never otherwise.
pub async fn update_password(
    db: DatabaseConnection,
    id: String,
    new_password: String,
) -> Result<(), Error> {
    let password_hash = auth::hash_password(new_password.as_str()).map_err(|err| {
        tracing::error!("Failed to hash password: {}", err);
        Error::UnexpectedError
    })?;

    sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(&db.pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Error occurred while updating password: {}", err);
            Error::UnexpectedError
        })
}

/// Appends a view to the account's history. Repeat views append again;
/// the serial key preserves insertion order.
pub async fn add_to_watch_history(
    db: DatabaseConnection,
    user_id: String,
    video_id: String,
) -> Result<(), Error> {
    sqlx::query("INSERT INTO watch_history (user_id, video_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(video_id)
        .execute(&db.pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Error occurred while appending to watch history: {}", err);
            Error::UnexpectedError
        })
}

pub async fn watch_history(db: DatabaseConnection, user_id: String) -> Result<Vec<Video>, Error> {
    sqlx::query_as::<_, Video>(
        "
        SELECT v.* FROM watch_history wh
        JOIN videos v ON v.id = wh.video_id
        WHERE wh.user_id = $1
        ORDER BY wh.id
        ",
    )
    .bind(user_id)
    .fetch_all(&db.pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching watch history: {}", err);
        Error::UnexpectedError
    })
}
