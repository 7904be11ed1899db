use crate::utils::database::DatabaseConnection;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: String,
    pub video_file_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    /// Plain reference to the owning account; deleting the account does
    /// not cascade to its videos.
    pub owner_id: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoPayload {
    #[validate(url(message = "Video file must be a valid URL"))]
    pub video_file_url: String,
    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail_url: String,
    #[validate(length(min = 1, max = 120, message = "Title must be 1 to 120 characters"))]
    pub title: String,
    pub description: String,
    pub owner_id: String,
    #[validate(range(min = 0.0, message = "Duration must not be negative"))]
    pub duration: f64,
}

pub enum Error {
    InvalidPayload(ValidationErrors),
    UnexpectedError,
}

pub async fn create(db: DatabaseConnection, payload: CreateVideoPayload) -> Result<Video, Error> {
    payload.validate().map_err(Error::InvalidPayload)?;

    sqlx::query_as::<_, Video>(
        "
        INSERT INTO videos (id, video_file_url, thumbnail_url, title, description, owner_id, duration)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.video_file_url)
    .bind(payload.thumbnail_url)
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.owner_id)
    .bind(payload.duration)
    .fetch_one(&db.pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while creating a video: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id(db: DatabaseConnection, id: String) -> Result<Option<Video>, Error> {
    sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching video by id: {}", err);
            Error::UnexpectedError
        })
}

pub async fn list_published(db: DatabaseConnection, owner_id: String) -> Result<Vec<Video>, Error> {
    sqlx::query_as::<_, Video>(
        "SELECT * FROM videos WHERE owner_id = $1 AND is_published = true ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(&db.pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while listing videos: {}", err);
        Error::UnexpectedError
    })
}

/// The counter only ever moves forward; there is no reset path.
pub async fn increment_views(db: DatabaseConnection, id: String) -> Result<(), Error> {
    sqlx::query("UPDATE videos SET views = views + 1, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&db.pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Error occurred while incrementing views: {}", err);
            Error::UnexpectedError
        })
}

pub async fn set_published(
    db: DatabaseConnection,
    id: String,
    is_published: bool,
) -> Result<(), Error> {
    sqlx::query("UPDATE videos SET is_published = $1, updated_at = NOW() WHERE id = $2")
        .bind(is_published)
        .bind(id)
        .execute(&db.pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Error occurred while updating publication flag: {}", err);
            Error::UnexpectedError
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateVideoPayload {
        CreateVideoPayload {
            video_file_url: "https://cdn.example.com/clip.mp4".to_string(),
            thumbnail_url: "https://cdn.example.com/clip.png".to_string(),
            title: "My first video".to_string(),
            description: String::new(),
            owner_id: Ulid::new().to_string(),
            duration: 42.5,
        }
    }

    #[test]
    fn well_formed_payload_passes_validation() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut bad = payload();
        bad.duration = -1.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn non_url_asset_references_are_rejected() {
        let mut bad = payload();
        bad.video_file_url = "clip.mp4".to_string();
        assert!(bad.validate().is_err());
    }
}
