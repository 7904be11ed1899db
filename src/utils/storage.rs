use crate::types::StorageContext;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use ulid::Ulid;

#[derive(Debug)]
enum Error {
    UploadFailed,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
    duration: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadedMedia {
    pub public_id: String,
    pub url: String,
    pub resource_type: String,
    pub duration: Option<f64>,
    pub timestamp: i64,
}

/// Relays a file from local temporary storage to the remote media host.
///
/// `None` is the sole failure signal: a missing or empty path returns `None`
/// without touching the network, and any upload failure removes the local
/// temp copy before returning `None`. Callers never see an error surface.
pub async fn upload_local_file(
    cfg: &StorageContext,
    local_path: impl AsRef<Path>,
) -> Option<UploadedMedia> {
    let local_path = local_path.as_ref();
    if local_path.as_os_str().is_empty() {
        return None;
    }

    let contents = match tokio::fs::read(local_path).await {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!("No uploadable file at {}: {}", local_path.display(), err);
            return None;
        }
    };

    match upload(cfg, contents).await {
        Ok(media) => Some(media),
        Err(err) => {
            tracing::error!(
                "Failed to relay {} to the media host: {:?}",
                local_path.display(),
                err
            );

            // The temp copy must never be left behind after a failed relay.
            if let Err(err) = tokio::fs::remove_file(local_path).await {
                tracing::warn!(
                    "Failed to remove temp file {}: {}",
                    local_path.display(),
                    err
                );
            }

            None
        }
    }
}

async fn upload(cfg: &StorageContext, contents: Vec<u8>) -> Result<UploadedMedia, Error> {
    let file_name = Ulid::new().to_string();
    let part = Part::bytes(contents).file_name(file_name.clone());

    let timestamp = chrono::Utc::now().timestamp();
    let data_to_sign = format!("timestamp={}{}", timestamp, cfg.api_secret);

    let mut hasher = Sha256::new();
    hasher.update(data_to_sign);
    let hash = hasher.finalize();
    let signature = base16ct::lower::encode_string(&hash);

    let form = Form::new()
        .text("api_key", cfg.api_key.clone())
        .text("timestamp", format!("{}", timestamp))
        .text("signature", signature)
        .text("signature_algorithm", "sha256")
        .part("file", part);

    let res = Client::new()
        .post(cfg.upload_endpoint.clone())
        .multipart(form)
        .send()
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to upload a file: {:?}", err);
            Error::UploadFailed
        })?;

    if res.status() != StatusCode::OK {
        let data = res.text().await.map_err(|err| {
            tracing::error!("Error occurred while processing return data: {:?}", err);
            Error::UploadFailed
        })?;

        tracing::error!("Failed to upload file: {}", data);
        return Err(Error::UploadFailed);
    }

    let data = res.text().await.map_err(|err| {
        tracing::error!("Error occurred while processing return data: {:?}", err);
        Error::UploadFailed
    })?;

    match serde_json::de::from_str::<UploadResponse>(data.as_ref()) {
        Ok(res) => Ok(UploadedMedia {
            url: res.secure_url,
            public_id: res.public_id,
            resource_type: res.resource_type,
            duration: res.duration,
            timestamp,
        }),
        Err(err) => {
            tracing::error!("Failed to deserialize media host response: {:?}", err);
            Err(Error::UploadFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage_context() -> StorageContext {
        StorageContext {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            // Nothing listens here, so every relay attempt fails fast.
            upload_endpoint: "http://127.0.0.1:9/upload".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_path_yields_no_result() {
        let cfg = test_storage_context();
        assert!(upload_local_file(&cfg, "").await.is_none());
    }

    #[tokio::test]
    async fn missing_file_yields_no_result() {
        let cfg = test_storage_context();
        let res = upload_local_file(&cfg, "public/temp/does-not-exist.mp4").await;
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn failed_relay_removes_the_local_copy() {
        let cfg = test_storage_context();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();

        let res = upload_local_file(&cfg, &path).await;

        assert!(res.is_none());
        assert!(!path.exists());
    }
}
