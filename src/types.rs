pub use crate::utils::database;
use async_trait::async_trait;
use chrono::Duration;
use std::env;

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u32,
    pub cors_origin: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub access_token_expiry: Duration,
    pub refresh_token_secret: String,
    pub refresh_token_expiry: Duration,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

fn expiry_from_env(name: &str, fallback: &str) -> Duration {
    let raw = env::var(name).unwrap_or_else(|_| fallback.to_string());
    let parsed = humantime::parse_duration(raw.as_str())
        .unwrap_or_else(|_| panic!("Invalid duration in {}: {}", name, raw));
    Duration::from_std(parsed).unwrap_or_else(|_| panic!("Duration in {} out of range", name))
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u32>()
            .expect("Invalid PORT number");
        let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());
        let access_token_secret =
            env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET not set");
        let refresh_token_secret =
            env::var("REFRESH_TOKEN_SECRET").expect("REFRESH_TOKEN_SECRET not set");
        let access_token_expiry = expiry_from_env("ACCESS_TOKEN_EXPIRY", "1d");
        let refresh_token_expiry = expiry_from_env("REFRESH_TOKEN_EXPIRY", "10d");
        let storage_cloud_name =
            env::var("CLOUDINARY_CLOUD_NAME").expect("CLOUDINARY_CLOUD_NAME not set");
        let storage_api_key = env::var("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY not set");
        let storage_api_secret =
            env::var("CLOUDINARY_API_SECRET").expect("CLOUDINARY_API_SECRET not set");

        Self {
            app: AppConfig {
                host,
                port,
                cors_origin,
            },
            database: DatabaseConfig { url: database_url },
            auth: AuthConfig {
                access_token_secret,
                access_token_expiry,
                refresh_token_secret,
                refresh_token_expiry,
            },
            storage: StorageConfig {
                cloud_name: storage_cloud_name,
                api_key: storage_api_key,
                api_secret: storage_api_secret,
            },
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub port: u32,
    pub cors_origin: String,
}

#[derive(Clone)]
pub struct AuthContext {
    pub access_token_secret: String,
    pub access_token_expiry: Duration,
    pub refresh_token_secret: String,
    pub refresh_token_expiry: Duration,
}

#[derive(Clone)]
pub struct StorageContext {
    pub api_key: String,
    pub api_secret: String,
    pub upload_endpoint: String,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
    pub auth: AuthContext,
    pub storage: StorageContext,
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(self.database.url.as_str()).await;
        database::migrate(db_conn.clone()).await;

        // Uploads go up with `auto` so the host detects the resource kind itself.
        let upload_endpoint = format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.storage.cloud_name
        );

        Context {
            app: AppContext {
                host: self.app.host,
                port: self.app.port,
                cors_origin: self.app.cors_origin,
            },
            db_conn,
            auth: AuthContext {
                access_token_secret: self.auth.access_token_secret,
                access_token_expiry: self.auth.access_token_expiry,
                refresh_token_secret: self.auth.refresh_token_secret,
                refresh_token_expiry: self.auth.refresh_token_expiry,
            },
            storage: StorageContext {
                api_key: self.storage.api_key,
                api_secret: self.storage.api_secret,
                upload_endpoint,
            },
        }
    }
}
