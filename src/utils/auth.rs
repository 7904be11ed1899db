use crate::{modules::user::repository::User, types::AuthContext};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Cost factor for bcrypt password hashes.
pub const HASH_COST: u32 = 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A failed hash must abort whatever persist is in flight, so the error is
/// propagated instead of being swallowed into a sentinel value.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Uses bcrypt's own comparison primitive. Re-hashing and comparing strings
/// would break on cost-factor changes and leak timing.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

pub fn generate_access_token(
    auth: &AuthContext,
    user: &User,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        iat: now.timestamp(),
        exp: (now + auth.access_token_expiry).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.access_token_secret.as_bytes()),
    )
}

pub fn generate_refresh_token(
    auth: &AuthContext,
    user_id: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + auth.refresh_token_expiry).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.refresh_token_secret.as_bytes()),
    )
}

pub fn verify_access_token(
    auth: &AuthContext,
    token: &str,
) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
    decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(auth.access_token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

pub fn verify_refresh_token(
    auth: &AuthContext,
    token: &str,
) -> Result<RefreshTokenClaims, jsonwebtoken::errors::Error> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(auth.refresh_token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_auth_context() -> AuthContext {
        AuthContext {
            access_token_secret: "access-secret".to_string(),
            access_token_expiry: Duration::minutes(15),
            refresh_token_secret: "refresh-secret".to_string(),
            refresh_token_expiry: Duration::days(10),
        }
    }

    fn test_user() -> User {
        User {
            id: ulid::Ulid::new().to_string(),
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            full_name: "John Doe".to_string(),
            avatar_url: "https://cdn.example.com/avatar.png".to_string(),
            cover_image_url: None,
            password: "not-a-real-hash".to_string(),
            refresh_token: None,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert_ne!(hash, "correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
        // The hash itself must not verify as a plaintext candidate.
        assert!(!verify_password(&hash, &hash));
    }

    #[test]
    fn access_token_round_trip() {
        let auth = test_auth_context();
        let user = test_user();

        let token = generate_access_token(&auth, &user).unwrap();
        let claims = verify_access_token(&auth, &token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.full_name, user.full_name);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_embeds_only_the_id() {
        let auth = test_auth_context();
        let user = test_user();

        let token = generate_refresh_token(&auth, &user.id).unwrap();
        let claims = verify_refresh_token(&auth, &token).unwrap();

        assert_eq!(claims.sub, user.id);
    }

    #[test]
    fn tokens_are_rejected_across_secrets() {
        let auth = test_auth_context();
        let user = test_user();

        // Refresh secret must not validate an access token and vice versa.
        let access = generate_access_token(&auth, &user).unwrap();
        let mut crossed = auth.clone();
        crossed.access_token_secret = auth.refresh_token_secret.clone();
        assert!(verify_access_token(&crossed, &access).is_err());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let mut auth = test_auth_context();
        auth.access_token_expiry = Duration::hours(-2);
        let user = test_user();

        let token = generate_access_token(&auth, &user).unwrap();
        assert!(verify_access_token(&auth, &token).is_err());
    }
}
