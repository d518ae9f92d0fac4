//! Identities and JSON Web Tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use polling_common::{AppError, AppResult, config::AuthConfig};
use polling_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// Kind of token, carried in the `token_type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub username: String,
    /// Admin flag at the time of issue.
    pub adm: bool,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// The caller behind a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<&user::Model> for Identity {
    fn from(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Access and refresh token pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// A freshly issued access token.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// Input for provisioning an account.
#[derive(Debug, Clone, Validate)]
pub struct NewUserInput {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password: String,
    pub is_admin: bool,
}

/// Issues and checks tokens, and owns user credentials.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    issuer: Option<String>,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(user_repo: UserRepository, config: &AuthConfig) -> Self {
        Self {
            user_repo,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
            issuer: config.issuer.clone(),
        }
    }

    /// Exchange credentials for a token pair.
    pub async fn obtain_pair(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            debug!(username = %username, "Rejected credentials");
            return Err(AppError::InvalidCredentials);
        }

        let identity = Identity::from(&user);
        Ok(TokenPair {
            access: self.issue(&identity, TokenType::Access)?,
            refresh: self.issue(&identity, TokenType::Refresh)?,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The user is reloaded so the new token carries the current admin flag.
    pub async fn refresh(&self, refresh: &str) -> AppResult<AccessToken> {
        let claims = self.decode_claims(refresh)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::TokenInvalid);
        }

        let user_id: i64 = claims.sub.parse().map_err(|_| AppError::TokenInvalid)?;
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::TokenInvalid)?;

        Ok(AccessToken {
            access: self.issue(&Identity::from(&user), TokenType::Access)?,
        })
    }

    /// Check a token of either type.
    pub fn verify(&self, token: &str) -> AppResult<()> {
        self.decode_claims(token).map(|_| ())
    }

    /// Resolve an access token to the caller's identity.
    pub fn authenticate(&self, access: &str) -> AppResult<Identity> {
        let claims = self.decode_claims(access)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::TokenInvalid);
        }

        Ok(Identity {
            user_id: claims.sub.parse().map_err(|_| AppError::TokenInvalid)?,
            username: claims.username,
            is_admin: claims.adm,
        })
    }

    /// Sign an access token for `identity`.
    pub fn access_token_for(&self, identity: &Identity) -> AppResult<String> {
        self.issue(identity, TokenType::Access)
    }

    /// Provision an account.
    pub async fn create_user(&self, input: NewUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let model = user::ActiveModel {
            username: Set(input.username),
            password_hash: Set(hash_password(&input.password)?),
            is_admin: Set(input.is_admin),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let created = self.user_repo.create(model).await?;
        info!(user_id = created.id, is_admin = created.is_admin, "User created");
        Ok(created)
    }

    /// Whether at least one administrator account exists.
    pub async fn has_admin(&self) -> AppResult<bool> {
        Ok(self.user_repo.count_admins().await? > 0)
    }

    fn issue(&self, identity: &Identity, token_type: TokenType) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };

        let claims = Claims {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            adm: identity.is_admin,
            token_type,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl,
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    fn decode_claims(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if let Some(issuer) = &self.issuer {
            validation.set_required_spec_claims(&["exp", "sub", "iss"]);
            validation.set_issuer(&[issuer]);
        } else {
            validation.set_required_spec_claims(&["exp", "sub"]);
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected token");
                AppError::TokenInvalid
            })
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_secs: 300,
            refresh_token_ttl_secs: 86_400,
            issuer: issuer.map(ToString::to_string),
        }
    }

    fn service_with(db: DatabaseConnection, issuer: Option<&str>) -> AuthService {
        AuthService::new(UserRepository::new(Arc::new(db)), &config(issuer))
    }

    fn service(db: DatabaseConnection) -> AuthService {
        service_with(db, None)
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    fn create_test_user(id: i64, password: &str, is_admin: bool) -> user::Model {
        user::Model {
            id,
            username: "admin".to_string(),
            password_hash: hash_password(password).unwrap(),
            is_admin,
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn identity(is_admin: bool) -> Identity {
        Identity {
            user_id: 1,
            username: "admin".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_access_token_round_trip() {
        let auth = service(empty_db());
        let token = auth.access_token_for(&identity(true)).unwrap();

        let who = auth.authenticate(&token).unwrap();

        assert_eq!(who, identity(true));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let auth = service(empty_db());
        let refresh = auth.issue(&identity(false), TokenType::Refresh).unwrap();

        assert!(auth.verify(&refresh).is_ok());
        assert!(matches!(
            auth.authenticate(&refresh),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = AuthService::new(
            UserRepository::new(Arc::new(empty_db())),
            &AuthConfig {
                jwt_secret: "another-secret".to_string(),
                ..config(None)
            },
        );
        let token = other.access_token_for(&identity(true)).unwrap();

        assert!(matches!(
            service(empty_db()).verify(&token),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = AuthService::new(
            UserRepository::new(Arc::new(empty_db())),
            &AuthConfig {
                access_token_ttl_secs: -10,
                ..config(None)
            },
        );
        let token = auth.access_token_for(&identity(false)).unwrap();

        assert!(matches!(auth.verify(&token), Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_issuer_is_enforced() {
        let unscoped = service(empty_db());
        let token = unscoped.access_token_for(&identity(false)).unwrap();

        let scoped = service_with(empty_db(), Some("polling"));
        assert!(scoped.verify(&token).is_err());

        let own = scoped.access_token_for(&identity(false)).unwrap();
        assert!(scoped.verify(&own).is_ok());
    }

    #[test]
    fn test_token_without_issuer_claim_is_rejected_when_issuer_configured() {
        let unscoped = service(empty_db());
        let token = unscoped.access_token_for(&identity(false)).unwrap();
        assert!(unscoped.verify(&token).is_ok());

        let scoped = service_with(empty_db(), Some("polling"));
        assert!(matches!(scoped.verify(&token), Err(AppError::TokenInvalid)));
        assert!(matches!(
            scoped.authenticate(&token),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let other = service_with(empty_db(), Some("elsewhere"));
        let token = other.access_token_for(&identity(false)).unwrap();

        let scoped = service_with(empty_db(), Some("polling"));
        assert!(matches!(scoped.verify(&token), Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            service(empty_db()).verify("not-a-jwt"),
            Err(AppError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn test_obtain_pair() {
        let user = create_test_user(1, "password123", true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();
        let auth = service(db);

        let pair = auth.obtain_pair("admin", "password123").await.unwrap();

        assert!(auth.authenticate(&pair.access).unwrap().is_admin);
        assert!(auth.authenticate(&pair.refresh).is_err());
    }

    #[tokio::test]
    async fn test_obtain_pair_wrong_password() {
        let user = create_test_user(1, "password123", false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();

        let err = service(db)
            .obtain_pair("admin", "nope-nope")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_obtain_pair_inactive_user() {
        let mut user = create_test_user(1, "password123", false);
        user.is_active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();

        let err = service(db)
            .obtain_pair("admin", "password123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_current_admin_flag() {
        let user = create_test_user(1, "password123", true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();
        let auth = service(db);
        let refresh = auth.issue(&identity(false), TokenType::Refresh).unwrap();

        let fresh = auth.refresh(&refresh).await.unwrap();

        assert!(auth.authenticate(&fresh.access).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let auth = service(empty_db());
        let access = auth.access_token_for(&identity(false)).unwrap();

        let err = auth.refresh(&access).await.unwrap_err();

        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let err = service(empty_db())
            .create_user(NewUserInput {
                username: "admin".to_string(),
                password: "short".to_string(),
                is_admin: true,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("password: "));
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(1, "password123", false)]])
            .into_connection();

        let err = service(db)
            .create_user(NewUserInput {
                username: "admin".to_string(),
                password: "password123".to_string(),
                is_admin: false,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("username: "));
    }
}
