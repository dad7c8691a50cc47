//! Authentication: JWT issuance and validation, argon2 password
//! hashing, and the [`CurrentUser`] extractor protected handlers take as
//! an argument.
//!
//! Tokens are stateless HS256 JWTs. Logout is recorded in the audit
//! trail but does not revoke the token; tokens simply expire.

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::config::AppConfig;
use crate::entities::user;
use crate::errors::ServiceError;
use crate::AppState;

/// JWT claim set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    /// Unique id of this token.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// The authenticated actor behind a request, decoded from the bearer
/// token. Snapshot of the user at login time; a role change takes
/// effect on the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Gate for admin-only operations.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "administrator access required".into(),
            ))
        }
    }

    /// Admins may act on anyone; everyone else only on themselves.
    pub fn require_self_or_admin(&self, user_id: Uuid) -> Result<(), ServiceError> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "operation not permitted for this account".into(),
            ))
        }
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = ServiceError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::AuthError("token subject is not a valid user id".into()))?;
        Ok(Self {
            user_id,
            username: claims.username,
            full_name: claims.full_name,
            role: claims.role,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::AuthError("missing authorization header".into()))?;
        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::AuthError("authorization header must carry a bearer token".into())
        })?;
        let claims = state.services.auth.verify_token(token)?;
        CurrentUser::try_from(claims)
    }
}

/// Token issuance settings, derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration_secs: usize,
}

impl From<&AppConfig> for AuthConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_issuer: config.auth_issuer.clone(),
            jwt_audience: config.auth_audience.clone(),
            token_expiration_secs: config.jwt_expiration,
        }
    }
}

/// Successful login payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: i64,
}

/// Issues and validates tokens and handles password hashing. User
/// records themselves live behind
/// [`crate::services::users::UserService`].
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Signs an access token for a user that has already been
    /// authenticated.
    pub fn issue_token(&self, user: &user::Model) -> Result<AccessToken, ServiceError> {
        let now = Utc::now();
        let expires_at = now + ChronoDuration::seconds(self.config.token_expiration_secs as i64);
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {e}")))?;
        Ok(AccessToken {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration_secs as i64,
        })
    }

    /// Decodes and validates a token, checking signature, expiry,
    /// not-before, issuer and audience.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::AuthError("token has expired".into())
            }
            _ => ServiceError::AuthError("invalid authentication token".into()),
        })?;
        Ok(data.claims)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {e}")))
    }

    /// Returns whether `password` matches the stored hash. A malformed
    /// stored hash is an internal error, not a failed login.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| {
            ServiceError::InternalError(format!("stored password hash is invalid: {e}"))
        })?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a".repeat(64),
            jwt_issuer: "fusionflow-api".to_string(),
            jwt_audience: "fusionflow-clients".to_string(),
            token_expiration_secs: 3600,
        }
    }

    fn test_user() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            username: "jsmith".to_string(),
            email: "jsmith@example.com".to_string(),
            password_hash: String::new(),
            full_name: "Jane Smith".to_string(),
            role: "manager".to_string(),
            department: None,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let service = AuthService::new(test_config());
        let user = test_user();
        let token = service.issue_token(&user).unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = service.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "jsmith");
        assert_eq!(claims.role, "manager");

        let current = CurrentUser::try_from(claims).unwrap();
        assert_eq!(current.user_id, user.id);
        assert!(!current.is_admin());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = AuthService::new(test_config());
        let token = service.issue_token(&test_user()).unwrap();
        let mut tampered = token.access_token;
        tampered.pop();
        tampered.push('x');
        assert!(service.verify_token(&tampered).is_err());
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let issuing = AuthService::new(AuthConfig {
            jwt_issuer: "someone-else".to_string(),
            ..test_config()
        });
        let verifying = AuthService::new(test_config());
        let token = issuing.issue_token(&test_user()).unwrap();
        assert!(verifying.verify_token(&token.access_token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = AuthService::new(AuthConfig {
            token_expiration_secs: 0,
            ..test_config()
        });
        let token = service.issue_token(&test_user()).unwrap();
        // exp == iat, and the default leeway is bypassed by validating
        // with zero leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&["fusionflow-api"]);
        validation.set_audience(&["fusionflow-clients"]);
        let result = decode::<Claims>(
            &token.access_token,
            &DecodingKey::from_secret("a".repeat(64).as_bytes()),
            &validation,
        );
        assert!(result.is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let service = AuthService::new(test_config());
        let hash = service.hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(service
            .verify_password("correct horse battery staple", &hash)
            .unwrap());
        assert!(!service.verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn bad_subject_claim_is_rejected() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            username: "x".to_string(),
            full_name: "X".to_string(),
            role: "user".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp: i64::MAX,
            nbf: 0,
            iss: "fusionflow-api".to_string(),
            aud: "fusionflow-clients".to_string(),
        };
        assert!(CurrentUser::try_from(claims).is_err());
    }
}
