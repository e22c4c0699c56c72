//! Token issuance and verification (the external authentication contract)
//! plus password hashing for stored accounts.

pub mod guard;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::{users, DatabaseError};

pub use guard::ensure_owner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i64,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn new(token_type: TokenType, user_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_type,
            user_id,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid,

    #[error("Token has wrong type")]
    WrongType,

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Hash a password for storage with the configured bcrypt cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, TokenError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Signs and checks HS256 bearer tokens
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Result<Self, TokenError> {
        if security.jwt_secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        Ok(Self {
            secret: security.jwt_secret.clone(),
            access_lifetime: Duration::minutes(security.access_token_lifetime_minutes),
            refresh_lifetime: Duration::days(security.refresh_token_lifetime_days),
        })
    }

    /// Issue a fresh refresh/access pair for a user
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            refresh: self.sign(&Claims::new(TokenType::Refresh, user_id, self.refresh_lifetime))?,
            access: self.sign(&Claims::new(TokenType::Access, user_id, self.access_lifetime))?,
        })
    }

    /// Exchange a valid refresh token for a new access token
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.decode_typed(refresh_token, TokenType::Refresh)?;
        self.sign(&Claims::new(TokenType::Access, claims.user_id, self.access_lifetime))
    }

    /// Check signature and expiry of either token type
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                TokenError::Invalid
            })
    }

    /// Decode a token used to authenticate a request; only access tokens qualify
    pub fn decode_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Access)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &key).map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Resolve credentials to a user and issue a token pair
    pub async fn authenticate(
        &self,
        pool: &SqlitePool,
        username: &str,
        password: &str,
    ) -> Result<(User, TokenPair), AuthenticationError> {
        let user = users::find_by_username(pool, username)
            .await?
            .ok_or(AuthenticationError::InvalidCredentials)?;

        let matches = bcrypt::verify(password, &user.password_hash).map_err(TokenError::from)?;
        if !matches {
            tracing::warn!("Failed login for user '{}'", username);
            return Err(AuthenticationError::InvalidCredentials);
        }

        let pair = self.issue_pair(user.id)?;
        tracing::debug!("Issued token pair for user '{}'", username);
        Ok((user, pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn service() -> TokenService {
        TokenService::new(&AppConfig::testing().security).unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut security = AppConfig::testing().security;
        security.jwt_secret.clear();
        assert!(matches!(TokenService::new(&security), Err(TokenError::InvalidSecret)));
    }

    #[test]
    fn pair_round_trips_through_verify() {
        let tokens = service();
        let pair = tokens.issue_pair(42).unwrap();

        let access = tokens.verify(&pair.access).unwrap();
        assert_eq!(access.user_id, 42);
        assert_eq!(access.token_type, TokenType::Access);

        let refresh = tokens.verify(&pair.refresh).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn refresh_requires_refresh_token() {
        let tokens = service();
        let pair = tokens.issue_pair(7).unwrap();

        let access = tokens.refresh(&pair.refresh).unwrap();
        assert_eq!(tokens.decode_access(&access).unwrap().user_id, 7);
        assert!(matches!(tokens.refresh(&pair.access), Err(TokenError::WrongType)));
        assert!(matches!(tokens.decode_access(&pair.refresh), Err(TokenError::WrongType)));
    }

    #[test]
    fn garbage_and_foreign_tokens_are_invalid() {
        let tokens = service();
        assert!(matches!(tokens.verify("invalid token"), Err(TokenError::Invalid)));

        let mut other = AppConfig::testing().security;
        other.jwt_secret = "another-secret".to_string();
        let foreign = TokenService::new(&other).unwrap().issue_pair(1).unwrap();
        assert!(matches!(tokens.verify(&foreign.access), Err(TokenError::Invalid)));
    }

    #[test]
    fn expired_token_is_invalid() {
        let mut security = AppConfig::testing().security;
        // Well past the default 60s validation leeway
        security.access_token_lifetime_minutes = -10;
        let tokens = TokenService::new(&security).unwrap();
        let pair = tokens.issue_pair(1).unwrap();
        assert!(matches!(tokens.decode_access(&pair.access), Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        use crate::database::DatabaseManager;

        let tokens = service();
        let db = DatabaseManager::connect_and_migrate(&AppConfig::testing().database).await.unwrap();
        let hash = hash_password("1234567", crate::config::MIN_HASH_COST).unwrap();
        users::create(db.pool(), "regular", &hash).await.unwrap();

        let (user, pair) = tokens.authenticate(db.pool(), "regular", "1234567").await.unwrap();
        assert_eq!(tokens.verify(&pair.access).unwrap().user_id, user.id);

        assert!(matches!(
            tokens.authenticate(db.pool(), "regular", "wrong").await,
            Err(AuthenticationError::InvalidCredentials)
        ));
        assert!(matches!(
            tokens.authenticate(db.pool(), "nobody", "1234567").await,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }
}
