use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::user::UserRole;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// JWT claims embedded in both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID as a UUID string.
    pub sub: String,
    pub role: UserRole,
    /// Token type: `"access"` or `"refresh"`.
    pub token_type: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Unique JWT identifier (refresh tokens are tracked in the database by it).
    pub jti: String,
}

impl Claims {
    /// Parse the subject as a user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is not a UUID.
    pub fn user_id(&self) -> anyhow::Result<Uuid> {
        self.sub
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid token subject: {e}"))
    }
}

/// A pair of access and refresh tokens making up one session.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// The `jti` of the refresh token, used as its identifier in the database.
    pub refresh_jti: Uuid,
    pub refresh_expires_at: chrono::DateTime<Utc>,
}

/// Generate a new access + refresh token pair for the given user.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_token_pair(
    user_id: Uuid,
    role: UserRole,
    config: &Config,
) -> anyhow::Result<TokenPair> {
    let now = Utc::now();
    let refresh_jti = Uuid::new_v4();

    #[allow(clippy::cast_possible_wrap)]
    let access_exp = now.timestamp() + config.jwt_access_expiration_secs as i64;
    #[allow(clippy::cast_possible_wrap)]
    let refresh_exp = now.timestamp() + config.jwt_refresh_expiration_secs as i64;

    let claims = |token_type: &str, exp: i64, jti: Uuid| Claims {
        sub: user_id.to_string(),
        role,
        token_type: token_type.to_string(),
        exp,
        iat: now.timestamp(),
        jti: jti.to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());

    let access_token = encode(
        &Header::default(),
        &claims(ACCESS, access_exp, Uuid::new_v4()),
        &key,
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode access token: {e}"))?;

    let refresh_token = encode(
        &Header::default(),
        &claims(REFRESH, refresh_exp, refresh_jti),
        &key,
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {e}"))?;

    let refresh_expires_at =
        chrono::DateTime::from_timestamp(refresh_exp, 0).unwrap_or_else(Utc::now);

    Ok(TokenPair {
        access_token,
        refresh_token,
        refresh_jti,
        refresh_expires_at,
    })
}

fn validate_token(token: &str, secret: &str, expected_type: &str) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())
        .map_err(|e| anyhow::anyhow!("Invalid {expected_type} token: {e}"))?;

    if token_data.claims.token_type != expected_type {
        return Err(anyhow::anyhow!("Token is not an {expected_type} token"));
    }

    Ok(token_data.claims)
}

/// Validate an access token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not an access token.
pub fn validate_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    validate_token(token, secret, ACCESS)
}

/// Validate a refresh token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not a refresh token.
pub fn validate_refresh_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    validate_token(token, secret, REFRESH)
}

/// Claims for OAuth CSRF state tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub csrf: String,
    pub provider: String,
    pub redirect_uri: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Generate a short-lived JWT for OAuth CSRF state (30 minutes).
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_oauth_state(
    secret: &str,
    provider: &str,
    redirect_uri: Option<&str>,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = OAuthStateClaims {
        csrf: Uuid::new_v4().to_string(),
        provider: provider.to_string(),
        redirect_uri: redirect_uri.map(String::from),
        exp: now.timestamp() + 1800,
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode OAuth state: {e}"))
}

/// Validate an OAuth CSRF state token issued for `provider`.
///
/// # Errors
///
/// Returns an error if the state token is invalid, expired, or was issued for another provider.
pub fn validate_oauth_state(
    state: &str,
    secret: &str,
    provider: &str,
) -> anyhow::Result<OAuthStateClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<OAuthStateClaims>(state, &key, &Validation::default())
        .map_err(|e| anyhow::anyhow!("Invalid OAuth state: {e}"))?;

    if token_data.claims.provider != provider {
        return Err(anyhow::anyhow!("OAuth state was issued for another provider"));
    }

    Ok(token_data.claims)
}
