//! Bearer token helpers.
//!
//! Access tokens are HS256 JWTs signed with a shared secret. Issuance normally
//! happens in the identity service; [`issue_token`] exists for the CLI and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ACCESS_TOKEN_TYPE: &str = "access";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingCredentials,
    #[error("authorization header is not a bearer credential")]
    MalformedHeader,
    #[error("token expired")]
    Expired,
    #[error("token has wrong type {0:?}")]
    WrongTokenType(String),
    #[error("invalid token: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    pub access_ttl_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>, access_ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_minutes,
        }
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub token_type: String,
    pub jti: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// The identity a validated bearer token vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
}

pub fn issue_token(subject: &str, config: &AuthConfig) -> jsonwebtoken::errors::Result<String> {
    issue_token_with_ttl(
        subject,
        ACCESS_TOKEN_TYPE,
        Duration::minutes(config.access_ttl_minutes),
        config,
    )
}

pub fn issue_token_with_ttl(
    subject: &str,
    token_type: &str,
    ttl: Duration,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now.checked_add_signed(ttl).unwrap_or(now).timestamp().max(0) as usize;
    let claims = AccessClaims {
        sub: subject.to_string(),
        token_type: token_type.to_string(),
        jti: Uuid::new_v4(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(token: &str, config: &AuthConfig) -> Result<AccessClaims, AuthError> {
    let claims = jsonwebtoken::decode::<AccessClaims>(
        token,
        &config.decoding_key(),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        JwtErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid(err.to_string()),
    })?;
    if claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(AuthError::WrongTokenType(claims.token_type));
    }
    Ok(claims)
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;
    let (scheme, rest) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = rest.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Full gate: header → token → validated principal.
pub fn authenticate(header: Option<&str>, config: &AuthConfig) -> Result<Principal, AuthError> {
    let token = bearer_token(header)?;
    let claims = decode_token(token, config)?;
    Ok(Principal { subject: claims.sub })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(b"0123456789abcdef0123456789abcdef".to_vec(), 15)
    }

    #[test]
    fn issued_token_round_trips() {
        let cfg = config();
        let token = issue_token("admin", &cfg).unwrap();
        let claims = decode_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("admin", &config()).unwrap();
        let other = AuthConfig::new(b"another-secret-another-secret-xx".to_vec(), 15);
        assert!(matches!(decode_token(&token, &other), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = config();
        let token =
            issue_token_with_ttl("admin", ACCESS_TOKEN_TYPE, Duration::hours(-2), &cfg).unwrap();
        assert_eq!(decode_token(&token, &cfg), Err(AuthError::Expired));
    }

    #[test]
    fn refresh_tokens_do_not_grant_access() {
        let cfg = config();
        let token = issue_token_with_ttl("admin", "refresh", Duration::hours(1), &cfg).unwrap();
        assert_eq!(
            decode_token(&token, &cfg),
            Err(AuthError::WrongTokenType("refresh".into()))
        );
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(Some("bearer   abc")), Ok("abc"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingCredentials));
        assert_eq!(bearer_token(Some("Basic Zm9vOmJhcg==")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::MalformedHeader));
        assert_eq!(bearer_token(Some("Bearer a b")), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn authenticate_yields_subject() {
        let cfg = config();
        let token = issue_token("hr-admin", &cfg).unwrap();
        let header = format!("Bearer {token}");
        let principal = authenticate(Some(&header), &cfg).unwrap();
        assert_eq!(principal.subject, "hr-admin");
        assert!(authenticate(Some("Bearer garbage"), &cfg).is_err());
    }
}
