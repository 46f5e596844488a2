use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use platform_authn::AuthConfig;

const MIN_SECRET_BYTES: usize = 32;
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 60;

#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: Vec<u8>,
    pub access_ttl_minutes: i64,
    pub cors_allowed_origins: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET_BASE64").context("JWT_SECRET_BASE64 missing")?;
        let jwt_secret = decode_secret(&secret)?;

        let access_ttl_minutes = match std::env::var("ACCESS_TOKEN_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| anyhow!("ACCESS_TOKEN_TTL_MINUTES must be a positive integer"))?,
            Err(_) => DEFAULT_ACCESS_TTL_MINUTES,
        };

        let cors_allowed_origins =
            parse_origins(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        Ok(Self {
            jwt_secret,
            access_ttl_minutes,
            cors_allowed_origins,
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.jwt_secret.clone(), self.access_ttl_minutes)
    }
}

fn decode_secret(raw: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(raw.trim())
        .context("invalid JWT_SECRET_BASE64")?;
    if bytes.len() < MIN_SECRET_BYTES {
        return Err(anyhow!(
            "JWT_SECRET_BASE64 must decode to at least {MIN_SECRET_BYTES} bytes"
        ));
    }
    Ok(bytes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
