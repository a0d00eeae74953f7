//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file is honoured for local
//! development.

use std::env;

/// Number of entries that completes the walking challenge.
pub const DEFAULT_CHALLENGE_TARGET_DAYS: u32 = 7;
/// Maximum width (px) of a normalized image.
pub const DEFAULT_IMAGE_MAX_WIDTH: u32 = 400;
/// Lossy encode quality on a 0–1 scale.
pub const DEFAULT_IMAGE_QUALITY: f32 = 0.5;
/// Number of most recent entries shown in the distance trend.
pub const TREND_WINDOW: usize = 7;
/// Number of recent Strava activities shown on the stats card.
pub const DEFAULT_RECENT_ACTIVITY_COUNT: u32 = 2;
/// Upper bound on raw image uploads (phone photos are routinely several MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Hosted entry store; `None` runs with an in-memory store
    pub store: Option<StoreConfig>,
    /// Strava refresh-token credentials; `None` shows the fallback link
    pub strava: Option<StravaCredentials>,
    /// Public profile link shown when live stats are unavailable
    pub strava_profile_url: String,
    /// How many recent activities the stats card lists
    pub strava_recent_count: u32,
    /// Shared passphrase that opens a write session
    pub write_passphrase: String,
    /// JWT signing key for write-session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Entries needed to complete the challenge
    pub challenge_target_days: u32,
    /// Image normalization policy
    pub image: ImagePolicy,
    /// Request body limit for image uploads
    pub max_upload_bytes: usize,
}

/// Connection settings for the hosted entry table.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

/// OAuth credentials for the Strava refresh-token grant.
#[derive(Debug, Clone)]
pub struct StravaCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Bounds applied to every uploaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePolicy {
    pub max_width: u32,
    /// 0–1 scale
    pub quality: f32,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_IMAGE_MAX_WIDTH,
            quality: DEFAULT_IMAGE_QUALITY,
        }
    }
}

impl ImagePolicy {
    /// JPEG quality on the encoder's 1–100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        let q = (self.quality * 100.0).round();
        if q.is_nan() {
            return 1;
        }
        q.clamp(1.0, 100.0) as u8
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            store: None,
            strava: None,
            strava_profile_url: "https://www.strava.com".to_string(),
            strava_recent_count: DEFAULT_RECENT_ACTIVITY_COUNT,
            write_passphrase: "test_passphrase".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            challenge_target_days: DEFAULT_CHALLENGE_TARGET_DAYS,
            image: ImagePolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store = match env::var("STORE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(StoreConfig {
                url: url.trim().trim_end_matches('/').to_string(),
                api_key: env::var("STORE_API_KEY")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("STORE_API_KEY"))?,
                table: env::var("STORE_TABLE").unwrap_or_else(|_| crate::db::ENTRIES_TABLE.to_string()),
            }),
            _ => None,
        };

        let strava = match (
            env::var("STRAVA_CLIENT_ID"),
            env::var("STRAVA_CLIENT_SECRET"),
            env::var("STRAVA_REFRESH_TOKEN"),
        ) {
            (Ok(client_id), Ok(client_secret), Ok(refresh_token)) => Some(StravaCredentials {
                client_id: client_id.trim().to_string(),
                client_secret: client_secret.trim().to_string(),
                refresh_token: refresh_token.trim().to_string(),
            }),
            _ => None,
        };

        let image = ImagePolicy {
            max_width: parse_or("IMAGE_MAX_WIDTH", DEFAULT_IMAGE_MAX_WIDTH).max(1),
            quality: parse_or("IMAGE_QUALITY", DEFAULT_IMAGE_QUALITY),
        };

        Ok(Self {
            port: parse_or("PORT", 8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            store,
            strava,
            strava_profile_url: env::var("STRAVA_PROFILE_URL")
                .unwrap_or_else(|_| "https://www.strava.com".to_string()),
            strava_recent_count: parse_or("STRAVA_RECENT_COUNT", DEFAULT_RECENT_ACTIVITY_COUNT),
            write_passphrase: env::var("WRITE_PASSPHRASE")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WRITE_PASSPHRASE"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            challenge_target_days: parse_or("CHALLENGE_TARGET_DAYS", DEFAULT_CHALLENGE_TARGET_DAYS)
                .max(1),
            image,
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("WRITE_PASSPHRASE", "  open sesame ");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("CHALLENGE_TARGET_DAYS", "0");
        env::set_var("IMAGE_MAX_WIDTH", "not-a-number");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.write_passphrase, "open sesame");
        assert_eq!(config.challenge_target_days, 1);
        assert_eq!(config.image.max_width, DEFAULT_IMAGE_MAX_WIDTH);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_jpeg_quality_scale() {
        assert_eq!(ImagePolicy::default().jpeg_quality(), 50);

        let policy = ImagePolicy {
            max_width: 400,
            quality: 3.0,
        };
        assert_eq!(policy.jpeg_quality(), 100);

        let policy = ImagePolicy {
            max_width: 400,
            quality: 0.0,
        };
        assert_eq!(policy.jpeg_quality(), 1);
    }
}
