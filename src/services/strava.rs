// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for the read-only stats card.
//!
//! Handles:
//! - Refresh-token grant for a short-lived bearer token
//! - Athlete lookup, run totals and recent activities
//! - Token caching with a refresh margin
//! - Degrading to a static profile link when anything goes wrong

use crate::config::{Config, StravaCredentials};
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const API_BASE_URL: &str = "https://www.strava.com/api/v3";
const OAUTH_BASE_URL: &str = "https://www.strava.com/oauth";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base_url: String,
    oauth_base_url: String,
    credentials: StravaCredentials,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(credentials: StravaCredentials) -> Self {
        Self::with_base_urls(credentials, API_BASE_URL, OAUTH_BASE_URL)
    }

    /// Client pointed at other endpoints (tests use a local mock server).
    pub fn with_base_urls(
        credentials: StravaCredentials,
        api_base_url: impl Into<String>,
        oauth_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            oauth_base_url: oauth_base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Exchange the configured refresh token for an access token.
    pub async fn refresh_token(&self) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base_url))
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaAuth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Strava token refresh failed");
            return Err(AppError::StravaAuth(format!(
                "Token refresh failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaAuth(format!("Failed to parse token response: {}", e)))
    }

    /// Get authenticated athlete profile.
    pub async fn get_athlete(&self, access_token: &str) -> Result<StravaAthlete, AppError> {
        let url = format!("{}/athlete", self.api_base_url);
        self.get_json(&url, access_token).await
    }

    /// Lifetime, year-to-date and recent totals for an athlete.
    pub async fn get_athlete_stats(
        &self,
        access_token: &str,
        athlete_id: u64,
    ) -> Result<AthleteStats, AppError> {
        let url = format!("{}/athletes/{}/stats", self.api_base_url, athlete_id);
        self.get_json(&url, access_token).await
    }

    /// Most recent activities, newest first.
    pub async fn list_recent_activities(
        &self,
        access_token: &str,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>, AppError> {
        let url = format!("{}/athlete/activities", self.api_base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("per_page", per_page.to_string())])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub expires_at: i64,
}

/// Authenticated athlete.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
}

/// Athlete totals. Only the lifetime run totals are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AthleteStats {
    #[serde(default)]
    pub all_run_totals: ActivityTotals,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityTotals {
    #[serde(default)]
    pub count: u32,
    /// Metres
    #[serde(default)]
    pub distance: f64,
}

/// Summary activity for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Metres
    #[serde(default)]
    pub distance: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - stats card with token management
// ─────────────────────────────────────────────────────────────────────────────

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Cached access token with expiry information.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Stats card shown next to the journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum StravaCard {
    #[serde(rename_all = "camelCase")]
    Live {
        run_count: u32,
        /// Kilometres, one decimal place
        run_distance_km: f64,
        recent: Vec<RecentActivity>,
        profile_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Unavailable { profile_url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecentActivity {
    pub id: u64,
    pub name: String,
    pub distance_km: f64,
}

/// High-level Strava service that manages the token lifecycle.
///
/// A single bearer token is cached until shortly before it expires. The
/// cache lock is held across the refresh call so concurrent requests share
/// one refresh.
#[derive(Clone)]
pub struct StravaService {
    client: Option<StravaClient>,
    profile_url: String,
    recent_count: u32,
    token_cache: Arc<Mutex<Option<CachedToken>>>,
}

impl StravaService {
    /// Create a service from configuration. Without credentials every card
    /// is the fallback link.
    pub fn new(config: &Config) -> Self {
        Self::with_client(
            config.strava.clone().map(StravaClient::new),
            config.strava_profile_url.clone(),
            config.strava_recent_count,
        )
    }

    pub fn with_client(client: Option<StravaClient>, profile_url: String, recent_count: u32) -> Self {
        Self {
            client,
            profile_url,
            recent_count,
            token_cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&StravaClient, AppError> {
        self.client.as_ref().ok_or(AppError::CredentialsMissing)
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expired) access token, refreshing if needed.
    pub async fn get_valid_access_token(&self) -> Result<String, AppError> {
        let client = self.client()?;
        let mut cache = self.token_cache.lock().await;

        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        if let Some(cached) = cache.as_ref() {
            if Utc::now() + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let refreshed = client.refresh_token().await?;
        let expires_at = DateTime::from_timestamp(refreshed.expires_at, 0).unwrap_or_default();
        *cache = Some(CachedToken {
            access_token: refreshed.access_token.clone(),
            expires_at,
        });

        tracing::info!(expires_at = %expires_at, "Strava token refreshed and cached");
        Ok(refreshed.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token_cache.lock().await = None;
    }

    // ─── Stats Card ──────────────────────────────────────────────────────────

    /// Build the stats card. Never fails: any problem yields the fallback.
    pub async fn fetch_card(&self) -> StravaCard {
        match self.fetch_live().await {
            Ok(card) => card,
            Err(e) => {
                if !matches!(e, AppError::CredentialsMissing) {
                    tracing::warn!(error = %e, "Strava stats unavailable, using profile link");
                }
                StravaCard::Unavailable {
                    profile_url: self.profile_url.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_live(&self) -> Result<StravaCard, AppError> {
        let stats = match self.fetch_stats().await {
            Err(e) if e.is_strava_token_error() => {
                tracing::info!(error = %e, "Strava token rejected, retrying with a fresh token");
                self.invalidate_token().await;
                self.fetch_stats().await?
            }
            other => other?,
        };

        let recent = match self.fetch_recent().await {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch recent Strava activities");
                Vec::new()
            }
        };

        Ok(StravaCard::Live {
            run_count: stats.all_run_totals.count,
            run_distance_km: metres_to_km(stats.all_run_totals.distance),
            recent,
            profile_url: self.profile_url.clone(),
        })
    }

    async fn fetch_stats(&self) -> Result<AthleteStats, AppError> {
        let client = self.client()?;
        let access_token = self.get_valid_access_token().await?;
        let athlete = client.get_athlete(&access_token).await?;
        client.get_athlete_stats(&access_token, athlete.id).await
    }

    async fn fetch_recent(&self) -> Result<Vec<RecentActivity>, AppError> {
        let client = self.client()?;
        let access_token = self.get_valid_access_token().await?;
        let activities = client
            .list_recent_activities(&access_token, self.recent_count)
            .await?;

        Ok(activities
            .into_iter()
            .take(self.recent_count as usize)
            .map(|activity| RecentActivity {
                id: activity.id,
                name: activity.name,
                distance_km: metres_to_km(activity.distance),
            })
            .collect())
    }
}

/// Metres to kilometres, one decimal place.
fn metres_to_km(metres: f64) -> f64 {
    (metres / 100.0).round() / 10.0
}
