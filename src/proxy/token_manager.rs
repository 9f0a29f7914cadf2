use reqwest::Client;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::{CachedToken, ClientCredentials};

/// Process-wide bearer token cache for the upstream API
///
/// The cache lock is released before a token exchange starts, so two requests
/// that both find the token expired may both exchange. Each exchange yields a
/// complete token and the later write wins; nothing is corrupted and at worst
/// one extra exchange happens.
pub struct TokenManager {
    http_client: Client,
    token_url: String,
    credentials: ClientCredentials,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    /// Create new TokenManager
    pub fn new(http_client: Client, token_url: String, credentials: ClientCredentials) -> Self {
        Self {
            http_client,
            token_url,
            credentials,
            cached: RwLock::new(None),
        }
    }

    /// Get a valid bearer token, exchanging credentials when the cache is empty or expired
    pub async fn get_valid_token(&self) -> AppResult<String> {
        self.valid_token_at(chrono::Utc::now().timestamp_millis()).await
    }

    /// `get_valid_token` against an explicit clock (Unix epoch milliseconds)
    pub async fn valid_token_at(&self, now_ms: i64) -> AppResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(now_ms)) {
                return Ok(token.value.clone());
            }
        }

        tracing::info!("No valid cached token, requesting a new one...");

        // Failures propagate without touching the cache
        let token_response = crate::modules::oauth::request_client_credentials(
            &self.http_client,
            &self.token_url,
            &self.credentials,
        )
        .await?;

        let token = CachedToken::from_response(token_response, now_ms);
        let value = token.value.clone();

        let mut cached = self.cached.write().await;
        *cached = Some(token);

        Ok(value)
    }

    /// Snapshot of the current cache entry
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cached.read().await.clone()
    }

    /// Whether a token is cached and still valid right now
    pub async fn has_valid_token(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.cached
            .read()
            .await
            .as_ref()
            .map_or(false, |t| t.is_valid_at(now))
    }

    /// Drop the cached token; the next call exchanges again
    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        if cached.take().is_some() {
            tracing::info!("Cached token invalidated");
        }
    }
}
