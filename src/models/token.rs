use serde::{Deserialize, Serialize};

/// Tokens are treated as expired this long before the upstream says they are,
/// so a token never runs out while a forwarded request is in flight.
pub const EXPIRY_SAFETY_MARGIN_MS: i64 = 60_000;

/// Upper bound on a cached token's lifetime, whatever the upstream reports
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Token endpoint response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64, // Seconds
    #[serde(default)]
    pub token_type: String,
}

impl TokenResponse {
    /// Reported lifetime in milliseconds; `None` when negative or not representable
    pub fn lifetime_ms(&self) -> Option<i64> {
        if self.expires_in < 0 {
            return None;
        }
        self.expires_in.checked_mul(1000)
    }
}

/// Bearer token held by the token manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at_ms: i64, // Unix epoch milliseconds
}

impl CachedToken {
    /// Lifetime is clamped to `0..=MAX_TOKEN_LIFETIME_SECS`
    pub fn new(value: String, expires_in_secs: i64, issued_at_ms: i64) -> Self {
        let lifetime_ms = expires_in_secs.clamp(0, MAX_TOKEN_LIFETIME_SECS) * 1000;
        Self {
            value,
            expires_at_ms: issued_at_ms
                .saturating_add(lifetime_ms)
                .saturating_sub(EXPIRY_SAFETY_MARGIN_MS),
        }
    }

    pub fn from_response(response: TokenResponse, issued_at_ms: i64) -> Self {
        Self::new(response.access_token, response.expires_in, issued_at_ms)
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.value.is_empty() && now_ms < self.expires_at_ms
    }
}
