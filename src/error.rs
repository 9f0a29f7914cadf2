use std::fmt;
use thiserror::Error;

/// What an upstream endpoint reported when a call did not succeed.
/// `status` and `body` are `None` when no response was received at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    pub status: Option<u16>,
    pub body: Option<String>,
    pub message: String,
}

impl UpstreamFailure {
    /// The endpoint answered with a non-2xx status
    pub fn rejected(status: u16, body: String) -> Self {
        let body = if body.trim().is_empty() { None } else { Some(body) };
        Self {
            status: Some(status),
            body,
            message: format!("upstream returned status {}", status),
        }
    }

    /// No usable response (connect failure, timeout, malformed payload)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.body) {
            (Some(status), Some(body)) => write!(f, "{} ({}): {}", self.message, status, body),
            (Some(status), None) => write!(f, "{} ({})", self.message, status),
            _ => write!(f, "{}", self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Token exchange failed: {0}")]
    AuthExchange(UpstreamFailure),

    #[error("Upstream request failed: {0}")]
    UpstreamRequest(UpstreamFailure),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AppError {
    /// Upstream-reported details, if this error came from an upstream call
    pub fn upstream_failure(&self) -> Option<&UpstreamFailure> {
        match self {
            AppError::AuthExchange(failure) | AppError::UpstreamRequest(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

// Implement alias for Result to simplify usage
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_drops_blank_body() {
        let failure = UpstreamFailure::rejected(502, "   ".to_string());
        assert_eq!(failure.status, Some(502));
        assert_eq!(failure.body, None);
    }

    #[test]
    fn test_upstream_failure_accessor() {
        let err = AppError::AuthExchange(UpstreamFailure::rejected(401, "{}".to_string()));
        assert_eq!(err.upstream_failure().and_then(|f| f.status), Some(401));

        let err = AppError::Config("missing".to_string());
        assert!(err.upstream_failure().is_none());
    }

    #[tokio::test]
    async fn test_reqwest_error_converts_to_network() {
        fn send_error(err: reqwest::Error) -> AppResult<()> {
            Err::<(), _>(err)?;
            Ok(())
        }
        let reqwest_err = reqwest::get("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(send_error(reqwest_err), Err(AppError::Network(_))));
    }
}
