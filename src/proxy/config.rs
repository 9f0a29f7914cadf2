use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::ClientCredentials;

/// Upstream API version segment
pub const API_VERSION: &str = "v2";

/// Reverse proxy configuration, populated from the environment at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Petfinder client id (PETFINDER_API_KEY), required
    #[serde(default)]
    pub api_key: Option<String>,

    /// Petfinder client secret (PETFINDER_API_SECRET), required
    #[serde(default, skip_serializing)]
    pub api_secret: Option<String>,

    /// Upstream API origin, without the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Token endpoint; derived from base_url when unset
    #[serde(default)]
    pub token_url: Option<String>,

    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to allow LAN access
    /// - false: local only 127.0.0.1 (default)
    /// - true: bind 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Routing prefixes stripped from inbound paths, first match wins.
    /// From the environment as a comma-separated list (PROXY_ROUTE_PREFIXES).
    #[serde(
        default = "default_route_prefixes",
        deserialize_with = "deserialize_prefixes"
    )]
    pub route_prefixes: Vec<String>,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Outbound proxy for upstream traffic (http://, https://, socks5://)
    #[serde(default)]
    pub upstream_proxy_url: Option<String>,

    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: default_base_url(),
            token_url: None,
            port: default_port(),
            allow_lan_access: false,
            route_prefixes: default_route_prefixes(),
            request_timeout: default_request_timeout(),
            upstream_proxy_url: None,
            log_dir: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.petfinder.com".to_string()
}

fn default_port() -> u16 {
    8888
}

/// Netlify function path and the `/api` path used by the local dev server
fn default_route_prefixes() -> Vec<String> {
    vec![
        "/.netlify/functions/petfinder-proxy".to_string(),
        "/api".to_string(),
    ]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_prefixes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(list) => list.split(',').map(str::to_string).collect(),
        OneOrMany::Many(items) => items,
    };

    Ok(raw
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect())
}

fn default_request_timeout() -> u64 {
    120
}

impl ProxyConfig {
    /// Get the actual listening address
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }

    /// Upstream origin with any trailing slash removed
    pub fn upstream_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn get_token_url(&self) -> String {
        match self.token_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}/{}/oauth2/token", self.upstream_base(), API_VERSION),
        }
    }

    /// Client credentials; missing or blank values are fatal
    pub fn credentials(&self) -> AppResult<ClientCredentials> {
        let client_id = non_blank(self.api_key.as_deref());
        let client_secret = non_blank(self.api_secret.as_deref());

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(ClientCredentials::new(id, secret)),
            (None, Some(_)) => Err(AppError::Config(
                "PETFINDER_API_KEY is not set".to_string(),
            )),
            (Some(_), None) => Err(AppError::Config(
                "PETFINDER_API_SECRET is not set".to_string(),
            )),
            (None, None) => Err(AppError::Config(
                "PETFINDER_API_KEY and PETFINDER_API_SECRET are not set".to_string(),
            )),
        }
    }

    /// Check everything that would otherwise fail later at request time
    pub fn validate(&self) -> AppResult<()> {
        self.credentials()?;

        url::Url::parse(self.upstream_base())
            .map_err(|e| AppError::Config(format!("Invalid base_url {}: {}", self.base_url, e)))?;
        let token_url = self.get_token_url();
        url::Url::parse(&token_url)
            .map_err(|e| AppError::Config(format!("Invalid token_url {}: {}", token_url, e)))?;

        if let Some(prefix) = self.route_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(AppError::Config(format!(
                "route prefix must start with '/': {}",
                prefix
            )));
        }

        if self.request_timeout == 0 {
            return Err(AppError::Config(
                "request_timeout must be at least 1 second".to_string(),
            ));
        }

        if let Some(proxy_url) = non_blank(self.upstream_proxy_url.as_deref()) {
            crate::utils::http::parse_proxy(proxy_url)?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
