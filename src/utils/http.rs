use reqwest::{Client, Proxy};

use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!("petfinder-proxy/", env!("CARGO_PKG_VERSION"));

/// Parse an outbound proxy address (http://, https://, socks5://)
pub fn parse_proxy(url: &str) -> AppResult<Proxy> {
    Proxy::all(url)
        .map_err(|e| AppError::Config(format!("Invalid upstream proxy address {}: {}", url, e)))
}

/// Create an HTTP client with the given timeout and optional outbound proxy
///
/// A proxy that was configured but cannot be used is an error, never a
/// silent fallback to direct traffic.
pub fn create_client_with_proxy(timeout_secs: u64, proxy_url: Option<&str>) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT);

    if let Some(url) = proxy_url.filter(|u| !u.trim().is_empty()) {
        builder = builder.proxy(parse_proxy(url)?);
        tracing::info!("HTTP client upstream proxy enabled: {}", url);
    }

    Ok(builder.build()?)
}
