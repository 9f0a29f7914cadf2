pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // Proxy service module
pub mod utils;

use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

use models::credentials::mask_secret;
use modules::logger;
use proxy::upstream::client::UpstreamClient;
use proxy::{AxumServer, ForwardingProxy, ProxyConfig, TokenManager};

/// Wire the token manager, upstream client and forwarding proxy from config
pub fn build_proxy(config: &ProxyConfig) -> error::AppResult<Arc<ForwardingProxy>> {
    let credentials = config.credentials()?;
    let http_client = utils::http::create_client_with_proxy(
        config.request_timeout,
        config.upstream_proxy_url.as_deref(),
    )?;

    let token_manager = Arc::new(TokenManager::new(
        http_client.clone(),
        config.get_token_url(),
        credentials,
    ));
    let upstream = Arc::new(UpstreamClient::new(config.upstream_base(), http_client));

    Ok(Arc::new(ForwardingProxy::new(
        token_manager,
        upstream,
        config.route_prefixes.clone(),
    )))
}

/// Load config, start the proxy server and run until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    // Fail before anything binds if the secrets are missing
    let config = modules::config::load_app_config().context("Failed to load proxy configuration")?;

    logger::init_logger(config.log_dir.as_deref());

    info!(
        "Credentials loaded: client_id {}, client_secret {}",
        mask_secret(config.api_key.as_deref().unwrap_or_default()),
        mask_secret(config.api_secret.as_deref().unwrap_or_default())
    );
    info!(
        "Forwarding {}/* to {}/{}",
        config.route_prefixes.join(", "),
        config.upstream_base(),
        proxy::config::API_VERSION
    );

    let forwarding_proxy = build_proxy(&config)?;

    let (server, handle) = AxumServer::start(config.get_bind_address(), config.port, forwarding_proxy)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start Axum server: {}", e))?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            server.stop();
        }
        res = handle => {
            res.context("Proxy server task failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_proxy_requires_credentials() {
        assert!(build_proxy(&ProxyConfig::default()).is_err());

        let config = ProxyConfig {
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            ..ProxyConfig::default()
        };
        assert!(build_proxy(&config).is_ok());
    }

    #[test]
    fn test_build_proxy_rejects_bad_upstream_proxy() {
        let config = ProxyConfig {
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            upstream_proxy_url: Some("not a url".to_string()),
            ..ProxyConfig::default()
        };
        assert!(matches!(
            build_proxy(&config),
            Err(error::AppError::Config(_))
        ));
    }
}
