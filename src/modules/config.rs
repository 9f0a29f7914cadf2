use ::config::{Config, Environment};
use std::collections::HashMap;

use crate::error::AppResult;
use crate::proxy::ProxyConfig;

/// Upstream credentials and endpoints: PETFINDER_API_KEY, PETFINDER_BASE_URL, ...
const UPSTREAM_ENV_PREFIX: &str = "PETFINDER";
/// Server settings: PROXY_PORT, PROXY_ROUTE_PREFIXES, ...
const SERVER_ENV_PREFIX: &str = "PROXY";

/// Load and validate proxy config from the process environment
pub fn load_app_config() -> AppResult<ProxyConfig> {
    load_config_from(None)
}

/// Load config from an explicit variable map instead of the process environment
pub fn load_config_from(vars: Option<HashMap<String, String>>) -> AppResult<ProxyConfig> {
    let settings = Config::builder()
        .add_source(Environment::with_prefix(UPSTREAM_ENV_PREFIX).source(vars.clone()))
        .add_source(
            Environment::with_prefix(SERVER_ENV_PREFIX)
                .try_parsing(true)
                .source(vars),
        )
        .build()?;

    let config: ProxyConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
