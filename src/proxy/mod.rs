// proxy module - API reverse proxy service

pub mod config;
pub mod server;
pub mod token_manager;

pub mod common; // Common tools
pub mod handlers; // API endpoint handlers
pub mod middleware; // Axum middleware
pub mod upstream; // Upstream client

pub use self::config::ProxyConfig;
pub use handlers::forward::{ForwardingProxy, ProxyRequest, ProxyResponse};
pub use server::AxumServer;
pub use token_manager::TokenManager;
