pub mod credentials;
pub mod token;

pub use credentials::ClientCredentials;
pub use token::{CachedToken, TokenResponse};
