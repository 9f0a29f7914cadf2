// Upstream client for the versioned Petfinder REST API

use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::error::{AppError, AppResult, UpstreamFailure};
use crate::proxy::config::API_VERSION;

/// Status and raw body of an upstream reply, successful or not
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: String,
}

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str, http_client: Client) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build `<base>/v2<sub_path>?<query>`
    ///
    /// Query pairs are form-encoded in their original order; no `?` is added
    /// when there are none.
    pub fn build_url(&self, sub_path: &str, query: &[(String, String)]) -> AppResult<Url> {
        let raw = format!("{}/{}{}", self.base_url, API_VERSION, sub_path);

        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };

        parsed.map_err(|e| {
            AppError::UpstreamRequest(UpstreamFailure::transport(format!(
                "Invalid upstream URL {}: {}",
                raw, e
            )))
        })
    }

    /// Issue one GET with a bearer token
    ///
    /// Non-2xx replies are returned as `Ok`; only transport failures are errors.
    pub async fn get(
        &self,
        sub_path: &str,
        query: &[(String, String)],
        access_token: &str,
    ) -> AppResult<UpstreamReply> {
        let url = self.build_url(sub_path, query)?;
        tracing::info!("Upstream URL: {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamRequest(UpstreamFailure::transport(format!(
                    "HTTP request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::UpstreamRequest(UpstreamFailure::transport(format!(
                "Failed to read upstream body: {}",
                e
            )))
        })?;

        tracing::info!("Upstream response status: {}", status);
        Ok(UpstreamReply { status, body })
    }
}
