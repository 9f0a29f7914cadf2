use reqwest::Client;

use crate::error::{AppError, AppResult, UpstreamFailure};
use crate::models::{ClientCredentials, TokenResponse};

/// Exchange client credentials for a bearer token
///
/// Single attempt: a rejection or transport failure is returned as
/// `AppError::AuthExchange` with whatever status/body the endpoint sent.
pub async fn request_client_credentials(
    client: &Client,
    token_url: &str,
    credentials: &ClientCredentials,
) -> AppResult<TokenResponse> {
    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
    ];

    tracing::info!(
        "Requesting token with client_id: {}",
        crate::models::credentials::mask_secret(&credentials.client_id)
    );

    let response = client
        .post(token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| {
            AppError::AuthExchange(UpstreamFailure::transport(format!(
                "Token exchange request failed: {}",
                e
            )))
        })?;

    let status = response.status();
    if status.is_success() {
        let token_res = response.json::<TokenResponse>().await.map_err(|e| {
            AppError::AuthExchange(UpstreamFailure::transport(format!(
                "Token parsing failed: {}",
                e
            )))
        })?;

        if token_res.lifetime_ms().is_none() {
            return Err(AppError::AuthExchange(UpstreamFailure::transport(format!(
                "Token endpoint reported an unusable expires_in: {}",
                token_res.expires_in
            ))));
        }

        tracing::info!(
            "Token exchange successful! Expires in: {} seconds",
            token_res.expires_in
        );
        Ok(token_res)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Token exchange rejected with {}: {}", status, error_text);
        Err(AppError::AuthExchange(UpstreamFailure::rejected(
            status.as_u16(),
            error_text,
        )))
    }
}
