//! Pure helper functions for authentication
//!
//! URL builders, HTTP client construction and authorization callback checks.
//! Nothing here performs I/O.

use serde::Deserialize;
use std::time::Duration;

use super::provider::ProviderError;

// =============================================================================
// HTTP Client Builders
// =============================================================================

/// Create a reqwest client for OAuth2 HTTP requests using config timeouts
pub fn create_http_client(
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none()) // token endpoint must not redirect
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(request_timeout_secs))
        .build()
}

// =============================================================================
// URL Builders
// =============================================================================

pub fn build_authorize_url(domain: &str) -> String {
    format!("{}/authorize", domain)
}

pub fn build_token_url(domain: &str) -> String {
    format!("{}/oauth/token", domain)
}

pub fn build_userinfo_url(domain: &str) -> String {
    format!("{}/userinfo", domain)
}

/// Loopback redirect URI the browser returns the authorization code to
pub fn build_loopback_redirect_uri(port: u16) -> String {
    format!("http://127.0.0.1:{}/callback", port)
}

/// Build the provider's end-session URL
///
/// `returnTo` is only sent when configured; the provider otherwise shows its
/// own logged-out page.
pub fn build_logout_url(domain: &str, client_id: &str, return_to: Option<&str>) -> String {
    let mut url = format!(
        "{}/v2/logout?client_id={}",
        domain,
        urlencoding::encode(client_id)
    );
    if let Some(return_to) = return_to.filter(|r| !r.trim().is_empty()) {
        url.push_str("&returnTo=");
        url.push_str(&urlencoding::encode(return_to));
    }
    url
}

// =============================================================================
// Authorization Callback
// =============================================================================

/// Query parameters delivered to the loopback redirect
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Validate a callback and return its authorization code
///
/// Rejects provider errors, missing or mismatched CSRF state, and a missing
/// code, in that order.
pub fn verify_callback(params: CallbackParams, expected_state: &str) -> Result<String, ProviderError> {
    if let Some(error) = params.error {
        tracing::warn!(
            error = %error,
            description = ?params.error_description,
            "OAuth authorization failed"
        );
        if error == "access_denied" {
            return Err(ProviderError::Cancelled);
        }
        return Err(ProviderError::Callback(match params.error_description {
            Some(description) => format!("{}: {}", error, description),
            None => error,
        }));
    }

    let Some(state) = params.state else {
        tracing::warn!("CSRF validation failed: No state parameter in callback");
        return Err(ProviderError::Callback("missing state parameter".to_string()));
    };

    if state != expected_state {
        tracing::warn!("CSRF validation failed: State mismatch");
        return Err(ProviderError::Callback("state mismatch".to_string()));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("No authorization code received");
        return Err(ProviderError::Callback(
            "missing authorization code".to_string(),
        ));
    };

    tracing::debug!(code_length = code.len(), "Authorization code received");
    Ok(code)
}

// =============================================================================
// Tests
// =============================================================================
