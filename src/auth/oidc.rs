//! OIDC identity provider
//!
//! - login: authorization code flow with PKCE, redirected to a loopback
//!   listener, code exchanged at the token endpoint
//! - fetch_user_info: `GET /userinfo` with the access token
//! - logout: opens the provider's end-session URL in the browser, which is
//!   where the provider keeps its own session cookie

use async_trait::async_trait;
use oauth2::{
    basic::{BasicErrorResponseType, BasicTokenType},
    AccessToken, AuthUrl, AuthorizationCode, ClientId, CsrfToken, EndpointSet, ExtraTokenFields,
    PkceCodeChallenge, RedirectUrl, Scope, StandardErrorResponse, StandardRevocableToken,
    StandardTokenIntrospectionResponse, StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::helpers::{
    build_authorize_url, build_logout_url, build_token_url, build_userinfo_url,
    create_http_client, verify_callback,
};
use super::loopback::CallbackListener;
use super::provider::{IdentityProvider, ProviderError};
use crate::config::Config;
use crate::platform::UrlOpener;
use crate::session::{Credentials, UserProfile};

// =============================================================================
// Types
// =============================================================================

/// Custom extra fields to capture id_token from OIDC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcTokenFields {
    pub id_token: Option<String>,
}

impl ExtraTokenFields for OidcTokenFields {}

type OidcTokenResponse = StandardTokenResponse<OidcTokenFields, BasicTokenType>;

/// Type alias for our configured OAuth client with OIDC support
type ConfiguredOAuthClient = oauth2::Client<
    StandardErrorResponse<BasicErrorResponseType>,
    OidcTokenResponse,
    StandardTokenIntrospectionResponse<OidcTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<oauth2::RevocationErrorResponseType>,
    EndpointSet,            // HasAuthUrl
    oauth2::EndpointNotSet, // HasDeviceAuthUrl
    oauth2::EndpointNotSet, // HasIntrospectionUrl
    oauth2::EndpointNotSet, // HasRevocationUrl
    EndpointSet,            // HasTokenUrl
>;

pub const DEFAULT_SCOPES: [&str; 4] = ["openid", "profile", "email", "offline_access"];

#[derive(Debug, Clone)]
pub struct OidcSettings {
    /// Provider base URL without trailing slash
    pub domain: String,
    pub client_id: String,
    pub audience: Option<String>,
    pub logout_return_to: Option<String>,
    pub scopes: Vec<String>,
    /// 0 picks a free port per login
    pub callback_port: u16,
    pub login_timeout: Duration,
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,
}

impl OidcSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            domain: config.auth_domain.clone(),
            client_id: config.client_id.clone(),
            audience: config.audience.clone(),
            logout_return_to: config.logout_return_to.clone(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            callback_port: config.callback_port,
            login_timeout: Duration::from_secs(config.login_timeout_secs),
            http_connect_timeout_secs: config.http_connect_timeout_secs,
            http_request_timeout_secs: config.http_request_timeout_secs,
        }
    }
}

// =============================================================================
// Internal Helpers
// =============================================================================

fn create_oauth_client(
    domain: &str,
    client_id: &str,
    redirect_uri: &str,
) -> Result<ConfiguredOAuthClient, ProviderError> {
    let auth_url = AuthUrl::new(build_authorize_url(domain))
        .map_err(|e| ProviderError::Configuration(format!("Invalid auth URL: {}", e)))?;

    let token_url = TokenUrl::new(build_token_url(domain))
        .map_err(|e| ProviderError::Configuration(format!("Invalid token URL: {}", e)))?;

    let redirect_url = RedirectUrl::new(redirect_uri.to_string())
        .map_err(|e| ProviderError::Configuration(format!("Invalid redirect URL: {}", e)))?;

    // Public native client: no secret, PKCE instead
    let client = oauth2::Client::new(ClientId::new(client_id.to_string()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url);

    Ok(client)
}

fn credentials_from_token(token: &OidcTokenResponse) -> Credentials {
    Credentials {
        access_token: token.access_token().clone(),
        refresh_token: token.refresh_token().cloned(),
        id_token: token.extra_fields().id_token.clone(),
        expires_at: token.expires_in().map(|ttl| SystemTime::now() + ttl),
        scope: token.scopes().map(|scopes| {
            scopes
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }),
    }
}

// =============================================================================
// Provider
// =============================================================================

pub struct OidcProvider {
    settings: OidcSettings,
    http: reqwest::Client,
    browser: Arc<dyn UrlOpener>,
}

impl OidcProvider {
    pub fn new(settings: OidcSettings, browser: Arc<dyn UrlOpener>) -> Result<Self, ProviderError> {
        let http = create_http_client(
            settings.http_connect_timeout_secs,
            settings.http_request_timeout_secs,
        )?;

        tracing::info!(
            domain = %settings.domain,
            client_id = %settings.client_id,
            has_audience = settings.audience.is_some(),
            "OIDC provider initialized"
        );

        Ok(Self {
            settings,
            http,
            browser,
        })
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    async fn login(&self) -> Result<Credentials, ProviderError> {
        let listener = CallbackListener::bind(self.settings.callback_port).await?;
        let redirect_uri = listener.redirect_uri();
        let oauth_client =
            create_oauth_client(&self.settings.domain, &self.settings.client_id, &redirect_uri)?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        // Generate authorization URL with CSRF protection
        let (auth_url, csrf_token) = {
            let mut request = oauth_client
                .authorize_url(CsrfToken::new_random)
                .set_pkce_challenge(pkce_challenge);
            for scope in &self.settings.scopes {
                request = request.add_scope(Scope::new(scope.clone()));
            }
            if let Some(audience) = &self.settings.audience {
                request = request.add_extra_param("audience", audience.as_str());
            }
            request.url()
        };

        tracing::info!(
            domain = %self.settings.domain,
            redirect_uri = %redirect_uri,
            "Opening browser for authentication"
        );
        self.browser.open_url(auth_url.as_str()).await?;

        let params = listener.wait(self.settings.login_timeout).await?;
        let code = verify_callback(params, csrf_token.secret())?;

        tracing::info!("Exchanging authorization code for tokens");
        let token_response = oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&self.http)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to exchange code for tokens");
                ProviderError::TokenExchange(e.to_string())
            })?;

        let credentials = credentials_from_token(&token_response);
        tracing::info!(
            has_id_token = credentials.id_token.is_some(),
            has_refresh_token = credentials.refresh_token.is_some(),
            "Successfully obtained access token"
        );
        Ok(credentials)
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        let logout_url = build_logout_url(
            &self.settings.domain,
            &self.settings.client_id,
            self.settings.logout_return_to.as_deref(),
        );
        tracing::info!(
            event = "provider_logout_redirect",
            domain = %self.settings.domain,
            "Opening provider end-session URL"
        );
        self.browser.open_url(&logout_url).await?;
        Ok(())
    }

    async fn fetch_user_info(
        &self,
        access_token: &AccessToken,
    ) -> Result<UserProfile, ProviderError> {
        let response = self
            .http
            .get(build_userinfo_url(&self.settings.domain))
            .bearer_auth(access_token.secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "userinfo request rejected");
            return Err(ProviderError::Rejected {
                endpoint: "userinfo",
                status: status.as_u16(),
            });
        }

        Ok(response.json::<UserProfile>().await?)
    }
}
