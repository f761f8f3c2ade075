use async_trait::async_trait;
use oauth2::AccessToken;

use crate::platform::OpenError;
use crate::session::{Credentials, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("login was cancelled")]
    Cancelled,
    #[error("timed out waiting for the identity provider")]
    Timeout,
    #[error("authorization callback rejected: {0}")]
    Callback(String),
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("{endpoint} returned HTTP {status}")]
    Rejected { endpoint: &'static str, status: u16 },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not open browser: {0}")]
    Browser(#[from] OpenError),
    #[error("identity provider misconfigured: {0}")]
    Configuration(String),
    #[error("callback listener failed: {0}")]
    Listener(#[from] std::io::Error),
}

/// External identity provider
///
/// Each call is asynchronous and can fail independently of the others.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the interactive login and return the issued credentials
    async fn login(&self) -> Result<Credentials, ProviderError>;

    /// Terminate the provider-side session
    async fn logout(&self) -> Result<(), ProviderError>;

    /// Fetch the profile belonging to `access_token`
    async fn fetch_user_info(&self, access_token: &AccessToken)
        -> Result<UserProfile, ProviderError>;
}
