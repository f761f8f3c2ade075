use std::sync::Arc;

use super::store::{Epoch, SessionReader, SessionStore};
use crate::auth::provider::{IdentityProvider, ProviderError};

/// User-facing acknowledgement of a logout
///
/// Both variants leave the session anonymous; only the message differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutAck {
    LoggedOut,
    ProblemLoggingOut,
}

impl LogoutAck {
    pub fn message(self) -> &'static str {
        match self {
            LogoutAck::LoggedOut => "Logged out!",
            LogoutAck::ProblemLoggingOut => "There was a problem logging out!",
        }
    }
}

/// Drives login and logout against the identity provider
#[derive(Clone)]
pub struct SessionController {
    store: SessionStore,
    provider: Arc<dyn IdentityProvider>,
}

impl SessionController {
    pub fn new(store: SessionStore, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { store, provider }
    }

    /// Read-only view of the session this controller writes
    pub fn session(&self) -> SessionReader {
        self.store.reader()
    }

    /// Log in and install the issued credentials
    ///
    /// On failure the session is left exactly as it was and the error is
    /// returned so the user can retry.
    pub async fn login(&self) -> Result<Epoch, ProviderError> {
        tracing::info!(event = "login_start", "Login requested");

        match self.provider.login().await {
            Ok(credentials) => {
                tracing::info!(
                    event = "login_success",
                    has_refresh_token = credentials.refresh_token.is_some(),
                    has_id_token = credentials.id_token.is_some(),
                    "Login succeeded"
                );
                Ok(self.store.apply_credentials(Some(credentials)))
            }
            Err(e) => {
                tracing::warn!(
                    event = "login_failed",
                    error = %e,
                    authenticated = self.store.is_authenticated(),
                    "Login failed"
                );
                Err(e)
            }
        }
    }

    /// End the session
    ///
    /// The provider is asked to terminate its session, and whatever it
    /// answers the local credentials are cleared.
    pub async fn logout(&self) -> LogoutAck {
        tracing::info!(event = "logout_start", "Logout requested");

        let ack = match self.provider.logout().await {
            Ok(()) => LogoutAck::LoggedOut,
            Err(e) => {
                tracing::warn!(
                    event = "provider_logout_failed",
                    error = %e,
                    "Identity provider logout failed; clearing local session anyway"
                );
                LogoutAck::ProblemLoggingOut
            }
        };

        self.store.apply_credentials(None);
        tracing::info!(event = "logout_complete", ack = ?ack, "Local session cleared");
        ack
    }

    /// Drop local credentials without contacting the provider
    pub fn invalidate(&self) {
        if self.store.is_authenticated() {
            tracing::info!(event = "session_invalidated", "Credentials invalidated");
        }
        self.store.apply_credentials(None);
    }
}
