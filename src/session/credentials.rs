use oauth2::{AccessToken, RefreshToken};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Token set issued by the identity provider after a successful login
///
/// Validity is decided by the provider; nothing here is checked locally.
#[derive(Clone)]
pub struct Credentials {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub id_token: Option<String>,
    pub expires_at: Option<SystemTime>,
    pub scope: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: AccessToken::new(access_token.into()),
            refresh_token: None,
            id_token: None,
            expires_at: None,
            scope: None,
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}

// Token values must never end up in logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token_len", &self.access_token.secret().len())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("has_id_token", &self.id_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OIDC userinfo document for the logged in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sub: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Any other claims the provider returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            nickname: None,
            name: None,
            email: None,
            email_verified: None,
            picture: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}
