//! Identity provider integration
//!
//! ## Structure
//!
//! - `provider`: the `IdentityProvider` trait the session core talks to
//! - `oidc`: OAuth2/OIDC binding (authorization code + PKCE, userinfo, end-session)
//! - `loopback`: one-shot HTTP listener receiving the authorization redirect
//! - `helpers`: pure helper functions (URL builders, HTTP client, callback checks)
//!
//! ## Login Flow
//!
//! 1. Portal binds `127.0.0.1:<port>/callback` and opens `/authorize` in the browser
//! 2. Provider authenticates → browser redirects to the loopback callback
//! 3. Portal verifies CSRF state and exchanges the code (with PKCE verifier) for tokens
//! 4. Credentials go into the session store; the profile fetcher picks them up

pub mod helpers;
pub mod loopback;
pub mod oidc;
pub mod provider;

pub use helpers::{build_logout_url, create_http_client, verify_callback, CallbackParams};
pub use loopback::CallbackListener;
pub use oidc::{OidcProvider, OidcSettings};
pub use provider::{IdentityProvider, ProviderError};
