//! Mobile portal core
//!
//! Session handling and service dispatch for the portal home screen.

#![deny(dead_code)]

pub mod auth;
pub mod config;
pub mod navigation;
pub mod platform;
pub mod services;
pub mod session;
pub mod shell;

#[cfg(test)]
pub(crate) mod testing;

use auth::IdentityProvider;
use config::Environment;
use navigation::{DeepLinkResolver, ScreenStack};
use platform::{Platform, UrlOpener};
use services::{ServiceCatalog, ServiceDispatcher};
use session::{ProfileFetcher, SessionController, SessionReader, SessionStore};
use std::sync::Arc;

/// Everything the portal screens share
///
/// Screens only read the session; transitions go through `controller` and
/// the profile fetcher.
pub struct PortalState {
    pub environment: Environment,
    pub platform: Platform,
    pub catalog: Arc<ServiceCatalog>,
    pub session: SessionReader,
    pub controller: SessionController,
    pub dispatcher: ServiceDispatcher,
    pub deep_links: DeepLinkResolver,
    pub screens: Arc<ScreenStack>,
    store: SessionStore,
    provider: Arc<dyn IdentityProvider>,
}

impl PortalState {
    pub fn new(
        platform: Platform,
        catalog: ServiceCatalog,
        deep_links: DeepLinkResolver,
        provider: Arc<dyn IdentityProvider>,
        opener: Arc<dyn UrlOpener>,
    ) -> Self {
        let store = SessionStore::new();
        let screens = Arc::new(ScreenStack::new());
        Self {
            environment: Environment::Development,
            platform,
            catalog: Arc::new(catalog),
            session: store.reader(),
            controller: SessionController::new(store.clone(), provider.clone()),
            dispatcher: ServiceDispatcher::new(opener, screens.clone()),
            deep_links,
            screens,
            store,
            provider,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Profile fetcher bound to this portal's session
    pub fn profile_fetcher(&self) -> ProfileFetcher {
        ProfileFetcher::new(self.store.clone(), self.provider.clone())
    }
}
