//! Service dispatch
//!
//! Turns a tap on a service into exactly one action, in priority order:
//!
//! 1. disabled entries do nothing
//! 2. on Android, an `androidUrl` is opened, falling back once to the web URL
//! 3. on iOS, the same with `iosUrl`
//! 4. anything else navigates to the entry's in-app screen

use std::sync::Arc;

use super::models::ServiceEntry;
use crate::navigation::{Navigator, Route};
use crate::platform::{OpenError, Platform, UrlOpener};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Entry is disabled; nothing happened
    Disabled,
    Navigated(Route),
    /// Platform link opened
    Opened { uri: String },
    /// Platform link failed, web URL opened instead
    FellBack { uri: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("could not open '{service}': {primary}; fallback also failed: {fallback}")]
    OpenFailed {
        service: String,
        primary: OpenError,
        fallback: OpenError,
    },
    #[error("no screen registered for service '{service}'")]
    MissingRoute { service: String },
}

#[derive(Clone)]
pub struct ServiceDispatcher {
    opener: Arc<dyn UrlOpener>,
    navigator: Arc<dyn Navigator>,
}

impl ServiceDispatcher {
    pub fn new(opener: Arc<dyn UrlOpener>, navigator: Arc<dyn Navigator>) -> Self {
        Self { opener, navigator }
    }

    pub async fn dispatch(
        &self,
        entry: &ServiceEntry,
        platform: Platform,
    ) -> Result<DispatchOutcome, DispatchError> {
        if !entry.enabled {
            // The control is already disabled in the UI
            tracing::debug!(
                event = "dispatch_disabled",
                service_id = entry.service_id,
                "Ignoring disabled service"
            );
            return Ok(DispatchOutcome::Disabled);
        }

        if let Some(uri) = entry.platform_url(platform) {
            return self.open_with_fallback(entry, platform, uri).await;
        }

        let Some(route) = entry.target_route() else {
            tracing::error!(
                event = "dispatch_missing_route",
                service_id = entry.service_id,
                service_name = %entry.service_name,
                platform = %platform,
                "Service has no registered screen - catalog and route table disagree"
            );
            return Err(DispatchError::MissingRoute {
                service: entry.service_name.clone(),
            });
        };

        self.navigator.navigate(route);
        tracing::info!(
            event = "dispatch_navigate",
            service_id = entry.service_id,
            route = %route,
            "Navigated to service screen"
        );
        Ok(DispatchOutcome::Navigated(route))
    }

    async fn open_with_fallback(
        &self,
        entry: &ServiceEntry,
        platform: Platform,
        uri: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let primary = match self.opener.open_url(uri).await {
            Ok(()) => {
                tracing::info!(
                    event = "dispatch_open",
                    service_id = entry.service_id,
                    platform = %platform,
                    uri = %uri,
                    "Opened platform link"
                );
                return Ok(DispatchOutcome::Opened {
                    uri: uri.to_string(),
                });
            }
            Err(e) => e,
        };

        tracing::info!(
            event = "dispatch_fallback",
            service_id = entry.service_id,
            platform = %platform,
            uri = %uri,
            error = %primary,
            fallback = %entry.service_url,
            "Platform link failed, falling back to web URL"
        );

        match self.opener.open_url(&entry.service_url).await {
            Ok(()) => Ok(DispatchOutcome::FellBack {
                uri: entry.service_url.clone(),
            }),
            Err(fallback) => {
                tracing::warn!(
                    event = "dispatch_failed",
                    service_id = entry.service_id,
                    primary_error = %primary,
                    fallback_error = %fallback,
                    "Could not open service"
                );
                Err(DispatchError::OpenFailed {
                    service: entry.service_name.clone(),
                    primary,
                    fallback,
                })
            }
        }
    }
}
