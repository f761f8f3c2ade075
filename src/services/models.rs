use serde::{Deserialize, Serialize};

use crate::navigation::Route;
use crate::platform::Platform;

/// One destination reachable from the portal home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// Stable identifier
    pub service_id: u32,
    /// Display name, also the default navigation key
    pub service_name: String,
    /// Web URL, used directly or as the fallback for platform links
    pub service_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios_url: Option<String>,
    pub enabled: bool,
    /// Screen to open when no platform link applies; defaults to the screen
    /// registered under `service_name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

impl ServiceEntry {
    pub fn new(service_id: u32, service_name: &str, service_url: &str) -> Self {
        Self {
            service_id,
            service_name: service_name.to_string(),
            service_url: service_url.to_string(),
            android_url: None,
            ios_url: None,
            enabled: true,
            route: None,
        }
    }

    pub fn with_android_url(mut self, uri: &str) -> Self {
        self.android_url = Some(uri.to_string());
        self
    }

    pub fn with_ios_url(mut self, uri: &str) -> Self {
        self.ios_url = Some(uri.to_string());
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Platform-specific URI override for `platform`, if any
    pub fn platform_url(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Android => self.android_url.as_deref(),
            Platform::Ios => self.ios_url.as_deref(),
            Platform::Other => None,
        }
    }

    pub fn has_platform_url(&self) -> bool {
        self.android_url.is_some() || self.ios_url.is_some()
    }

    /// In-app screen this entry navigates to
    pub fn target_route(&self) -> Option<Route> {
        self.route
            .or_else(|| Route::from_screen_name(&self.service_name))
    }
}
