//! Service catalog
//!
//! Built once at startup, validated, and never mutated afterwards.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use super::models::ServiceEntry;
use crate::navigation::Route;

/// Where the catalog came from (for logging only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    EnvJson,
    FilePath,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Builtin => write!(f, "builtin"),
            CatalogSource::EnvJson => write!(f, "PORTAL_CATALOG_JSON"),
            CatalogSource::FilePath => write!(f, "PORTAL_CATALOG_PATH"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog has no services")]
    Empty,
    #[error("duplicate serviceId {0}")]
    DuplicateId(u32),
    #[error("duplicate serviceName '{0}'")]
    DuplicateName(String),
    #[error("service '{service}' has an invalid {field}: '{value}'")]
    InvalidUrl {
        service: String,
        field: &'static str,
        value: String,
    },
    #[error("service '{0}' is enabled but has neither a platform link nor a registered screen")]
    Unrouted(String),
    #[error("failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read catalog file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    services: Vec<ServiceEntry>,
}

/// Non-sensitive catalog overview for startup logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub total_services: usize,
    pub enabled_services: usize,
    pub linked_services: usize,
}

#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    entries: Vec<ServiceEntry>,
}

impl ServiceCatalog {
    /// Build a catalog, rejecting entries that could not be dispatched
    pub fn new(entries: Vec<ServiceEntry>) -> Result<Self, CatalogError> {
        validate(&entries)?;
        Ok(Self { entries })
    }

    /// The portal's own service table
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(vec![
            ServiceEntry::new(1, "Salesline", "http://salesline.quantaco.co"),
            ServiceEntry::new(2, "Cashup", "http://cashup.quantaco.co"),
            ServiceEntry::new(3, "Compliance", "http://compliance.quantaco.co")
                .with_route(Route::Comply),
            ServiceEntry::new(4, "Hospitality Platform", "http://compliance.quantaco.co")
                .disabled(),
            ServiceEntry::new(5, "Slack (Android)", "https://slack.com")
                .with_android_url("slack://open"),
            ServiceEntry::new(6, "Send Mail (ios)", "https://gmail.com")
                .with_ios_url("mailto:example@quantaco.co"),
        ])
    }

    /// Parse `{"services": [...]}`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::new(document.services)
    }

    pub fn from_file(path: &str) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// All services in display order
    pub fn list(&self) -> &[ServiceEntry] {
        &self.entries
    }

    /// Look up a service by display name
    pub fn resolve(&self, name: &str) -> Option<&ServiceEntry> {
        self.entries.iter().find(|e| e.service_name == name)
    }

    pub fn get(&self, service_id: u32) -> Option<&ServiceEntry> {
        self.entries.iter().find(|e| e.service_id == service_id)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            total_services: self.entries.len(),
            enabled_services: self.entries.iter().filter(|e| e.enabled).count(),
            linked_services: self.entries.iter().filter(|e| e.has_platform_url()).count(),
        }
    }
}

fn validate(entries: &[ServiceEntry]) -> Result<(), CatalogError> {
    if entries.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();

    for entry in entries {
        if !ids.insert(entry.service_id) {
            return Err(CatalogError::DuplicateId(entry.service_id));
        }
        if !names.insert(entry.service_name.as_str()) {
            return Err(CatalogError::DuplicateName(entry.service_name.clone()));
        }

        check_url(entry, "serviceUrl", Some(&entry.service_url))?;
        check_url(entry, "androidUrl", entry.android_url.as_ref())?;
        check_url(entry, "iosUrl", entry.ios_url.as_ref())?;

        // Entries without any platform link always navigate in-app
        if entry.enabled && !entry.has_platform_url() && entry.target_route().is_none() {
            return Err(CatalogError::Unrouted(entry.service_name.clone()));
        }
    }

    Ok(())
}

fn check_url(
    entry: &ServiceEntry,
    field: &'static str,
    value: Option<&String>,
) -> Result<(), CatalogError> {
    match value {
        Some(value) if url::Url::parse(value).is_err() => Err(CatalogError::InvalidUrl {
            service: entry.service_name.clone(),
            field,
            value: value.clone(),
        }),
        _ => Ok(()),
    }
}
