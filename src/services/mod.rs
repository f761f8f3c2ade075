pub mod catalog;
pub mod dispatch;
pub mod models;

pub use catalog::{CatalogError, CatalogSource, CatalogSummary, ServiceCatalog};
pub use dispatch::{DispatchError, DispatchOutcome, ServiceDispatcher};
pub use models::ServiceEntry;

use crate::config::CatalogConfig;

/// Load and validate the service catalog from the configured source
///
/// The built-in table is used unless a JSON document is supplied through the
/// environment or a file.
pub fn load_catalog(config: &CatalogConfig) -> anyhow::Result<ServiceCatalog> {
    let (result, source) = match config {
        CatalogConfig::Builtin => (ServiceCatalog::builtin(), CatalogSource::Builtin),
        CatalogConfig::Json(json) => (ServiceCatalog::from_json(json), CatalogSource::EnvJson),
        CatalogConfig::File(path) => (ServiceCatalog::from_file(path), CatalogSource::FilePath),
    };

    let catalog = match result {
        Ok(catalog) => catalog,
        Err(error) => {
            tracing::error!(
                source = %source,
                error = %error,
                "Service catalog validation failed"
            );
            return Err(anyhow::anyhow!(
                "Service catalog validation failed ({}): {}",
                source,
                error
            ));
        }
    };

    let summary = catalog.summary();
    tracing::info!(
        source = %source,
        total_services = summary.total_services,
        enabled_services = summary.enabled_services,
        linked_services = summary.linked_services,
        "Service catalog loaded"
    );

    Ok(catalog)
}
