use std::env;

use crate::navigation::deep_link::DEFAULT_PREFIX;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Source for the service catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogConfig {
    /// The portal's built-in service table
    Builtin,
    /// Catalog provided as JSON via PORTAL_CATALOG_JSON
    Json(String),
    /// Catalog loaded from PORTAL_CATALOG_PATH
    File(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,

    // Platform used for service dispatch (android, ios or other)
    pub platform: Platform,

    // Identity provider
    pub auth_domain: String, // e.g. https://tenant.eu.auth0.com
    pub client_id: String,
    pub audience: Option<String>,
    pub logout_return_to: Option<String>,

    // Loopback redirect for the authorization code (http://127.0.0.1:<port>/callback)
    pub callback_port: u16,
    pub login_timeout_secs: u64,

    // HTTP client timeout configuration (in seconds)
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,

    // Scheme prefix accepted for inbound deep links
    pub deep_link_prefix: String,

    pub catalog: CatalogConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let platform = match lookup("PORTAL_PLATFORM").filter(|s| !s.is_empty()) {
            Some(value) => value
                .parse::<Platform>()
                .map_err(|e| anyhow::anyhow!("PORTAL_PLATFORM: {}", e))?,
            None => Platform::current(),
        };

        // Required variables
        let auth_domain = lookup("AUTH_DOMAIN")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("AUTH_DOMAIN environment variable is required"))?;

        let client_id = lookup("CLIENT_ID")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("CLIENT_ID environment variable is required"))?;

        // Optional variables with defaults
        let audience = lookup("AUTH_AUDIENCE").filter(|s| !s.is_empty());
        let logout_return_to = lookup("LOGOUT_RETURN_TO").filter(|s| !s.is_empty());

        let callback_port = lookup("CALLBACK_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8765);

        let login_timeout_secs = lookup("LOGIN_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(300);

        let http_connect_timeout_secs = lookup("HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let http_request_timeout_secs = lookup("HTTP_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let deep_link_prefix = lookup("DEEP_LINK_PREFIX")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        // Catalog (primary: JSON env var, then file path, else built-in)
        let catalog = if let Some(json) = lookup("PORTAL_CATALOG_JSON") {
            CatalogConfig::Json(json)
        } else if let Some(path) = lookup("PORTAL_CATALOG_PATH") {
            CatalogConfig::File(path)
        } else {
            CatalogConfig::Builtin
        };

        Ok(Config {
            environment,
            platform,
            auth_domain: normalize_domain(&auth_domain),
            client_id,
            audience,
            logout_return_to,
            callback_port,
            login_timeout_secs,
            http_connect_timeout_secs,
            http_request_timeout_secs,
            deep_link_prefix,
            catalog,
        })
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

/// Give a bare tenant host an https scheme and drop trailing slashes
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("AUTH_DOMAIN", "tenant.eu.auth0.com/"),
        ("CLIENT_ID", "portal-mobile"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.platform, Platform::current());
        assert_eq!(config.auth_domain, "https://tenant.eu.auth0.com");
        assert_eq!(config.callback_port, 8765);
        assert_eq!(config.login_timeout_secs, 300);
        assert_eq!(config.deep_link_prefix, "qantaco://");
        assert_eq!(config.catalog, CatalogConfig::Builtin);
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_required_variable() {
        let err = Config::from_lookup(lookup_from(&[("CLIENT_ID", "x")])).unwrap_err();
        assert!(err.to_string().contains("AUTH_DOMAIN"));

        let err = Config::from_lookup(lookup_from(&[("AUTH_DOMAIN", "x")])).unwrap_err();
        assert!(err.to_string().contains("CLIENT_ID"));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("ENVIRONMENT", "prod"),
            ("PORTAL_PLATFORM", "android"),
            ("AUTH_AUDIENCE", "https://api.quantaco.co"),
            ("CALLBACK_PORT", "9000"),
            ("DEEP_LINK_PREFIX", "portal://"),
            ("PORTAL_CATALOG_PATH", "/etc/portal/catalog.json"),
        ]);
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert!(config.is_production());
        assert_eq!(config.platform, Platform::Android);
        assert_eq!(config.audience.as_deref(), Some("https://api.quantaco.co"));
        assert_eq!(config.callback_port, 9000);
        assert_eq!(config.deep_link_prefix, "portal://");
        assert_eq!(
            config.catalog,
            CatalogConfig::File("/etc/portal/catalog.json".to_string())
        );
    }

    #[test]
    fn test_invalid_platform_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORTAL_PLATFORM", "symbian"));
        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_catalog_json_takes_precedence() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORTAL_CATALOG_JSON", "{\"services\":[]}"));
        vars.push(("PORTAL_CATALOG_PATH", "/ignored"));
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert!(matches!(config.catalog, CatalogConfig::Json(_)));
    }

    #[test]
    fn test_normalize_domain_keeps_scheme() {
        assert_eq!(normalize_domain("http://localhost:8080/"), "http://localhost:8080");
        assert_eq!(normalize_domain("tenant.auth0.com"), "https://tenant.auth0.com");
    }
}
