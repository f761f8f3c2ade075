//! Inbound deep links
//!
//! A link is `<prefix><path>[?query][#fragment]`. Resolution is a pure string
//! match against the route table and does not look at the session.

use super::Route;

pub const DEFAULT_PREFIX: &str = "qantaco://";

#[derive(Debug, Clone)]
pub struct DeepLinkResolver {
    prefixes: Vec<String>,
}

impl Default for DeepLinkResolver {
    fn default() -> Self {
        Self::new([DEFAULT_PREFIX])
    }
}

impl DeepLinkResolver {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Resolve a link to the screen it names
    ///
    /// An empty path opens the initial route (Home). Paths must match a route
    /// exactly; nested paths such as `salesline/today` do not resolve.
    pub fn resolve(&self, uri: &str) -> Option<Route> {
        let rest = self
            .prefixes
            .iter()
            .find_map(|prefix| uri.strip_prefix(prefix.as_str()))?;

        let path = rest
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_matches('/');

        if path.is_empty() {
            return Some(Route::Home);
        }
        Route::from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_every_route_path() {
        let resolver = DeepLinkResolver::default();
        for route in Route::ALL {
            let link = format!("qantaco://{}", route.path());
            assert_eq!(resolver.resolve(&link), Some(route), "{}", link);
        }
    }

    #[test]
    fn test_strips_query_fragment_and_slashes() {
        let resolver = DeepLinkResolver::default();
        assert_eq!(
            resolver.resolve("qantaco://cashup?date=2024-01-01"),
            Some(Route::Cashup)
        );
        assert_eq!(resolver.resolve("qantaco://comply#top"), Some(Route::Comply));
        assert_eq!(resolver.resolve("qantaco://finpack/"), Some(Route::Finpack));
    }

    #[test]
    fn test_empty_path_opens_home() {
        let resolver = DeepLinkResolver::default();
        assert_eq!(resolver.resolve("qantaco://"), Some(Route::Home));
        assert_eq!(resolver.resolve("qantaco://?x=1"), Some(Route::Home));
    }

    #[test]
    fn test_rejects_unknown_scheme_and_paths() {
        let resolver = DeepLinkResolver::default();
        assert_eq!(resolver.resolve("https://salesline.quantaco.co"), None);
        assert_eq!(resolver.resolve("qantaco://Salesline"), None);
        assert_eq!(resolver.resolve("qantaco://salesline/today"), None);
        assert_eq!(resolver.resolve("qantaco://hospitality"), None);
    }

    #[test]
    fn test_custom_prefixes() {
        let resolver = DeepLinkResolver::new(["portal://", "https://portal.example.com/"]);
        assert_eq!(resolver.resolve("portal://learning"), Some(Route::Learning));
        assert_eq!(
            resolver.resolve("https://portal.example.com/benchmark"),
            Some(Route::Benchmark)
        );
        assert_eq!(resolver.resolve("qantaco://learning"), None);
    }
}
