//! In-app navigation
//!
//! The set of screens is closed: every [`Route`] has a screen name (the key a
//! service entry navigates by) and a deep-link path. Mapping a route to its
//! handler is an exhaustive `match`, so a catalog can never name a screen the
//! app does not have once its names have been parsed into routes.

pub mod deep_link;

pub use deep_link::DeepLinkResolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

/// Screens registered with the navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Salesline,
    Cashup,
    Learning,
    Comply,
    Benchmark,
    Finpack,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Salesline,
        Route::Cashup,
        Route::Learning,
        Route::Comply,
        Route::Benchmark,
        Route::Finpack,
    ];

    /// Name the screen is registered under
    pub fn screen_name(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Salesline => "Salesline",
            Route::Cashup => "Cashup",
            Route::Learning => "Learning",
            Route::Comply => "Comply",
            Route::Benchmark => "Benchmark",
            Route::Finpack => "Finpack",
        }
    }

    /// Path segment used by deep links (`qantaco://<path>`)
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Salesline => "salesline",
            Route::Cashup => "cashup",
            Route::Learning => "learning",
            Route::Comply => "comply",
            Route::Benchmark => "benchmark",
            Route::Finpack => "finpack",
        }
    }

    pub fn from_screen_name(name: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.screen_name() == name)
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.screen_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no screen is registered under '{0}'")]
pub struct UnknownScreen(pub String);

impl FromStr for Route {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_screen_name(s).ok_or_else(|| UnknownScreen(s.to_string()))
    }
}

/// Navigation target registry owned by the app shell
///
/// `navigate` only enqueues the transition; it never blocks.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Native-stack style navigator
///
/// Navigating to a route already on the stack pops back to it instead of
/// pushing a duplicate. Home is always the bottom of the stack.
#[derive(Debug)]
pub struct ScreenStack {
    stack: Mutex<Vec<Route>>,
}

impl Default for ScreenStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenStack {
    pub fn new() -> Self {
        Self {
            stack: Mutex::new(vec![Route::Home]),
        }
    }

    /// Screen currently on top of the stack
    pub fn current(&self) -> Route {
        let stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.last().copied().unwrap_or(Route::Home)
    }

    /// Pop the top screen; returns the screen now visible
    pub fn back(&self) -> Route {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        if stack.len() > 1 {
            stack.pop();
        }
        stack.last().copied().unwrap_or(Route::Home)
    }

    pub fn depth(&self) -> usize {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Navigator for ScreenStack {
    fn navigate(&self, route: Route) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        match stack.iter().position(|r| *r == route) {
            Some(index) => stack.truncate(index + 1),
            None => stack.push(route),
        }
        tracing::debug!(
            event = "navigate",
            route = %route,
            depth = stack.len(),
            "Navigation enqueued"
        );
    }
}
