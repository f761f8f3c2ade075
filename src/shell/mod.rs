//! Text front end for the portal
//!
//! Plays the part of the home screen: each command is a tap, a deep link or
//! a session action, and the answer is the text of the screen that results.

pub mod templates;

use askama::Template;
use std::str::FromStr;
use std::sync::Arc;

use crate::navigation::{Navigator, Route};
use crate::services::{DispatchError, DispatchOutcome};
use crate::PortalState;
use templates::{HomeTemplate, ScreenTemplate, ServiceRow};

pub const HELP: &str = "\
Commands:
  home              show the service list
  open <id|name>    open a service
  link <uri>        follow a deep link
  back              return to the previous screen
  login             log in with the identity provider
  logout            log out
  token             show the current access token
  help              show this help
  quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Home,
    Open(String),
    Link(String),
    Back,
    Login,
    Logout,
    Token,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let needs_arg = |name: &str, make: fn(String) -> Command| {
            if rest.is_empty() {
                Err(format!("usage: {} <argument>", name))
            } else {
                Ok(make(rest.to_string()))
            }
        };

        match word.to_lowercase().as_str() {
            "help" | "?" => Ok(Command::Help),
            "home" | "list" => Ok(Command::Home),
            "open" => needs_arg("open", Command::Open),
            "link" => needs_arg("link", Command::Link),
            "back" => Ok(Command::Back),
            "login" => Ok(Command::Login),
            "logout" => Ok(Command::Logout),
            "token" => Ok(Command::Token),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

pub struct Shell {
    state: Arc<PortalState>,
}

impl Shell {
    pub fn new(state: Arc<PortalState>) -> Self {
        Self { state }
    }

    /// Run one command and return what the user should see
    ///
    /// An empty string means the action is deliberately silent.
    pub async fn execute(&self, command: Command) -> String {
        match command {
            Command::Help => HELP.to_string(),
            Command::Home => {
                self.state.screens.navigate(Route::Home);
                self.render_current()
            }
            Command::Open(target) => self.open(&target).await,
            Command::Link(uri) => self.follow_link(&uri),
            Command::Back => {
                self.state.screens.back();
                self.render_current()
            }
            Command::Login => match self.state.controller.login().await {
                Ok(_) => format!("Logged in.\n{}", self.render_home()),
                Err(e) => format!("Login failed: {}. Please try again.", e),
            },
            Command::Logout => {
                let ack = self.state.controller.logout().await;
                self.state.screens.navigate(Route::Home);
                format!("{}\n{}", ack.message(), self.render_home())
            }
            Command::Token => match self.state.session.credentials() {
                Some(credentials) => credentials.access_token.secret().clone(),
                None => "Not logged in.".to_string(),
            },
            Command::Quit => String::new(),
        }
    }

    async fn open(&self, target: &str) -> String {
        if !self.state.session.is_authenticated() {
            return "Log in to open services.".to_string();
        }

        let catalog = &self.state.catalog;
        let entry = match target.parse::<u32>() {
            Ok(id) => catalog.get(id),
            Err(_) => catalog.resolve(target),
        };
        let Some(entry) = entry else {
            return format!("No service named '{}'.", target);
        };

        match self
            .state
            .dispatcher
            .dispatch(entry, self.state.platform)
            .await
        {
            Ok(DispatchOutcome::Navigated(_)) => self.render_current(),
            Ok(DispatchOutcome::Opened { uri }) | Ok(DispatchOutcome::FellBack { uri }) => {
                format!("Opening {}", uri)
            }
            // Disabled services and failed opens are silent no-ops
            Ok(DispatchOutcome::Disabled) | Err(DispatchError::OpenFailed { .. }) => String::new(),
            // Catalog and route table disagree: loud in development, a plain
            // notice in production
            Err(e @ DispatchError::MissingRoute { .. }) => {
                if self.state.environment.is_production() {
                    format!("{} is unavailable.", entry.service_name)
                } else {
                    format!("Configuration error: {}", e)
                }
            }
        }
    }

    fn follow_link(&self, uri: &str) -> String {
        // Deep links are not gated on the session
        let authenticated = self.state.session.is_authenticated();
        match self.state.deep_links.resolve(uri) {
            Some(route) => {
                tracing::info!(
                    event = "deep_link",
                    route = %route,
                    authenticated,
                    "Opening deep link"
                );
                self.state.screens.navigate(route);
                self.render_current()
            }
            None => {
                tracing::warn!(event = "deep_link_unmatched", uri = %uri, "Unrecognised deep link");
                format!("Unrecognised link: {}", uri)
            }
        }
    }

    /// Render whatever screen is on top of the stack
    pub fn render_current(&self) -> String {
        let route = self.state.screens.current();
        match route {
            Route::Home => self.render_home(),
            _ => self.render_screen(route),
        }
    }

    fn render_home(&self) -> String {
        let session = self.state.session.snapshot();
        let template = HomeTemplate {
            authenticated: session.is_authenticated(),
            nickname: session.nickname().map(str::to_string),
            services: self.state.catalog.list().iter().map(ServiceRow::from).collect(),
        };
        render(&template)
    }

    fn render_screen(&self, route: Route) -> String {
        let (title, description) = match route {
            Route::Home => ("Home", "Portal services"),
            Route::Salesline => ("Salesline", "Sales figures by venue and trading day"),
            Route::Cashup => ("Cashup", "End of day cash reconciliation"),
            Route::Learning => ("Learning", "Training modules and progress"),
            Route::Comply => ("Comply", "Compliance checklists and records"),
            Route::Benchmark => ("Benchmark", "Venue performance against the group"),
            Route::Finpack => ("Finpack", "Monthly financial reporting pack"),
        };
        let link = format!(
            "{}{}",
            self.state
                .deep_links
                .prefixes()
                .first()
                .map(String::as_str)
                .unwrap_or_default(),
            route.path()
        );
        render(&ScreenTemplate {
            title,
            description,
            link,
        })
    }
}

fn render<T: Template>(template: &T) -> String {
    match template.render() {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Template error");
            "Template error".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::navigation::DeepLinkResolver;
    use crate::platform::Platform;
    use crate::services::ServiceCatalog;
    use crate::session::{Credentials, UserProfile};
    use crate::testing::{FakeProvider, RecordingOpener};

    type Fixture = (Shell, Arc<PortalState>, Arc<FakeProvider>, Arc<RecordingOpener>);

    fn shell(platform: Platform) -> Fixture {
        shell_in(platform, Environment::Development)
    }

    fn shell_in(platform: Platform, environment: Environment) -> Fixture {
        let provider = Arc::new(FakeProvider::new());
        let opener = Arc::new(RecordingOpener::new());
        let state = Arc::new(
            PortalState::new(
                platform,
                ServiceCatalog::builtin().unwrap(),
                DeepLinkResolver::default(),
                provider.clone(),
                opener.clone(),
            )
            .with_environment(environment),
        );
        (Shell::new(state.clone()), state, provider, opener)
    }

    async fn log_in(state: &PortalState, provider: &FakeProvider, token: &str) {
        provider.push_login(Ok(Credentials::new(token)));
        state.controller.login().await.unwrap();
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("open 5".parse::<Command>(), Ok(Command::Open("5".to_string())));
        assert_eq!(
            "open  Slack (Android) ".parse::<Command>(),
            Ok(Command::Open("Slack (Android)".to_string()))
        );
        assert_eq!(
            "LINK qantaco://cashup".parse::<Command>(),
            Ok(Command::Link("qantaco://cashup".to_string()))
        );
        assert_eq!("list".parse::<Command>(), Ok(Command::Home));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert!("open".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn test_home_lists_services_for_anonymous_user() {
        let (shell, _state, _provider, _opener) = shell(Platform::Other);
        let text = shell.execute(Command::Home).await;
        assert!(text.contains("Log in to use the portal services."));
        assert!(text.contains("[1] Salesline"));
        assert!(text.contains("[4] Hospitality Platform (unavailable)"));
    }

    #[tokio::test]
    async fn test_open_requires_login() {
        let (shell, state, _provider, opener) = shell(Platform::Android);
        let text = shell.execute(Command::Open("5".to_string())).await;
        assert_eq!(text, "Log in to open services.");
        assert!(opener.attempts().is_empty());
        assert_eq!(state.screens.current(), Route::Home);
    }

    #[tokio::test]
    async fn test_login_then_greeting_uses_nickname() {
        let (shell, state, provider, _opener) = shell(Platform::Other);
        provider.push_login(Ok(Credentials::new("token-a")));

        let text = shell.execute(Command::Login).await;
        assert!(text.starts_with("Logged in."));
        assert!(text.contains("Good morning"));

        provider.set_profile("token-a", UserProfile::new("a").with_nickname("jess"));
        let credentials = state.session.credentials().unwrap();
        state
            .profile_fetcher()
            .fetch(state.session.epoch(), credentials)
            .await;
        assert!(shell.execute(Command::Home).await.contains("Good morning jess"));
    }

    #[tokio::test]
    async fn test_login_failure_is_reported() {
        let (shell, state, _provider, _opener) = shell(Platform::Other);
        let text = shell.execute(Command::Login).await;
        assert!(text.starts_with("Login failed"));
        assert!(!state.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_open_navigates_and_back_returns_home() {
        let (shell, state, provider, _opener) = shell(Platform::Other);
        log_in(&state, &provider, "token-a").await;

        let text = shell.execute(Command::Open("Compliance".to_string())).await;
        assert!(text.contains("== Comply =="));
        assert!(text.contains("link: qantaco://comply"));
        assert_eq!(state.screens.current(), Route::Comply);

        shell.execute(Command::Back).await;
        assert_eq!(state.screens.current(), Route::Home);
    }

    #[tokio::test]
    async fn test_open_platform_link_and_silent_failure() {
        let (shell, state, provider, opener) = shell(Platform::Android);
        log_in(&state, &provider, "token-a").await;

        assert_eq!(
            shell.execute(Command::Open("5".to_string())).await,
            "Opening slack://open"
        );

        opener.fail_on("slack://open");
        opener.fail_on("https://slack.com");
        assert_eq!(shell.execute(Command::Open("5".to_string())).await, "");
        assert_eq!(shell.execute(Command::Open("4".to_string())).await, "");
    }

    #[tokio::test]
    async fn test_missing_route_is_loud_in_development() {
        let (shell, state, provider, _opener) = shell(Platform::Other);
        log_in(&state, &provider, "token-a").await;
        let text = shell.execute(Command::Open("6".to_string())).await;
        assert!(text.starts_with("Configuration error"));
        assert!(text.contains("Send Mail"));
    }

    #[tokio::test]
    async fn test_missing_route_is_a_notice_in_production() {
        let (shell, state, provider, _opener) = shell_in(Platform::Other, Environment::Production);
        log_in(&state, &provider, "token-a").await;
        let text = shell.execute(Command::Open("6".to_string())).await;
        assert_eq!(text, "Send Mail (ios) is unavailable.");
        assert_eq!(state.screens.current(), Route::Home);
    }

    #[tokio::test]
    async fn test_deep_link_works_without_session() {
        let (shell, state, _provider, _opener) = shell(Platform::Other);
        let text = shell.execute(Command::Link("qantaco://finpack".to_string())).await;
        assert!(text.contains("== Finpack =="));
        assert_eq!(state.screens.current(), Route::Finpack);

        let text = shell.execute(Command::Link("other://finpack".to_string())).await;
        assert_eq!(text, "Unrecognised link: other://finpack");
    }

    #[tokio::test]
    async fn test_logout_and_token() {
        let (shell, state, provider, _opener) = shell(Platform::Other);
        log_in(&state, &provider, "token-a").await;
        assert_eq!(shell.execute(Command::Token).await, "token-a");

        provider.fail_logout();
        let text = shell.execute(Command::Logout).await;
        assert!(text.starts_with("There was a problem logging out!"));
        assert!(!state.session.is_authenticated());
        assert_eq!(shell.execute(Command::Token).await, "Not logged in.");
    }
}
