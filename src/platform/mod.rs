//! Platform facilities: which OS the portal runs on and how it opens URIs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform the portal is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Other,
}

impl Platform {
    /// Detect the platform of the running process
    pub fn current() -> Self {
        match std::env::consts::OS {
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            _ => Platform::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "other" => Ok(Platform::Other),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("no application can handle {0}")]
    NoHandler(String),
    #[error("failed to launch URI opener: {0}")]
    Launch(#[from] std::io::Error),
}

/// Platform URI-open facility
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open_url(&self, uri: &str) -> Result<(), OpenError>;
}

/// Opens URIs with the desktop's registered handler
///
/// A non-zero exit from the helper means no application took the URI.
#[derive(Debug, Clone)]
pub struct SystemOpener {
    program: String,
    leading_args: Vec<String>,
}

impl Default for SystemOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemOpener {
    pub fn new() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Opener for the given `std::env::consts::OS` value
    ///
    /// The URI never passes through `cmd`: `&` in a query string is a command
    /// separator there.
    pub fn for_os(os: &str) -> Self {
        let (program, leading_args): (&str, &[&str]) = match os {
            "macos" | "ios" => ("open", &[]),
            "windows" => ("rundll32", &["url.dll,FileProtocolHandler"]),
            _ => ("xdg-open", &[]),
        };
        Self::with_program(program, leading_args)
    }

    /// Use a specific helper program, e.g. for tests or unusual desktops
    pub fn with_program(program: &str, leading_args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            leading_args: leading_args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument list passed to the helper; the URI is always one argument
    fn arguments(&self, uri: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push(uri.to_string());
        args
    }
}

#[async_trait]
impl UrlOpener for SystemOpener {
    async fn open_url(&self, uri: &str) -> Result<(), OpenError> {
        let status = tokio::process::Command::new(&self.program)
            .args(self.arguments(uri))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            tracing::debug!(
                program = %self.program,
                code = ?status.code(),
                "URI opener exited unsuccessfully"
            );
            Err(OpenError::NoHandler(uri.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        assert_eq!("android".parse::<Platform>(), Ok(Platform::Android));
        assert_eq!(" iOS ".parse::<Platform>(), Ok(Platform::Ios));
        assert_eq!("other".parse::<Platform>(), Ok(Platform::Other));
        assert!("windows-phone".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_display_round_trip() {
        for platform in [Platform::Android, Platform::Ios, Platform::Other] {
            assert_eq!(platform.to_string().parse::<Platform>(), Ok(platform));
        }
    }

    #[test]
    fn test_windows_opener_does_not_go_through_cmd() {
        let uri = "https://t/authorize?response_type=code&client_id=x&state=s";
        let opener = SystemOpener::for_os("windows");

        assert_eq!(opener.program(), "rundll32");
        assert_eq!(
            opener.arguments(uri),
            vec!["url.dll,FileProtocolHandler".to_string(), uri.to_string()]
        );
    }

    #[test]
    fn test_desktop_openers_pass_uri_as_single_argument() {
        let uri = "https://x/?a=1&calc";
        for (os, program) in [("linux", "xdg-open"), ("macos", "open")] {
            let opener = SystemOpener::for_os(os);
            assert_eq!(opener.program(), program);
            assert_eq!(opener.arguments(uri), vec![uri.to_string()]);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_opener_maps_exit_status() {
        let ok = SystemOpener::with_program("true", &[]);
        assert!(ok.open_url("https://slack.com").await.is_ok());

        let failing = SystemOpener::with_program("false", &[]);
        let err = failing.open_url("slack://open").await.unwrap_err();
        assert!(matches!(err, OpenError::NoHandler(uri) if uri == "slack://open"));
    }

    #[tokio::test]
    async fn test_system_opener_missing_program_is_launch_error() {
        let missing = SystemOpener::with_program("definitely-not-a-real-opener-binary", &[]);
        let err = missing.open_url("https://slack.com").await.unwrap_err();
        assert!(matches!(err, OpenError::Launch(_)));
    }
}
