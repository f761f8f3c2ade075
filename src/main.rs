use anyhow::Result;
use mobile_portal::{
    auth::{OidcProvider, OidcSettings},
    navigation::DeepLinkResolver,
    platform::{SystemOpener, UrlOpener},
    services,
    shell::{Command, Shell, HELP},
    PortalState,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (stderr, so screen output on stdout stays readable)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting portal");

    // Load configuration from environment
    let config = mobile_portal::config::Config::load()?;
    tracing::info!(
        environment = ?config.environment,
        platform = %config.platform,
        auth_domain = %config.auth_domain,
        "Configuration loaded"
    );

    // Load and validate the service catalog (logs summary internally)
    let catalog = services::load_catalog(&config.catalog)?;

    let opener: Arc<dyn UrlOpener> = Arc::new(SystemOpener::new());
    let provider = Arc::new(
        OidcProvider::new(OidcSettings::from_config(&config), opener.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize identity provider: {}", e))?,
    );

    let state = Arc::new(PortalState::new(
        config.platform,
        catalog,
        DeepLinkResolver::new([config.deep_link_prefix.clone()]),
        provider,
        opener,
    )
    .with_environment(config.environment));

    let fetcher = state.profile_fetcher().spawn();
    let shell = Shell::new(state.clone());

    // A deep link passed on the command line opens straight into its screen
    let initial = match std::env::args().nth(1) {
        Some(uri) => shell.execute(Command::Link(uri)).await,
        None => shell.render_current(),
    };
    println!("{}\n\n{}", initial, HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        let output = shell.execute(command).await;
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    fetcher.abort();
    tracing::info!("Portal exiting");
    Ok(())
}
