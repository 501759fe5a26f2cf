use anyhow::Result;
use clap::Parser;
use repopulse::adapters::persistence::FileConfigStore;
use repopulse::cli::{CliArgs, CliCommand};
use repopulse::dashboard::Dashboard;
use repopulse::{list, server};
use repopulse_core::app::ActionFilter;
use repopulse_core::ports::ConfigStore;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of `list` output and the TUI screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli_args = CliArgs::parse();

    let config_store = match &cli_args.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new()?,
    };
    let mut config = config_store.load()?;
    cli_args.apply_overrides(&mut config)?;
    config.validate()?;
    info!("Loaded config from {}", config_store.path().display());

    let result = match cli_args.command {
        None | Some(CliCommand::Dashboard) => match Dashboard::new(&config) {
            Ok(dashboard) => dashboard.run().await,
            Err(e) => Err(e),
        },
        Some(CliCommand::Serve { .. }) => server::serve(&config.server).await,
        Some(CliCommand::List { filter, page, .. }) => {
            list::run(&config, ActionFilter::from_actions(filter), page).await
        }
    };

    if let Err(e) = &result {
        error!("Application error: {:#}", e);
    }
    result
}
