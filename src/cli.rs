use anyhow::Result;
use clap::{Parser, Subcommand};
use repopulse_core::ports::AppConfig;
use repopulse_core::Action;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "repopulse")]
#[command(about = "RepoPulse - watch push, pull request and merge activity from a webhook receiver")]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Events endpoint to poll (overrides config)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Poll interval in seconds (overrides config)
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum CliCommand {
    /// Interactive terminal dashboard (default)
    Dashboard,

    /// Run the webhook receiver
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Fetch once and print one page of events
    List {
        /// Comma separated actions to show, e.g. `push,merge`
        #[arg(long, value_delimiter = ',')]
        filter: Vec<Action>,

        /// Page to print, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Events per page (overrides config)
        #[arg(long)]
        per_page: Option<usize>,
    },
}

impl CliArgs {
    /// CLI args override values loaded from the config file
    pub fn apply_overrides(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            config.source.endpoint = endpoint.clone();
        }

        if let Some(secs) = self.interval {
            anyhow::ensure!(secs > 0, "--interval must be at least one second");
            config.source.poll_interval = Duration::from_secs(secs);
        }

        match &self.command {
            Some(CliCommand::Serve { bind: Some(bind) }) => {
                config.server.bind = *bind;
            }
            Some(CliCommand::List {
                per_page: Some(per_page),
                ..
            }) => {
                config.ui.page_size = *per_page;
            }
            _ => {}
        }

        Ok(())
    }
}
