//! alert-msgs - send a text or JSON alert from the command line.

use alert_msgs::{
    cli::Cli, config::Config, render::ComponentInput, send_alert, SendOptions,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        tracing_subscriber::fmt().with_env_filter("error").init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let input = if cli.json {
        let value: serde_json::Value =
            serde_json::from_str(&cli.text).context("alert text is not valid JSON")?;
        ComponentInput::from_json(&value)?
    } else {
        ComponentInput::Text(cli.text.clone())
    };

    // Channel, receiver and retry flags are already merged into `config`.
    let methods = cli.methods();
    match send_alert(&config, input, methods.as_deref(), &SendOptions::default()).await {
        Ok(true) => {
            info!("Alert sent");
            Ok(())
        }
        Ok(false) => {
            error!("Alert was not delivered on every channel");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to send alert: {}", e);
            std::process::exit(1);
        }
    }
}
