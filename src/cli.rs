//! Command-Line Interface (CLI) argument parsing.
//!
//! The `alert-msgs` binary sends a single text alert. Its arguments are merged
//! over the file and environment configuration as the last `figment` layer.

use crate::dispatch::AlertMethod;
use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send an alert message via Slack and/or email.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The alert text, or a JSON component document with `--json`.
    pub text: String,

    /// Send the alert to Slack.
    #[arg(long)]
    pub slack: bool,

    /// Send the alert by email.
    #[arg(long)]
    pub email: bool,

    /// Parse `text` as a JSON component document.
    #[arg(long)]
    pub json: bool,

    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Slack channel to post to.
    #[arg(long, value_name = "CHANNEL")]
    pub slack_channel: Option<String>,

    /// Email recipient address.
    #[arg(long, value_name = "ADDR")]
    pub email_receiver: Option<String>,

    /// Extra attempts after a failed send, for every channel.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Methods selected with flags, or `None` to fall back to the configuration.
    pub fn methods(&self) -> Option<Vec<AlertMethod>> {
        let mut methods = Vec::new();
        if self.slack {
            methods.push(AlertMethod::Slack);
        }
        if self.email {
            methods.push(AlertMethod::Email);
        }
        (!methods.is_empty()).then_some(methods)
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        let mut slack = Dict::new();
        let mut email = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }
        if let Some(channel) = &self.slack_channel {
            slack.insert("channel".into(), Value::from(channel.clone()));
        }
        if let Some(receiver) = &self.email_receiver {
            email.insert("receiver_addr".into(), Value::from(receiver.clone()));
        }
        if let Some(retries) = self.retries {
            slack.insert("retries".into(), Value::from(retries));
            email.insert("retries".into(), Value::from(retries));
        }

        if !slack.is_empty() {
            dict.insert("slack".into(), Value::Dict(Tag::Default, slack));
        }
        if !email.is_empty() {
            dict.insert("email".into(), Value::Dict(Tag::Default, email));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
