//! Configuration management for alert-msgs
//!
//! Settings are layered with `figment`: built-in defaults, an optional TOML
//! file, `ALERT_MSGS_*` environment variables, and finally command-line
//! arguments.

use crate::cli::Cli;
use crate::dispatch::AlertMethod;
use crate::error::Result;
use crate::gate::OverlapPolicy;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of environment variables read into the configuration, e.g.
/// `ALERT_MSGS_SLACK_CHANNEL` or `ALERT_MSGS_EMAIL_ADDR`.
pub const ENV_PREFIX: &str = "ALERT_MSGS_";

/// The main configuration struct.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Methods used when a send does not name any.
    #[serde(default, deserialize_with = "deserialize_methods")]
    pub alert_methods: Vec<AlertMethod>,
    pub slack: SlackConfig,
    pub email: EmailConfig,
    pub gate: GateConfig,
}

/// Configuration for Slack alerts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlackConfig {
    /// Bot token used with `chat.postMessage`.
    pub bot_token: Option<String>,
    /// Channel messages are posted to.
    pub channel: Option<String>,
    /// Incoming webhook URL. Used instead of the bot API when set.
    pub webhook_url: Option<String>,
    /// Endpoint of `chat.postMessage`.
    pub api_url: String,
    /// Extra attempts after a failed send.
    pub retries: u32,
    pub timeout_seconds: u64,
}

/// Configuration for email alerts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmailConfig {
    /// Sender address, also used as the SMTP username.
    pub addr: Option<String>,
    pub password: Option<String>,
    /// Recipient address. Defaults to the sender.
    pub receiver_addr: Option<String>,
    pub smtp_server: String,
    /// 465 uses implicit TLS, any other port STARTTLS.
    pub smtp_port: u16,
    /// Extra attempts after a failed send.
    pub retries: u32,
    pub subject: String,
    /// Tables with more rows than this are sent as CSV attachments.
    pub max_inline_table_rows: usize,
}

/// Configuration for the rate-limited alert gate.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GateConfig {
    /// Minimum number of seconds between two sends.
    pub min_interval_seconds: u64,
    /// What happens to sends that arrive while one is already deferred.
    pub overlap: OverlapPolicy,
}

impl Config {
    /// Builds the layered configuration without extracting it.
    pub fn figment(cli: &Cli) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(env_provider()).merge(cli.clone())
    }

    /// Loads the configuration from defaults, the config file named on the
    /// command line, the environment, and the command line itself.
    pub fn load(cli: &Cli) -> Result<Self> {
        Ok(Self::figment(cli).extract()?)
    }
}

/// `ALERT_MSGS_SLACK_BOT_TOKEN` maps to `slack.bot_token`; keys outside a
/// section (`ALERT_MSGS_LOG_LEVEL`) stay top-level.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        for section in ["slack", "email", "gate"] {
            if let Some(rest) = key
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key.into()
    })
}

/// Accepts either a list of methods or a comma-separated string.
fn deserialize_methods<'de, D>(deserializer: D) -> Result<Vec<AlertMethod>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Methods {
        List(Vec<AlertMethod>),
        Csv(String),
    }

    match Methods::deserialize(deserializer)? {
        Methods::List(methods) => Ok(methods),
        Methods::Csv(s) => s
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| m.parse().map_err(serde::de::Error::custom))
            .collect(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            alert_methods: Vec::new(),
            slack: SlackConfig::default(),
            email: EmailConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            channel: None,
            webhook_url: None,
            api_url: "https://slack.com/api/chat.postMessage".to_string(),
            retries: 1,
            timeout_seconds: 10,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            addr: None,
            password: None,
            receiver_addr: None,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            retries: 1,
            subject: "Alert".to_string(),
            max_inline_table_rows: 2000,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_interval_seconds: 10,
            overlap: OverlapPolicy::Independent,
        }
    }
}
