//! Posts alerts to Slack, either through `chat.postMessage` or an incoming
//! webhook.

use super::{retry_send, AlertChannel};
use crate::components::Component;
use crate::config::SlackConfig;
use crate::dispatch::{AlertMethod, SendOptions};
use crate::error::{AlertError, Result};
use crate::render::render_components_md;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::task;
use tracing::{debug, error, instrument, Span};

/// Where a Slack message is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    Webhook(String),
    Api {
        url: String,
        token: String,
        channel: String,
    },
}

/// Sends alerts to Slack as Slack-flavored Markdown.
pub struct SlackChannel {
    config: SlackConfig,
}

impl SlackChannel {
    pub fn new(config: SlackConfig) -> Self {
        Self { config }
    }

    /// A webhook wins over the bot API; the API needs both a token and a
    /// channel.
    fn destination(&self, options: &SendOptions) -> Result<Destination> {
        if let Some(url) = &self.config.webhook_url {
            return Ok(Destination::Webhook(url.clone()));
        }
        let token = self.config.bot_token.clone().ok_or_else(|| {
            AlertError::ConfigurationMissing("slack.bot_token or slack.webhook_url".into())
        })?;
        let channel = options
            .slack_channel
            .clone()
            .or_else(|| self.config.channel.clone())
            .ok_or_else(|| AlertError::ConfigurationMissing("slack.channel".into()))?;
        Ok(Destination::Api {
            url: self.config.api_url.clone(),
            token,
            channel,
        })
    }

    /// Sends the request in a blocking manner.
    fn post(client: &reqwest::blocking::Client, destination: &Destination, text: &str) -> Result<()> {
        let response = match destination {
            Destination::Webhook(url) => client.post(url).json(&json!({ "text": text })).send()?,
            Destination::Api {
                url,
                token,
                channel,
            } => client
                .post(url)
                .bearer_auth(token)
                .json(&json!({ "channel": channel, "text": text, "mrkdwn": true }))
                .send()?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AlertError::Transport(format!(
                "Slack responded with status {status}: {body}"
            )));
        }
        if let Destination::Api { .. } = destination {
            let body: Value = response.json()?;
            if body.get("ok").and_then(Value::as_bool) != Some(true) {
                let reason = body.get("error").and_then(Value::as_str).unwrap_or("unknown");
                return Err(AlertError::Transport(format!("Slack API error: {reason}")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AlertChannel for SlackChannel {
    fn method(&self) -> AlertMethod {
        AlertMethod::Slack
    }

    #[instrument(skip_all, fields(components = components.len()))]
    async fn send(&self, components: &[Component], options: &SendOptions) -> bool {
        let destination = match self.destination(options) {
            Ok(destination) => destination,
            Err(e) => {
                error!(error = %e, "Cannot send Slack alert");
                return false;
            }
        };

        let text = render_components_md(components, true);
        let retries = options.retries.unwrap_or(self.config.retries);
        let timeout = Duration::from_secs(self.config.timeout_seconds);
        debug!(bytes = text.len(), retries, "Sending Slack alert");

        let span = Span::current();
        let result = task::spawn_blocking(move || {
            let _entered = span.enter();
            let client = match reqwest::blocking::Client::builder().timeout(timeout).build() {
                Ok(client) => client,
                Err(e) => {
                    error!(error = %e, "Failed to build HTTP client");
                    return false;
                }
            };
            retry_send("slack", retries, |_| Self::post(&client, &destination, &text))
        })
        .await;

        match result {
            Ok(sent) => sent,
            Err(e) => {
                error!(error = %e, "Slack notification task failed");
                false
            }
        }
    }
}
