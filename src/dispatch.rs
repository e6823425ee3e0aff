//! Routes a compiled alert to the selected delivery channels.

use crate::components::Component;
use crate::config::Config;
use crate::error::{AlertError, Result};
use crate::gate::AlertSender;
use crate::notification::email::EmailChannel;
use crate::notification::slack::SlackChannel;
use crate::notification::AlertChannel;
use crate::render::ComponentInput;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A delivery channel an alert can be sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertMethod {
    Slack,
    Email,
}

impl FromStr for AlertMethod {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slack" => Ok(AlertMethod::Slack),
            "email" => Ok(AlertMethod::Email),
            other => Err(AlertError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for AlertMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertMethod::Slack => f.write_str("slack"),
            AlertMethod::Email => f.write_str("email"),
        }
    }
}

/// Per-send overrides of the configured channel settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub slack_channel: Option<String>,
    pub email_receiver: Option<String>,
    pub subject: Option<String>,
    /// Extra attempts after a failure, for every channel.
    pub retries: Option<u32>,
}

/// Sends alerts through a fixed set of channels.
pub struct Dispatcher {
    default_methods: Vec<AlertMethod>,
    channels: Vec<Arc<dyn AlertChannel>>,
}

impl Dispatcher {
    /// Creates a dispatcher with the Slack and email channels described by
    /// `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_methods: config.alert_methods.clone(),
            channels: vec![
                Arc::new(SlackChannel::new(config.slack.clone())),
                Arc::new(EmailChannel::new(config.email.clone())),
            ],
        }
    }

    /// Replaces the channel serving `channel.method()`.
    pub fn with_channel(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.channels.retain(|c| c.method() != channel.method());
        self.channels.push(channel);
        self
    }

    /// Methods named explicitly are used email first; configured methods
    /// keep Slack first.
    pub fn resolve_methods(&self, explicit: Option<&[AlertMethod]>) -> Result<Vec<AlertMethod>> {
        let (preference, selected) = match explicit {
            Some(methods) if !methods.is_empty() => {
                ([AlertMethod::Email, AlertMethod::Slack], methods)
            }
            _ => (
                [AlertMethod::Slack, AlertMethod::Email],
                self.default_methods.as_slice(),
            ),
        };
        let order: Vec<AlertMethod> = preference
            .into_iter()
            .filter(|m| selected.contains(m))
            .collect();
        if order.is_empty() {
            return Err(AlertError::NoDispatchMethod);
        }
        Ok(order)
    }

    /// Sends `input` through every resolved method. Every channel is tried
    /// even after one fails; the result is `true` only if all succeeded.
    pub async fn send(
        &self,
        input: impl Into<ComponentInput>,
        methods: Option<&[AlertMethod]>,
        options: &SendOptions,
    ) -> Result<bool> {
        let components = input.into().normalize();
        let methods = self.resolve_methods(methods)?;

        let mut all_sent = true;
        for method in methods {
            let Some(channel) = self.channels.iter().find(|c| c.method() == method) else {
                warn!(%method, "No channel registered for alert method");
                all_sent = false;
                continue;
            };
            let sent = channel.send(&components, options).await;
            if !sent {
                error!(%method, "Alert was not delivered");
            }
            all_sent &= sent;
        }

        if all_sent {
            info!(components = components.len(), "Alert dispatched");
        }
        Ok(all_sent)
    }
}

#[async_trait]
impl AlertSender for Dispatcher {
    async fn send_components(&self, components: Vec<Component>) -> bool {
        match self.send(components, None, &SendOptions::default()).await {
            Ok(sent) => sent,
            Err(e) => {
                error!(error = %e, "Failed to dispatch alert");
                false
            }
        }
    }
}

/// Sends one alert using the channels configured in `config`.
///
/// `methods` overrides `config.alert_methods`. Fails with `NoDispatchMethod`
/// when neither selects anything; delivery failures are reported as `false`.
pub async fn send_alert(
    config: &Config,
    input: impl Into<ComponentInput>,
    methods: Option<&[AlertMethod]>,
    options: &SendOptions,
) -> Result<bool> {
    Dispatcher::from_config(config)
        .send(input, methods, options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(methods: Vec<AlertMethod>) -> Dispatcher {
        Dispatcher::from_config(&Config {
            alert_methods: methods,
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_method_names() {
        assert_eq!("Slack".parse::<AlertMethod>().unwrap(), AlertMethod::Slack);
        assert_eq!(" email ".parse::<AlertMethod>().unwrap(), AlertMethod::Email);
        assert!(matches!(
            "pager".parse::<AlertMethod>(),
            Err(AlertError::UnknownMethod(name)) if name == "pager"
        ));
    }

    #[test]
    fn test_explicit_methods_are_email_first() {
        let d = dispatcher(vec![]);
        assert_eq!(
            d.resolve_methods(Some(&[AlertMethod::Slack, AlertMethod::Email]))
                .unwrap(),
            vec![AlertMethod::Email, AlertMethod::Slack]
        );
    }

    #[test]
    fn test_configured_methods_are_slack_first() {
        let d = dispatcher(vec![AlertMethod::Email, AlertMethod::Slack]);
        assert_eq!(
            d.resolve_methods(None).unwrap(),
            vec![AlertMethod::Slack, AlertMethod::Email]
        );
    }

    #[test]
    fn test_nothing_selected_is_an_error() {
        let d = dispatcher(vec![]);
        assert!(matches!(
            d.resolve_methods(None),
            Err(AlertError::NoDispatchMethod)
        ));
        assert!(matches!(
            d.resolve_methods(Some(&[])),
            Err(AlertError::NoDispatchMethod)
        ));
    }
}
