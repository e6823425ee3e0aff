//! Delivery channels for compiled alerts.
//!
//! Each channel renders the components in its own format and reports success
//! as a plain `bool`; failures are logged, never raised, so one broken
//! channel cannot stop the others.

pub mod email;
pub mod slack;

use crate::components::Component;
use crate::dispatch::{AlertMethod, SendOptions};
use crate::error::Result;
use async_trait::async_trait;
use tracing::{error, info};

/// A named file sent alongside a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A destination alerts can be delivered to.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    fn method(&self) -> AlertMethod;

    /// Delivers the components, retrying as configured. Returns whether the
    /// message was accepted.
    async fn send(&self, components: &[Component], options: &SendOptions) -> bool;
}

/// Runs `attempt` up to `retries + 1` times, stopping at the first success.
///
/// Every attempt increments `alerts_sent_total` or `alert_send_failures_total`
/// (labelled by `channel`) on the installed `metrics` recorder.
///
/// Blocking; call it from `spawn_blocking`.
pub(crate) fn retry_send<F>(channel: &'static str, retries: u32, mut attempt: F) -> bool
where
    F: FnMut(u32) -> Result<()>,
{
    for n in 1..=retries.saturating_add(1) {
        match attempt(n) {
            Ok(()) => {
                info!(channel, attempt = n, "Alert sent");
                metrics::counter!("alerts_sent_total", "channel" => channel).increment(1);
                return true;
            }
            Err(e) => {
                error!(channel, attempt = n, error = %e, "Failed to send alert");
                metrics::counter!("alert_send_failures_total", "channel" => channel).increment(1);
            }
        }
    }
    false
}
