//! A rate limiter that spaces alerts at least `min_interval` apart.
//!
//! Alerts arriving too early are not dropped: they are deferred until the
//! interval has passed. With `OverlapPolicy::Coalesce` all early alerts share
//! a single deferred slot and only the latest one is sent. Once the gate is
//! shut down every further send is refused with `GateOutcome::Cancelled`.

use crate::components::Component;
use crate::config::GateConfig;
use crate::render::ComponentInput;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Something the gate forwards alerts to.
#[async_trait]
pub trait AlertSender: Send + Sync + 'static {
    /// Delivers the components and reports whether it succeeded.
    async fn send_components(&self, components: Vec<Component>) -> bool;
}

/// How early sends behave while another deferred send is waiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Each early send gets its own deferred delivery.
    #[default]
    Independent,
    /// Early sends replace the pending payload; one delivery per interval.
    Coalesce,
}

/// What `AlertGate::send` did with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Sent immediately, with the sender's result.
    Sent(bool),
    /// Scheduled to be sent after the given delay.
    Deferred(Duration),
    /// Replaced the payload of an already scheduled send.
    Coalesced,
    /// Dropped because the gate has been shut down.
    Cancelled,
}

#[derive(Default)]
struct GateState {
    last_sent: Option<Instant>,
    pending: Option<Vec<Component>>,
    tasks: Vec<JoinHandle<()>>,
}

enum Payload {
    Owned(Vec<Component>),
    PendingSlot,
}

pub struct AlertGate<S: AlertSender> {
    sender: Arc<S>,
    min_interval: Duration,
    policy: OverlapPolicy,
    state: Arc<Mutex<GateState>>,
    shutdown_tx: watch::Sender<bool>,
}

fn lock(state: &Mutex<GateState>) -> MutexGuard<'_, GateState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: AlertSender> AlertGate<S> {
    pub fn new(sender: Arc<S>, min_interval: Duration, policy: OverlapPolicy) -> Self {
        Self {
            sender,
            min_interval,
            policy,
            state: Arc::new(Mutex::new(GateState::default())),
            shutdown_tx: watch::channel(false).0,
        }
    }

    pub fn from_config(sender: Arc<S>, config: &GateConfig) -> Self {
        Self::new(
            sender,
            Duration::from_secs(config.min_interval_seconds),
            config.overlap,
        )
    }

    /// Sends the alert now if the interval has elapsed since the last
    /// successful send, otherwise schedules it.
    pub async fn send(&self, input: impl Into<ComponentInput>) -> GateOutcome {
        let components = input.into().normalize();
        let now = Instant::now();

        let previous = {
            let mut state = lock(&self.state);
            if *self.shutdown_tx.borrow() {
                warn!("Alert gate is shut down, dropping alert");
                return GateOutcome::Cancelled;
            }
            state.tasks.retain(|task| !task.is_finished());

            if self.policy == OverlapPolicy::Coalesce && state.pending.is_some() {
                debug!("Replacing pending alert");
                state.pending = Some(components);
                return GateOutcome::Coalesced;
            }

            if let Some(last) = state.last_sent {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.min_interval {
                    let wait = self.min_interval - elapsed;
                    let payload = match self.policy {
                        OverlapPolicy::Independent => Payload::Owned(components),
                        OverlapPolicy::Coalesce => {
                            state.pending = Some(components);
                            Payload::PendingSlot
                        }
                    };
                    let task = self.spawn_deferred(wait, payload);
                    state.tasks.push(task);
                    debug!(wait_ms = wait.as_millis() as u64, "Deferring alert");
                    return GateOutcome::Deferred(wait);
                }
            }

            // Reserve the slot so concurrent callers defer behind this send.
            state.last_sent.replace(now)
        };

        let sent = self.sender.send_components(components).await;
        if !sent {
            let mut state = lock(&self.state);
            if state.last_sent == Some(now) {
                state.last_sent = previous;
            }
        }
        GateOutcome::Sent(sent)
    }

    fn spawn_deferred(&self, wait: Duration, payload: Payload) -> JoinHandle<()> {
        let sender = Arc::clone(&self.sender);
        let state = Arc::clone(&self.state);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            if *shutdown_rx.borrow_and_update() {
                return;
            }
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("Deferred alert cancelled by shutdown");
                    return;
                }
                _ = sleep(wait) => {}
            }

            // Take the payload and reserve the slot in one critical section,
            // so callers arriving during delivery are deferred behind it.
            let (components, reserved, previous) = {
                let mut state = lock(&state);
                let components = match payload {
                    Payload::Owned(components) => components,
                    Payload::PendingSlot => match state.pending.take() {
                        Some(components) => components,
                        None => return,
                    },
                };
                let reserved = Instant::now();
                (components, reserved, state.last_sent.replace(reserved))
            };

            if !sender.send_components(components).await {
                error!("Deferred alert was not delivered");
                let mut state = lock(&state);
                if state.last_sent == Some(reserved) {
                    state.last_sent = previous;
                }
            }
        })
    }

    /// Number of deferred sends that have not finished yet.
    pub fn pending(&self) -> usize {
        let mut state = lock(&self.state);
        state.tasks.retain(|task| !task.is_finished());
        state.tasks.len()
    }

    /// Cancels every deferred send and waits for the tasks to exit. Later
    /// calls to `send` return `GateOutcome::Cancelled`.
    pub async fn shutdown(&self) {
        let tasks = {
            let mut state = lock(&self.state);
            self.shutdown_tx.send_replace(true);
            state.pending = None;
            std::mem::take(&mut state.tasks)
        };
        info!(tasks = tasks.len(), "Shutting down alert gate");
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Deferred alert task panicked");
            }
        }
    }
}
