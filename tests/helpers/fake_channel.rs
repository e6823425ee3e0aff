#![allow(dead_code)]
//! Fake delivery channels and senders that record what they were given.

use alert_msgs::notification::AlertChannel;
use alert_msgs::{AlertMethod, AlertSender, Component, SendOptions};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// A channel that records every send and answers with a fixed result.
#[derive(Clone)]
pub struct RecordingChannel {
    method: AlertMethod,
    succeed: bool,
    pub sent: Arc<Mutex<Vec<(Vec<Component>, SendOptions)>>>,
}

impl RecordingChannel {
    pub fn new(method: AlertMethod, succeed: bool) -> Self {
        Self {
            method,
            succeed,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn method(&self) -> AlertMethod {
        self.method
    }

    async fn send(&self, components: &[Component], options: &SendOptions) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((components.to_vec(), options.clone()));
        self.succeed
    }
}

/// A gate sender that records when each delivery started.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(Instant, Vec<Component>)>>,
    /// Number of initial sends to fail.
    pub failures: Mutex<usize>,
    /// How long each delivery takes.
    pub delay: Duration,
}

impl RecordingSender {
    pub fn failing(times: usize) -> Self {
        Self {
            failures: Mutex::new(times),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn times(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn payloads(&self) -> Vec<Vec<Component>> {
        self.sent.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

#[async_trait]
impl AlertSender for RecordingSender {
    async fn send_components(&self, components: Vec<Component>) -> bool {
        self.sent.lock().unwrap().push((Instant::now(), components));
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return false;
        }
        true
    }
}
