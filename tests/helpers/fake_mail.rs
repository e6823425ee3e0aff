#![allow(dead_code)]
//! An in-memory mail transport.

use alert_msgs::notification::email::MailTransport;
use alert_msgs::{AlertError, Result};
use lettre::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeMailTransport {
    fail_first: usize,
    attempts: AtomicUsize,
    pub delivered: Mutex<Vec<String>>,
}

impl FakeMailTransport {
    /// A transport whose first `n` sends fail.
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<String> {
        self.delivered.lock().unwrap().last().cloned()
    }
}

impl MailTransport for FakeMailTransport {
    fn send(&self, message: &Message) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(AlertError::Transport("421 service not available".into()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(&message.formatted()).into_owned());
        Ok(())
    }
}
