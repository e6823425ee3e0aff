//! alert-msgs - structured alert messages for email and Slack
//!
//! Alerts are built from a small set of components (text, key/value maps,
//! tables and line breaks), compiled to inline-styled HTML or Markdown, and
//! delivered through Slack or SMTP with bounded retries.

pub mod cli;
pub mod components;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod html;
pub mod notification;
pub mod render;
pub mod style;
pub mod utils;

pub use components::{Component, KeyValueMap, LineBreak, Table, Text};
pub use dispatch::{send_alert, AlertMethod, Dispatcher, SendOptions};
pub use error::{AlertError, Result};
pub use gate::{AlertGate, AlertSender, GateOutcome, OverlapPolicy};
pub use render::{render_html, render_markdown, ComponentInput, ComponentItem};
pub use style::{ContentType, FontSize};
