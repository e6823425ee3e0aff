//! Error types shared across rendering, configuration and dispatch.

use thiserror::Error;

/// Errors raised while building, rendering or sending an alert.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("invalid component: {0}")]
    InvalidComponent(String),

    #[error("table rows were already detached into '{0}'")]
    AlreadyDetached(String),

    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("no alert method selected or configured (valid choices: slack, email)")]
    NoDispatchMethod,

    #[error("unknown alert method '{0}' (valid choices: slack, email)")]
    UnknownMethod(String),

    #[error("failed to write CSV attachment: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to rewrite HTML document: {0}")]
    HtmlRewrite(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("email error: {0}")]
    Email(String),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

pub type Result<T, E = AlertError> = std::result::Result<T, E>;
