//! Sends alerts as HTML email over SMTP.
//!
//! Tables too large to read inline are detached into CSV attachments before
//! the body is compiled, so the message stays small enough for mail clients.

use super::{retry_send, AlertChannel, Attachment};
use crate::components::Component;
use crate::config::EmailConfig;
use crate::dispatch::{AlertMethod, SendOptions};
use crate::error::{AlertError, Result};
use crate::render::render_components_html;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error, info, instrument, Span};

/// Port on which SMTP servers expect implicit TLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Something that can deliver a finished email message.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &Message) -> Result<()>;
}

impl MailTransport for SmtpTransport {
    fn send(&self, message: &Message) -> Result<()> {
        lettre::Transport::send(self, message)
            .map(|_| ())
            .map_err(|e| AlertError::Transport(e.to_string()))
    }
}

/// Sends alerts as HTML email.
pub struct EmailChannel {
    config: EmailConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl EmailChannel {
    /// Creates a channel that connects to the configured SMTP server.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Uses `transport` instead of an SMTP connection.
    pub fn with_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn smtp_transport(&self, username: &str, password: &str) -> Result<SmtpTransport> {
        let builder = if self.config.smtp_port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&self.config.smtp_server)
        } else {
            SmtpTransport::starttls_relay(&self.config.smtp_server)
        }
        .map_err(|e| AlertError::Transport(format!("failed to create SMTP transport: {e}")))?;

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build())
    }

    /// Compiles the message and picks the transport for one send.
    fn prepare(
        &self,
        components: &[Component],
        options: &SendOptions,
    ) -> Result<(Message, Arc<dyn MailTransport>)> {
        let (sender, password) = match (&self.config.addr, &self.config.password) {
            (Some(addr), Some(password)) => (addr, password),
            _ => {
                return Err(AlertError::ConfigurationMissing(
                    "email.addr and email.password".into(),
                ))
            }
        };
        let receiver = options
            .email_receiver
            .as_ref()
            .or(self.config.receiver_addr.as_ref())
            .unwrap_or(sender);
        let subject = options.subject.as_deref().unwrap_or(&self.config.subject);

        let mut components = components.to_vec();
        let attachments =
            detach_oversized_tables(&mut components, self.config.max_inline_table_rows)?;
        let html = render_components_html(&components)?;
        let message = build_message(sender, receiver, subject, html, &attachments)?;

        let transport: Arc<dyn MailTransport> = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(self.smtp_transport(sender, password)?),
        };
        Ok((message, transport))
    }
}

/// Detaches the rows of every table longer than `max_rows` and returns the
/// resulting CSV files in component order.
pub fn detach_oversized_tables(
    components: &mut [Component],
    max_rows: usize,
) -> Result<Vec<Attachment>> {
    let mut attachments = Vec::new();
    for table in components.iter_mut().filter_map(Component::as_table_mut) {
        if table.rows().len() > max_rows {
            let (filename, content) = table.detach_rows_as_file()?;
            attachments.push(Attachment { filename, content });
        }
    }
    Ok(attachments)
}

/// Builds a `multipart/mixed` message with an HTML body followed by one
/// `text/csv` part per attachment.
pub fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    html: String,
    attachments: &[Attachment],
) -> Result<Message> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| AlertError::Email(format!("invalid sender address '{from}': {e}")))?;
    let to: Mailbox = to
        .parse()
        .map_err(|e| AlertError::Email(format!("invalid receiver address '{to}': {e}")))?;
    let csv = ContentType::parse("text/csv")
        .map_err(|e| AlertError::Email(format!("invalid content type: {e}")))?;

    let body = attachments.iter().fold(
        MultiPart::mixed().singlepart(SinglePart::html(html)),
        |body, attachment| {
            body.singlepart(
                MailAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), csv.clone()),
            )
        },
    );

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(body)
        .map_err(|e| AlertError::Email(format!("failed to build email: {e}")))
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn method(&self) -> AlertMethod {
        AlertMethod::Email
    }

    #[instrument(skip_all, fields(components = components.len()))]
    async fn send(&self, components: &[Component], options: &SendOptions) -> bool {
        let (message, transport) = match self.prepare(components, options) {
            Ok(prepared) => prepared,
            Err(e) => {
                error!(error = %e, "Cannot send email alert");
                return false;
            }
        };
        let retries = options.retries.unwrap_or(self.config.retries);
        debug!(retries, "Sending email alert");

        let span = Span::current();
        let result = task::spawn_blocking(move || {
            let _entered = span.enter();
            retry_send("email", retries, |_| transport.send(&message))
        })
        .await;

        match result {
            Ok(sent) => {
                if sent {
                    info!("Email alert delivered");
                }
                sent
            }
            Err(e) => {
                error!(error = %e, "Email notification task failed");
                false
            }
        }
    }
}
