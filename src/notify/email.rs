//! SMTP delivery of booking emails.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Notifier, NotifyError};
use crate::config::EmailConfig;
use crate::render::Renderer;
use crate::validation::CleanedSchedule;

pub const CONFIRMATION_TEMPLATE: &str = "emails/schedule_confirmation.html";
pub const ADMIN_TEMPLATE: &str = "emails/schedule_notify_admin.html";

const CONFIRMATION_SUBJECT: &str = "Seu agendamento foi confirmado!";
const ADMIN_SUBJECT: &str = "Novo agendamento de treino recebido";

/// Renders booking emails and sends them over SMTP.
///
/// Without a transport (email disabled) messages are rendered and logged
/// instead of sent.
pub struct EmailNotifier {
    renderer: Arc<Renderer>,
    sender: String,
    admin: String,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig, renderer: Arc<Renderer>) -> Result<Self, NotifyError> {
        let transport = if config.enabled {
            Some(build_transport(config)?)
        } else {
            tracing::warn!("Email delivery disabled; notifications will only be logged");
            None
        };

        Ok(Self {
            renderer,
            sender: config.default_sender.clone(),
            admin: config.admin_address().to_string(),
            transport,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    async fn deliver(&self, to: &str, subject: &str, html: String) -> Result<(), NotifyError> {
        let Some(transport) = &self.transport else {
            tracing::warn!(to = %to, subject = %subject, "[EMAIL DISABLED] Message not sent");
            tracing::debug!(to = %to, body = %html, "Email body");
            return Ok(());
        };

        let message = Message::builder()
            .from(mailbox(&self.sender)?)
            .to(mailbox(to)?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                "Seu cliente de e-mail não consegue exibir HTML.".to_string(),
                html,
            ))?;

        transport.send(message).await?;
        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_confirmation(&self, booking: &CleanedSchedule) -> Result<(), NotifyError> {
        let html = self.renderer.render_with(CONFIRMATION_TEMPLATE, booking)?;
        self.deliver(&booking.email, CONFIRMATION_SUBJECT, html).await
    }

    async fn notify_admin(&self, booking: &CleanedSchedule) -> Result<(), NotifyError> {
        let html = self.renderer.render_with(ADMIN_TEMPLATE, booking)?;
        self.deliver(&self.admin, ADMIN_SUBJECT, html).await
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|_| NotifyError::Address(address.to_string()))
}

/// `use_tls` selects implicit TLS, otherwise STARTTLS.
fn build_transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
    let builder = if config.use_tls {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
    };

    let mut builder = builder.port(config.port);
    if !config.username.is_empty() {
        builder = builder.credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ));
    }

    tracing::info!(host = %config.host, port = config.port, tls = config.use_tls, "SMTP transport configured");
    Ok(builder.build())
}
