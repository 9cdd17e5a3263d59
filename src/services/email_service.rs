//! services/email_service.rs
//! Transporte SMTP (lettre) usado por el motor y por `send-test`.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::campaign_config::SmtpSettings,
    error::{CampaignError, DeliveryError},
    models::campaign_model::OutgoingMessage,
};

/// Entrega de un mensaje: éxito o `DeliveryError`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_settings(smtp: &SmtpSettings) -> Result<Self, CampaignError> {
        let from: Mailbox = smtp.from_email.parse().map_err(|e| {
            CampaignError::config(format!("invalid smtp.from_email {:?}: {e}", smtp.from_email))
        })?;

        // STARTTLS si el relay lo ofrece, texto plano si no
        let tls_params = TlsParameters::new(smtp.host.clone())
            .map_err(|e| CampaignError::config(format!("TLS setup for {}: {e}", smtp.host)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
            .port(smtp.port)
            .tls(Tls::Opportunistic(tls_params));

        if !smtp.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                smtp.user.clone(),
                smtp.password.clone(),
            ));
        }

        log::info!(
            "SMTP relay {}:{} (user={}, from={})",
            smtp.host,
            smtp.port,
            if smtp.user.is_empty() { "-" } else { smtp.user.as_str() },
            smtp.from_email
        );

        Ok(SmtpMailer {
            transport: builder.build(),
            from,
        })
    }

    /// Construye el mensaje HTML; una dirección inválida es un fallo de entrega.
    pub fn build_message(&self, message: &OutgoingMessage) -> Result<Message, DeliveryError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| DeliveryError(format!("invalid recipient address {:?}: {e}", message.to)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| DeliveryError(format!("cannot build message: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError> {
        let email = self.build_message(message)?;

        // Sin timeout propio: una llamada colgada bloquea la ejecución
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError(format!("SMTP send to {} failed: {e}", message.to)))
    }
}
