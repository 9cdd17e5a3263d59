//! handlers/test_send_handler.rs
//! `send-test`: un único envío síncrono para validar la conexión SMTP.

use crate::{
    config::{campaign_config::CampaignConfig, paths::DataPaths},
    error::CampaignError,
    models::campaign_model::OutgoingMessage,
    services::{
        email_service::{Mailer, SmtpMailer},
        template_service::load_template,
    },
};

pub const TEST_SUBJECT_PREFIX: &str = "[TEST] ";

/// Mensaje de diagnóstico: asunto con prefijo, plantilla tal cual.
pub fn build_test_message(
    config: &CampaignConfig,
    template: String,
    to_override: Option<String>,
) -> Result<OutgoingMessage, CampaignError> {
    let to = to_override
        .or_else(|| config.campaign.test_email.clone())
        .ok_or_else(|| {
            CampaignError::config("no test address: set campaign.test_email or pass --to")
        })?;

    Ok(OutgoingMessage {
        to,
        subject: format!("{TEST_SUBJECT_PREFIX}{}", config.campaign.subject),
        html_body: template,
    })
}

/// `Ok(true)` si el relay aceptó el mensaje.
pub async fn send_test(paths: &DataPaths, to: Option<String>) -> Result<bool, CampaignError> {
    let config = CampaignConfig::load(paths)?;
    let template = load_template(&config.campaign.template_path)?;
    let message = build_test_message(&config, template, to)?;
    let mailer = SmtpMailer::from_settings(&config.smtp)?;

    log::info!("(send_test) Sending TEST email to {}...", message.to);
    match mailer.deliver(&message).await {
        Ok(()) => {
            log::info!("(send_test) Test email sent successfully to {}", message.to);
            Ok(true)
        }
        Err(e) => {
            log::error!("(send_test) Failed to send test email: {}", e);
            Ok(false)
        }
    }
}
