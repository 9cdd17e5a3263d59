//! models/campaign_model.rs
//! Mensajes salientes y resultado de una ejecución.

use serde::Serialize;

/// Mensaje listo para el transporte. El cuerpo es la plantilla tal cual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub remaining: usize,
    /// Direcciones rechazadas por el transporte.
    pub failed_emails: Vec<String>,
    /// Entregadas pero sin marcar en el almacén (cuentan en `failed`).
    pub unconfirmed_emails: Vec<String>,
}
