//! services/campaign_service.rs
//! Motor de campaña: snapshot de no enviados, cuota diaria, envío uno a uno,
//! pausas aleatorias y parada cooperativa vía stop.flag.

use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::campaign_config::CampaignSettings,
    error::{CampaignError, StoreError},
    models::{
        campaign_model::{OutgoingMessage, RunOutcome, RunReport},
        status_model::{RunCounters, RunMode, RunStatus},
    },
    services::{
        cancel_service::CancelFlag,
        email_service::Mailer,
        pacing_service::{total_to_send, PacingPolicy},
        recipient_service::RecipientStore,
        retry_service::RetryPolicy,
        status_service::StatusPublisher,
        template_service::load_template,
    },
};

/// Pausa fija entre envíos simulados.
pub const DRY_RUN_PAUSE: Duration = Duration::from_millis(500);
/// Granularidad de la pausa; acota la latencia de parada.
const PAUSE_TICK: Duration = Duration::from_secs(1);
const MAX_STATUS_ERROR_CHARS: usize = 100;

pub struct CampaignEngine {
    settings: CampaignSettings,
    store: Arc<dyn RecipientStore>,
    mailer: Arc<dyn Mailer>,
    publisher: StatusPublisher,
    cancel: CancelFlag,
    mode: RunMode,
    pacing: PacingPolicy,
    read_retry: RetryPolicy,
    mark_retry: RetryPolicy,
    rng: StdRng,
    counters: RunCounters,
    failed_emails: Vec<String>,
    unconfirmed_emails: Vec<String>,
}

impl CampaignEngine {
    pub fn new(
        settings: CampaignSettings,
        store: Arc<dyn RecipientStore>,
        mailer: Arc<dyn Mailer>,
        publisher: StatusPublisher,
        cancel: CancelFlag,
        mode: RunMode,
    ) -> Result<Self, CampaignError> {
        let pacing = PacingPolicy::new(settings.min_delay_seconds, settings.max_delay_seconds)?;
        Ok(CampaignEngine {
            settings,
            store,
            mailer,
            publisher,
            cancel,
            mode,
            pacing,
            read_retry: RetryPolicy::read_path(),
            mark_retry: RetryPolicy::mark_sent_path(),
            rng: StdRng::from_entropy(),
            counters: RunCounters::default(),
            failed_emails: Vec::new(),
            unconfirmed_emails: Vec::new(),
        })
    }

    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Ejecuta la campaña completa. Cualquier error deja un estado FAILED publicado.
    pub async fn run(mut self) -> Result<RunReport, CampaignError> {
        match self.execute().await {
            Ok(report) => Ok(report),
            Err(e) => {
                log::error!("(run) Campaign aborted in {} mode: {}", self.mode, e);
                let reason: String = e.to_string().chars().take(MAX_STATUS_ERROR_CHARS).collect();
                self.publish_finished(format!("Critical error: {reason}"));
                self.log_report();
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<RunReport, CampaignError> {
        let template = load_template(&self.settings.template_path)?;
        log::info!(
            "(execute) Template {} loaded ({} bytes)",
            self.settings.template_path.display(),
            template.len()
        );

        let store = Arc::clone(&self.store);
        let snapshot = self
            .read_retry
            .run("fetch_unsent", || store.fetch_unsent())
            .await?;

        let total = total_to_send(snapshot.len(), self.settings.daily_limit);
        self.counters = RunCounters::new(total);
        log::info!(
            "(execute) {} unsent recipients, {} to send in {} mode (limit {}/day)",
            snapshot.len(),
            total,
            self.mode,
            self.settings.daily_limit
        );

        if total == 0 {
            self.publish_completed("No emails to send.".to_string());
            return Ok(self.report(RunOutcome::Completed));
        }

        self.publish_active(format!(
            "Ready: {} emails to send (limit: {}/day)",
            total, self.settings.daily_limit
        ));

        for (index, recipient) in snapshot.iter().take(total).enumerate() {
            if self.cancel.consume() {
                let message = format!(
                    "Stopped: {} sent, {} failed",
                    self.counters.sent, self.counters.failed
                );
                return Ok(self.stop(message));
            }

            // Se envía a la dirección tal como está guardada
            let email = recipient.email.as_str();
            if email.trim().is_empty() {
                log::warn!("(execute) [SKIP] recipient {} has no email", recipient.id);
                self.counters.failed += 1;
                continue;
            }

            self.publish_active(format!("Sending {}/{}: {}", index + 1, total, email));

            if self.mode.is_dry_run() {
                log::info!("(execute) [DRY RUN] {}", email);
                self.counters.sent += 1;
                tokio::time::sleep(DRY_RUN_PAUSE).await;
                continue;
            }

            let message = OutgoingMessage {
                to: email.to_string(),
                subject: self.settings.subject.clone(),
                html_body: template.clone(),
            };

            if let Err(e) = self.mailer.deliver(&message).await {
                log::warn!("(execute) [FAILED] {}: {}", email, e);
                self.counters.failed += 1;
                self.failed_emails.push(email.to_string());
                continue;
            }

            match self.mark_sent(recipient.id).await {
                Ok(()) => {
                    self.counters.sent += 1;
                    log::info!("(execute) [SENT] {}", email);
                }
                Err(StoreError::NotFound(id)) => {
                    // Fila borrada durante la ejecución: el envío cuenta, no hay nada que marcar
                    self.counters.sent += 1;
                    log::warn!(
                        "(execute) [SENT] {} but recipient {} no longer exists in the store",
                        email,
                        id
                    );
                }
                Err(source) => {
                    // Entregado pero sin marcar: cuenta como fallo y se reporta aparte
                    let transient = source.is_transient();
                    let err = CampaignError::DeliveryAccounting {
                        email: email.to_string(),
                        source,
                    };
                    log::error!("(execute) {}", err);
                    self.counters.failed += 1;
                    self.unconfirmed_emails.push(email.to_string());
                    if transient {
                        continue;
                    }
                    return Err(err);
                }
            }

            if self.pause(email).await {
                return Ok(self.report(RunOutcome::Stopped));
            }
        }

        let mut message = format!("Done! {} sent", self.counters.sent);
        if self.counters.failed > 0 {
            message.push_str(&format!(", {} failed", self.counters.failed));
        }
        log::info!("(execute) {}", message);
        self.publish_completed(message);
        self.log_report();
        Ok(self.report(RunOutcome::Completed))
    }

    async fn mark_sent(&self, id: i64) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        self.mark_retry
            .run("mark_sent", || store.mark_sent(id))
            .await
    }

    /// Pausa aleatoria tras un envío real. Devuelve `true` si se pidió parar.
    async fn pause(&mut self, last_email: &str) -> bool {
        let delay = self.pacing.sample(&mut self.rng);
        log::info!("(pause) {}s before next send", delay);

        for left in (1..=delay).rev() {
            if self.cancel.consume() {
                let message = format!("Stopped during pause: {} sent", self.counters.sent);
                self.stop(message);
                return true;
            }
            self.publish_active(format!("Pause {}s - last: {}", left, last_email));
            tokio::time::sleep(PAUSE_TICK).await;
        }
        false
    }

    fn stop(&mut self, message: String) -> RunReport {
        log::info!("(stop) Stop flag detected. {}", message);
        self.publish_finished(message);
        self.log_report();
        self.report(RunOutcome::Stopped)
    }

    fn report(&self, outcome: RunOutcome) -> RunReport {
        RunReport {
            outcome,
            total: self.counters.total,
            sent: self.counters.sent,
            failed: self.counters.failed,
            remaining: self.counters.remaining(),
            failed_emails: self.failed_emails.clone(),
            unconfirmed_emails: self.unconfirmed_emails.clone(),
        }
    }

    fn log_report(&self) {
        if !self.failed_emails.is_empty() {
            log::warn!("[REPORT] Failed emails: {:?}", self.failed_emails);
        }
        if !self.unconfirmed_emails.is_empty() {
            log::warn!(
                "[REPORT] Delivered but not marked as sent (will be sent again next run): {:?}",
                self.unconfirmed_emails
            );
        }
    }

    fn publish_active(&mut self, message: String) {
        let status = RunStatus::active(message, &self.counters, self.mode);
        self.publish(status);
    }

    fn publish_finished(&mut self, message: String) {
        let status = RunStatus::finished(message, &self.counters, self.mode);
        self.publish(status);
    }

    fn publish_completed(&mut self, message: String) {
        let status = RunStatus::completed(message, &self.counters, self.mode);
        self.publish(status);
    }

    // Un fallo al escribir el estado no detiene la campaña
    fn publish(&mut self, status: RunStatus) {
        if let Err(e) = self.publisher.publish(status) {
            log::error!(
                "(publish) Failed to write {}: {:#}",
                self.publisher.path().display(),
                e
            );
        }
    }
}
