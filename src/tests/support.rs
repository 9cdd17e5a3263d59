//! tests/support.rs
//! Dobles en memoria del almacén y del transporte, y helpers comunes.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::campaign_config::CampaignSettings;
use crate::error::{DeliveryError, StoreError};
use crate::models::campaign_model::OutgoingMessage;
use crate::models::recipient_model::{NewRecipient, Recipient, SENT_MARKER, UNSENT_MARKER};
use crate::models::status_model::{RunMode, RunStatus};
use crate::services::campaign_service::CampaignEngine;
use crate::services::cancel_service::CancelFlag;
use crate::services::email_service::Mailer;
use crate::services::recipient_service::RecipientStore;
use crate::services::status_service::StatusPublisher;

pub const TEMPLATE: &str = "<h1>Bonjour</h1>";

pub fn recipient(id: i64, email: &str) -> Recipient {
    Recipient {
        id,
        email: email.to_string(),
        name: None,
        sent_flag: Some(UNSENT_MARKER.to_string()),
    }
}

pub fn recipients(count: usize) -> Vec<Recipient> {
    (1..=count as i64)
        .map(|id| recipient(id, &format!("client{id}@example.com")))
        .collect()
}

#[derive(Default)]
pub struct FakeStore {
    pub recipients: Mutex<Vec<Recipient>>,
    pub marked: Mutex<Vec<i64>>,
    pub fetch_calls: AtomicU32,
    pub mark_calls: AtomicU32,
    transient_mark_failures: AtomicU32,
    permanent_mark_error: bool,
    stop_flag_on_first_mark: Option<PathBuf>,
    insert_on_first_mark: Option<Recipient>,
    deleted: HashSet<i64>,
}

impl FakeStore {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        FakeStore {
            recipients: Mutex::new(recipients),
            ..Default::default()
        }
    }

    /// Los primeros `count` marcados fallan por contención.
    pub fn failing_marks(mut self, count: u32) -> Self {
        self.transient_mark_failures = AtomicU32::new(count);
        self
    }

    pub fn permanent_mark_error(mut self) -> Self {
        self.permanent_mark_error = true;
        self
    }

    /// Simula al operador pulsando STOP justo después del primer marcado.
    pub fn stop_after_first_mark(mut self, flag: &Path) -> Self {
        self.stop_flag_on_first_mark = Some(flag.to_path_buf());
        self
    }

    /// Simula un alta concurrente desde el dashboard durante la ejecución.
    pub fn insert_after_first_mark(mut self, recipient: Recipient) -> Self {
        self.insert_on_first_mark = Some(recipient);
        self
    }

    /// Simula filas borradas desde el dashboard después del snapshot.
    pub fn deleted_mid_run(mut self, ids: &[i64]) -> Self {
        self.deleted.extend(ids.iter().copied());
        self
    }

    pub fn marked(&self) -> Vec<i64> {
        self.marked.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipientStore for FakeStore {
    async fn fetch_unsent(&self) -> Result<Vec<Recipient>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .recipients
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.is_sent())
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: i64) -> Result<(), StoreError> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        if self.permanent_mark_error {
            return Err(StoreError::Other("disk I/O error".to_string()));
        }
        let pending = self.transient_mark_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.transient_mark_failures.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Contention("database is locked".to_string()));
        }
        if self.deleted.contains(&id) {
            return Err(StoreError::NotFound(id));
        }

        let mut recipients = self.recipients.lock().unwrap();
        let target = recipients
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        target.sent_flag = Some(SENT_MARKER.to_string());

        let mut marked = self.marked.lock().unwrap();
        marked.push(id);
        if marked.len() == 1 {
            if let Some(flag) = &self.stop_flag_on_first_mark {
                fs::write(flag, "STOP").unwrap();
            }
            if let Some(extra) = &self.insert_on_first_mark {
                recipients.push(extra.clone());
            }
        }
        Ok(())
    }

    async fn insert(&self, recipient: &NewRecipient) -> Result<i64, StoreError> {
        let mut recipients = self.recipients.lock().unwrap();
        if recipients.iter().any(|r| r.email == recipient.email) {
            return Err(StoreError::Duplicate(recipient.email.clone()));
        }
        let id = recipients.len() as i64 + 1;
        recipients.push(Recipient {
            id,
            email: recipient.email.clone(),
            name: recipient.name.clone(),
            sent_flag: Some(UNSENT_MARKER.to_string()),
        });
        Ok(id)
    }
}

#[derive(Default)]
pub struct FakeMailer {
    fail_for: HashSet<String>,
    status_path: Option<PathBuf>,
    pub delivered: Mutex<Vec<OutgoingMessage>>,
    /// Estado publicado visto en el momento de cada entrega.
    pub observed: Mutex<Vec<RunStatus>>,
}

impl FakeMailer {
    pub fn new() -> Self {
        FakeMailer::default()
    }

    pub fn failing_for(mut self, email: &str) -> Self {
        self.fail_for.insert(email.to_string());
        self
    }

    pub fn observing(mut self, status_path: &Path) -> Self {
        self.status_path = Some(status_path.to_path_buf());
        self
    }

    pub fn delivered_to(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.to.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError> {
        if let Some(path) = &self.status_path {
            if let Some(status) = StatusPublisher::read(path) {
                self.observed.lock().unwrap().push(status);
            }
        }
        if self.fail_for.contains(&message.to) {
            return Err(DeliveryError(format!("550 mailbox unavailable: {}", message.to)));
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Directorio de datos de prueba con plantilla escrita.
pub struct TestDir {
    pub dir: tempfile::TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("template.html"), TEMPLATE).unwrap();
        TestDir { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn status_path(&self) -> PathBuf {
        self.path().join("status.json")
    }

    pub fn flag_path(&self) -> PathBuf {
        self.path().join("stop.flag")
    }

    pub fn settings(&self, daily_limit: u32, min_delay: u64, max_delay: u64) -> CampaignSettings {
        CampaignSettings {
            daily_limit,
            min_delay_seconds: min_delay,
            max_delay_seconds: max_delay,
            template_path: self.path().join("template.html"),
            subject: "Offre".to_string(),
            test_email: None,
        }
    }

    pub fn engine(
        &self,
        settings: CampaignSettings,
        store: &Arc<FakeStore>,
        mailer: &Arc<FakeMailer>,
        mode: RunMode,
    ) -> CampaignEngine {
        CampaignEngine::new(
            settings,
            store.clone(),
            mailer.clone(),
            StatusPublisher::new(self.status_path()),
            CancelFlag::new(self.flag_path()),
            mode,
        )
        .unwrap()
        .with_rng(StdRng::seed_from_u64(7))
    }

    pub fn status(&self) -> RunStatus {
        StatusPublisher::read(&self.status_path()).expect("status.json should exist")
    }
}
