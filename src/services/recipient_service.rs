//! services/recipient_service.rs
//! Acceso a la tabla `clients` (SQLite), compartida con el dashboard.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite};

use crate::error::StoreError;
use crate::models::recipient_model::{NewRecipient, Recipient, SENT_MARKER, UNSENT_MARKER};

/// Espera de SQLite ante bloqueos antes de devolver SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Contrato del almacén de destinatarios que usa el motor.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    /// Destinatarios no enviados, en el orden por defecto del almacén.
    async fn fetch_unsent(&self) -> Result<Vec<Recipient>, StoreError>;

    /// Idempotente: marcar dos veces deja "OUI".
    async fn mark_sent(&self, id: i64) -> Result<(), StoreError>;

    async fn insert(&self, recipient: &NewRecipient) -> Result<i64, StoreError>;
}

/// Abre (o crea) la base SQLite.
pub async fn connect(db_path: &Path) -> Result<Pool<Sqlite>, StoreError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Other(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
    }

    log::info!("Conectando a SQLite en {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = Pool::<Sqlite>::connect_with(options).await?;
    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    id: i64,
    email: Option<String>,
    name: Option<String>,
    sent_flag: Option<String>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Recipient {
            id: row.id,
            email: row.email.unwrap_or_default(),
            name: row.name,
            sent_flag: row.sent_flag,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecipientService {
    db_pool: Pool<Sqlite>,
}

impl RecipientService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        RecipientService { db_pool }
    }

    /// Crea la tabla si no existe (bases ya importadas quedan intactas).
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await?;
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM clients WHERE "Email 1" = ?1"#)
            .bind(email)
            .fetch_one(&self.db_pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl RecipientStore for RecipientService {
    async fn fetch_unsent(&self) -> Result<Vec<Recipient>, StoreError> {
        let rows: Vec<RecipientRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                "Email 1" AS email,
                Nom AS name,
                "Envoyé ?" AS sent_flag
            FROM clients
            WHERE "Envoyé ?" IS NULL OR "Envoyé ?" != ?1
            "#,
        )
        .bind(SENT_MARKER)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn mark_sent(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(r#"UPDATE clients SET "Envoyé ?" = ?1 WHERE id = ?2"#)
            .bind(SENT_MARKER)
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn insert(&self, recipient: &NewRecipient) -> Result<i64, StoreError> {
        let email = recipient.email.trim();
        if !email.is_empty() && self.email_exists(email).await? {
            return Err(StoreError::Duplicate(email.to_string()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO clients (
                Provenance, "Civilité", Nom, "Prénom", "Société - Nom", "Email 1", "Envoyé ?"
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(recipient.source.as_deref().unwrap_or("Script"))
        .bind(recipient.civility.as_deref().unwrap_or(""))
        .bind(recipient.name.as_deref().unwrap_or(""))
        .bind(recipient.first_name.as_deref().unwrap_or(""))
        .bind(recipient.company.as_deref().unwrap_or(""))
        .bind(email)
        .bind(UNSENT_MARKER)
        .execute(&self.db_pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
