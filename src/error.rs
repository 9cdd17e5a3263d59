//! error.rs
//! Taxonomía de errores de la campaña.

use std::path::PathBuf;

/// Códigos primarios de SQLite que indican contención temporal.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Error de alto nivel del motor de campaña.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Template {path} unreadable: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// El mensaje salió pero el destinatario no quedó marcado como enviado.
    #[error("{email} was delivered but could not be marked as sent: {source}")]
    DeliveryAccounting {
        email: String,
        #[source]
        source: StoreError,
    },

    #[error("Status file error: {0}")]
    Status(String),

    #[error("Unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl CampaignError {
    pub fn config(message: impl Into<String>) -> Self {
        CampaignError::Configuration(message.into())
    }
}

/// Errores del almacén de destinatarios.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Base bloqueada u ocupada; se espera que se resuelva sola.
    #[error("store temporarily unavailable: {0}")]
    Contention(String),

    #[error("recipient {0} already exists")]
    Duplicate(String),

    #[error("recipient {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Solo la contención se reintenta.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Contention(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return StoreError::Duplicate(db_err.message().to_string());
                }
                // SQLite reporta el código extendido; el primario va en el byte bajo
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                match primary {
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
                        StoreError::Contention(db_err.message().to_string())
                    }
                    _ => StoreError::Other(err.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut => StoreError::Contention(err.to_string()),
            _ => StoreError::Other(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Other(format!("migration failed: {err}"))
    }
}

/// El transporte rechazó o no pudo completar el envío.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);
