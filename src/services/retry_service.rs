//! services/retry_service.rs
//! Reintentos ante contención del almacén (base bloqueada por el dashboard, etc.).

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * intento`
    Linear,
    /// `base * 2^(intento - 1)`
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Lecturas: pocas veces y rápido.
    pub fn read_path() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            backoff: Backoff::Linear,
        }
    }

    /// Marcar como enviado: perder esta escritura implica un reenvío mañana.
    pub fn mark_sent_path() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            backoff: Backoff::Exponential,
        }
    }

    /// Espera tras el intento fallido número `attempt` (desde 1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear => self.base_delay * attempt,
            Backoff::Exponential => self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1)),
        }
    }

    /// Ejecuta `op`, reintentando solo errores transitorios.
    /// Agotados los intentos, devuelve el último error observado.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    log::warn!(
                        "({op_name}) attempt {attempt}/{max_attempts} hit contention: {e}; retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
