//! services/pacing_service.rs
//! Cuota diaria y pausas aleatorias entre envíos.

use rand::Rng;

use crate::error::CampaignError;

/// Cuántos destinatarios del snapshot se procesan en esta ejecución.
pub fn total_to_send(unsent_count: usize, daily_quota: u32) -> usize {
    unsent_count.min(daily_quota as usize)
}

/// Intervalo cerrado `[min, max]` en segundos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    min_delay_seconds: u64,
    max_delay_seconds: u64,
}

impl PacingPolicy {
    pub fn new(min_delay_seconds: u64, max_delay_seconds: u64) -> Result<Self, CampaignError> {
        if min_delay_seconds > max_delay_seconds {
            return Err(CampaignError::config(format!(
                "min delay ({min_delay_seconds}s) is greater than max delay ({max_delay_seconds}s)"
            )));
        }
        Ok(PacingPolicy {
            min_delay_seconds,
            max_delay_seconds,
        })
    }

    /// Una muestra uniforme por envío exitoso.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min_delay_seconds..=self.max_delay_seconds)
    }
}
