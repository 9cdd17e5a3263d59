//! services/mod.rs
//! Módulo que agrupa los servicios de la campaña.

pub mod campaign_service;
pub mod cancel_service;
pub mod email_service;
pub mod pacing_service;
pub mod recipient_service;
pub mod retry_service;
pub mod status_service;
pub mod template_service;
