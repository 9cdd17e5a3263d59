//! handlers/control_handler.rs
//! Lado operador: pedir la parada, leer el estado, dar de alta destinatarios.

use crate::{
    config::paths::DataPaths,
    error::CampaignError,
    models::{recipient_model::NewRecipient, status_model::RunStatus},
    services::{
        cancel_service::CancelFlag, recipient_service::RecipientStore,
        status_service::StatusPublisher,
    },
};

use super::campaign_handler::open_store;

pub fn request_stop(paths: &DataPaths) -> Result<(), CampaignError> {
    let flag = CancelFlag::new(&paths.stop_flag);
    flag.request().map_err(|e| {
        CampaignError::Status(format!("cannot create {}: {e}", flag.path().display()))
    })?;
    log::info!("Stop signal written to {}", flag.path().display());
    Ok(())
}

/// `None` mientras no haya un status.json legible.
pub fn read_status(paths: &DataPaths) -> Option<RunStatus> {
    StatusPublisher::read(&paths.status)
}

pub async fn add_recipient(
    paths: &DataPaths,
    recipient: NewRecipient,
) -> Result<i64, CampaignError> {
    let store = open_store(paths).await?;
    let id = store.insert(&recipient).await?;
    log::info!("Recipient {} added with id {}", recipient.email, id);
    Ok(id)
}
