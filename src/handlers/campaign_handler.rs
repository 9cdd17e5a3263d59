//! handlers/campaign_handler.rs
//! `run`: prepara la ejecución (INITIALIZING) y entrega el control al motor.

use std::sync::Arc;

use crate::{
    config::{campaign_config::CampaignConfig, paths::DataPaths},
    error::CampaignError,
    models::{
        campaign_model::RunReport,
        status_model::{RunCounters, RunMode, RunStatus},
    },
    services::{
        campaign_service::CampaignEngine,
        cancel_service::CancelFlag,
        email_service::SmtpMailer,
        recipient_service::{self, RecipientService},
        status_service::StatusPublisher,
    },
};

pub async fn run_campaign(paths: &DataPaths, mode: RunMode) -> Result<RunReport, CampaignError> {
    let cancel = CancelFlag::new(&paths.stop_flag);
    let mut publisher = StatusPublisher::new(&paths.status);

    // Una señal vieja no debe abortar esta ejecución
    cancel.clear();
    publish_or_log(
        &mut publisher,
        RunStatus::active(
            format!("Starting in {mode} mode..."),
            &RunCounters::default(),
            mode,
        ),
    );

    let (config, store, mailer) = match prepare(paths).await {
        Ok(prepared) => prepared,
        Err(e) => {
            log::error!("(run_campaign) Initialization failed: {}", e);
            publish_or_log(
                &mut publisher,
                RunStatus::finished(format!("Error: {e}"), &RunCounters::default(), mode),
            );
            return Err(e);
        }
    };

    let engine = CampaignEngine::new(
        config.campaign,
        Arc::new(store),
        Arc::new(mailer),
        publisher,
        cancel,
        mode,
    )?;
    engine.run().await
}

/// Configuración, almacén y transporte; nada de esto toca destinatarios.
async fn prepare(
    paths: &DataPaths,
) -> Result<(CampaignConfig, RecipientService, SmtpMailer), CampaignError> {
    let config = CampaignConfig::load(paths)?;
    log::info!("(prepare) Configuration loaded: {:?}", config.smtp);

    let store = open_store(paths).await?;
    let mailer = SmtpMailer::from_settings(&config.smtp)?;
    Ok((config, store, mailer))
}

pub async fn open_store(paths: &DataPaths) -> Result<RecipientService, CampaignError> {
    let pool = recipient_service::connect(&paths.database).await?;
    let store = RecipientService::new(pool);
    store.run_migrations().await?;
    Ok(store)
}

fn publish_or_log(publisher: &mut StatusPublisher, status: RunStatus) {
    if let Err(e) = publisher.publish(status) {
        log::error!("Failed to write status file: {:#}", e);
    }
}
