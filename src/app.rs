//! app.rs
//! Línea de comandos y despacho hacia los handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::paths::DataPaths;
use crate::error::{CampaignError, StoreError};
use crate::handlers::{campaign_handler, control_handler, test_send_handler};
use crate::models::{recipient_model::NewRecipient, status_model::RunMode};

#[derive(Debug, Parser)]
#[command(name = "campaign_mailer", version, about = "Bulk email campaign runner")]
pub struct Cli {
    /// Directorio con config.json, status.json, stop.flag y clients.db
    #[arg(long, env = "CAMPAIGN_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Ruta alternativa a config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ruta alternativa a la base SQLite
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lanza la campaña (dry-run salvo --real)
    Run {
        #[arg(long)]
        real: bool,
    },
    /// Envía un único correo de prueba a la dirección de diagnóstico
    SendTest {
        #[arg(long)]
        to: Option<String>,
    },
    /// Pide la parada de la campaña en curso
    Stop,
    /// Muestra el último estado publicado
    Status,
    /// Da de alta un destinatario
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        civility: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
}

impl Cli {
    pub fn paths(&self) -> DataPaths {
        DataPaths::new(&self.data_dir)
            .with_config(self.config.clone())
            .with_database(self.database.clone())
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let paths = cli.paths();

    match cli.command {
        Command::Run { real } => {
            let mode = RunMode::from_real_flag(real);
            let report = campaign_handler::run_campaign(&paths, mode).await?;
            log::info!(
                "Run {:?}: {} sent, {} failed, {} remaining of {}",
                report.outcome,
                report.sent,
                report.failed,
                report.remaining,
                report.total
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::SendTest { to } => {
            if test_send_handler::send_test(&paths, to).await? {
                println!("Test email sent successfully.");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Failed to send test email.");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Stop => {
            control_handler::request_stop(&paths)?;
            println!("Stop signal sent.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            match control_handler::read_status(&paths) {
                Some(status) => println!("{}", serde_json::to_string_pretty(&status)?),
                None => println!("no status yet"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Add {
            email,
            name,
            first_name,
            company,
            civility,
            source,
        } => {
            let recipient = NewRecipient {
                email,
                name,
                first_name,
                company,
                civility,
                source,
            };
            match control_handler::add_recipient(&paths, recipient).await {
                Ok(id) => {
                    println!("Recipient added (id {id}).");
                    Ok(ExitCode::SUCCESS)
                }
                Err(CampaignError::Store(StoreError::Duplicate(email))) => {
                    println!("Recipient {email} already exists.");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
