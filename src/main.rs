use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;

use crate::app::Cli;
use crate::logger::init_logger;

mod app;
mod config;
mod error;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok(); // Cargar .env al inicio: sus valores cuentan como entorno
    init_logger();

    let cli = Cli::parse();
    match app::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
