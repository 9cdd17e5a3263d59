//! config/paths.rs
//! Rutas bien conocidas dentro del directorio de datos, compartidas con el dashboard.

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const STATUS_FILE: &str = "status.json";
pub const STOP_FLAG_FILE: &str = "stop.flag";
pub const DATABASE_FILE: &str = "clients.db";

#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub config: PathBuf,
    pub status: PathBuf,
    pub stop_flag: PathBuf,
    pub database: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        DataPaths {
            config: data_dir.join(CONFIG_FILE),
            status: data_dir.join(STATUS_FILE),
            stop_flag: data_dir.join(STOP_FLAG_FILE),
            database: data_dir.join(DATABASE_FILE),
            data_dir,
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        if let Some(path) = config {
            self.config = path;
        }
        self
    }

    pub fn with_database(mut self, database: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.database = path;
        }
        self
    }
}
