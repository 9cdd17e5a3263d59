//! services/cancel_service.rs
//! Señal de parada: la presencia de stop.flag pide detener la campaña.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct CancelFlag {
    path: PathBuf,
}

impl CancelFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CancelFlag { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lado del operador. El contenido da igual.
    pub fn request(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, "STOP")
    }

    pub fn is_requested(&self) -> bool {
        self.path.exists()
    }

    /// Consume la señal: si existe la borra y devuelve `true`.
    pub fn consume(&self) -> bool {
        if !self.is_requested() {
            return false;
        }
        self.remove();
        true
    }

    /// Borra una señal vieja para que no aborte esta ejecución.
    pub fn clear(&self) {
        if self.is_requested() {
            log::info!("Removing stale stop flag {}", self.path.display());
            self.remove();
        }
    }

    fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}
