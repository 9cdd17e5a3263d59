//! config/mod.rs
//! Configuración de la campaña y rutas del directorio de datos.

pub mod campaign_config;
pub mod paths;
