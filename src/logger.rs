//! logger.rs
//! Configuración del logger usando env_logger.

/// Dependencias ruidosas, limitadas a warn salvo que RUST_LOG diga otra cosa.
const QUIET_TARGETS: &[&str] = &["sqlx", "lettre"];

pub fn init_logger() {
    // RUST_LOG manda; si no está, "info" para la app y warn para las dependencias.
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env))
        .format_timestamp_secs()
        .init();
}

fn default_filter() -> String {
    let mut filter = String::from("info");
    for target in QUIET_TARGETS {
        filter.push_str(&format!(",{target}=warn"));
    }
    filter
}
