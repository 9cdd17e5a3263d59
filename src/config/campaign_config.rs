//! config/campaign_config.rs
//! Configuración inmutable de la campaña: defaults < config.json < variables de entorno.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::config::paths::DataPaths;
use crate::error::CampaignError;

pub const DEFAULT_SMTP_PORT: u16 = 25;
pub const DEFAULT_DAILY_LIMIT: u32 = 500;
pub const DEFAULT_MIN_DELAY_SECONDS: u64 = 30;
pub const DEFAULT_MAX_DELAY_SECONDS: u64 = 300;
pub const DEFAULT_TEMPLATE_FILE: &str = "email_template.html";

/// Búsqueda de variables de entorno, inyectable para tests.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
}

// El password nunca aparece en logs
impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("from_email", &self.from_email)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSettings {
    pub daily_limit: u32,
    pub min_delay_seconds: u64,
    pub max_delay_seconds: u64,
    /// Ya resuelto contra el directorio de datos.
    pub template_path: PathBuf,
    pub subject: String,
    /// Dirección de diagnóstico para `send-test`.
    pub test_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignConfig {
    pub smtp: SmtpSettings,
    pub campaign: CampaignSettings,
}

/// Contenido de config.json; todas las claves son opcionales.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub smtp: FileSmtp,
    #[serde(default)]
    pub campaign: FileCampaign,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileSmtp {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileCampaign {
    pub daily_limit: Option<u32>,
    pub min_delay_seconds: Option<u64>,
    pub max_delay_seconds: Option<u64>,
    pub template_file: Option<String>,
    pub subject: Option<String>,
    pub test_email: Option<String>,
}

impl FileConfig {
    /// Un archivo ausente equivale a un archivo vacío.
    pub fn read(path: &Path) -> Result<Self, CampaignError> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(FileConfig::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| {
            CampaignError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| CampaignError::config(format!("invalid {}: {e}", path.display())))
    }
}

impl CampaignConfig {
    /// Carga desde el archivo de configuración y el entorno del proceso.
    pub fn load(paths: &DataPaths) -> Result<Self, CampaignError> {
        let file = FileConfig::read(&paths.config)?;
        Self::resolve(file, &|key| std::env::var(key).ok(), &paths.data_dir)
    }

    /// Fusiona las fuentes y valida el resultado.
    pub fn resolve(
        file: FileConfig,
        env: EnvLookup<'_>,
        data_dir: &Path,
    ) -> Result<Self, CampaignError> {
        let FileConfig { smtp, campaign } = file;

        let smtp = SmtpSettings {
            host: pick_string(env, "SMTP_HOST", smtp.host, ""),
            port: pick(env, "SMTP_PORT", smtp.port, DEFAULT_SMTP_PORT)?,
            user: pick_string(env, "SMTP_USER", smtp.user, ""),
            password: pick_string(env, "SMTP_PASSWORD", smtp.password, ""),
            from_email: pick_string(env, "SMTP_FROM_EMAIL", smtp.from_email, ""),
        };

        let template_file = pick_string(
            env,
            "CAMPAIGN_TEMPLATE_FILE",
            campaign.template_file,
            DEFAULT_TEMPLATE_FILE,
        );
        let template_path = if Path::new(&template_file).is_absolute() {
            PathBuf::from(template_file)
        } else {
            data_dir.join(template_file)
        };

        let test_email = pick_string(env, "CAMPAIGN_TEST_EMAIL", campaign.test_email, "");

        let campaign = CampaignSettings {
            daily_limit: pick(
                env,
                "CAMPAIGN_DAILY_LIMIT",
                campaign.daily_limit,
                DEFAULT_DAILY_LIMIT,
            )?,
            min_delay_seconds: pick(
                env,
                "CAMPAIGN_MIN_DELAY",
                campaign.min_delay_seconds,
                DEFAULT_MIN_DELAY_SECONDS,
            )?,
            max_delay_seconds: pick(
                env,
                "CAMPAIGN_MAX_DELAY",
                campaign.max_delay_seconds,
                DEFAULT_MAX_DELAY_SECONDS,
            )?,
            template_path,
            subject: pick_string(env, "CAMPAIGN_SUBJECT", campaign.subject, ""),
            test_email: (!test_email.is_empty()).then_some(test_email),
        };

        let config = CampaignConfig { smtp, campaign };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CampaignError> {
        if self.smtp.host.trim().is_empty() {
            return Err(CampaignError::config("smtp.host is required"));
        }
        if self.smtp.from_email.trim().is_empty() {
            return Err(CampaignError::config("smtp.from_email is required"));
        }
        if self.campaign.min_delay_seconds > self.campaign.max_delay_seconds {
            return Err(CampaignError::config(format!(
                "campaign.min_delay_seconds ({}) is greater than campaign.max_delay_seconds ({})",
                self.campaign.min_delay_seconds, self.campaign.max_delay_seconds
            )));
        }
        Ok(())
    }
}

/// Valor de entorno no vacío, si existe. Una variable vacía no pisa config.json.
fn env_value(env: EnvLookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.trim().is_empty())
}

fn pick_string(env: EnvLookup<'_>, key: &str, file: Option<String>, default: &str) -> String {
    env_value(env, key)
        .or(file)
        .unwrap_or_else(|| default.to_string())
}

fn pick<T: FromStr>(
    env: EnvLookup<'_>,
    key: &str,
    file: Option<T>,
    default: T,
) -> Result<T, CampaignError> {
    match env_value(env, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CampaignError::config(format!("{key}: invalid value {raw:?}"))),
        None => Ok(file.unwrap_or(default)),
    }
}
