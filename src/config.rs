use std::path::{Path, PathBuf};

use clap::Args;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::session::DEFAULT_SESSION_KEY;

pub const DEFAULT_BASE_URL: &str = "https://api.manahrms.com/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info,hrms_portal=debug";

/// Candidate config files looked up in the working directory.
const LOCAL_CONFIG_FILES: &[&str] = &["hrms.yaml", "hrms.toml", "hrms.json"];

/// Global flags shared by every CLI subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file path
    #[arg(short, long, global = true, env = "HRMS_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Backend base URL (e.g. https://api.manahrms.com/api/v1)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub session_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Defaults, then a config file, then `HRMS_*` variables, then flags.
    pub fn load(args: &ConfigArgs) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("storage.dir", default_storage_dir().to_string_lossy().to_string())?
            .set_default("storage.session_key", DEFAULT_SESSION_KEY)?
            .set_default("logging.filter", DEFAULT_LOG_FILTER)?
            .set_default("logging.json", false)?;

        match &args.config {
            Some(path) => {
                builder = builder.add_source(File::from(path.as_path()).required(true));
            }
            None => {
                if let Some(path) = local_config_file(Path::new(".")) {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        // E.g. HRMS_API__BASE_URL=http://localhost:8000/api/v1
        builder = builder.add_source(
            Environment::with_prefix("HRMS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(base_url) = &args.base_url {
            builder = builder.set_override("api.base_url", base_url.as_str())?;
        }
        if let Some(dir) = &args.storage_dir {
            builder = builder.set_override("storage.dir", dir.to_string_lossy().to_string())?;
        }
        if let Some(timeout) = args.timeout_secs {
            builder = builder.set_override("api.timeout_secs", timeout)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api.base_url cannot be empty".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.storage.session_key.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "storage.session_key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<local data dir>/hrms-portal`, relative to the working directory when the
/// platform has no data dir.
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_default()
        .join("hrms-portal")
}

fn local_config_file(dir: &Path) -> Option<PathBuf> {
    LOCAL_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
