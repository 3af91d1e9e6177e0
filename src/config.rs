use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Prefix for environment overrides, e.g. `HOSPITAL__SERVER__PORT=8000`.
const ENV_PREFIX: &str = "HOSPITAL";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the REST backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Where the session token store is persisted
    #[arg(long, env = "SESSION_STORE")]
    pub session_store: Option<PathBuf>,

    /// Enable the NFC scan action
    #[arg(long, env = "NFC_ENABLED")]
    pub nfc_enabled: Option<bool>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub shell: ShellConfig,
    pub nfc: NfcConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// JSON file holding the persisted token store.
    pub store_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShellConfig {
    /// The upgrade action shows when this many days or fewer remain.
    pub upgrade_threshold_days: i64,
    /// Countdown shown when no subscription end date is available.
    pub placeholder_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NfcConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("backend.base_url", "http://127.0.0.1:8000")?
            .set_default("backend.timeout_secs", 15)?
            .set_default("session.store_path", "session.json")?
            .set_default("shell.upgrade_threshold_days", 5)?
            .set_default("shell.placeholder_days", 30)?
            .set_default("nfc.enabled", false)?
            .set_default("log.json", false)?;

        // An explicit file must exist; the cwd fallback is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // Priority: CLI flag > CLI env var > HOSPITAL__ env > config file > defaults.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(path) = cli.session_store {
            builder = builder.set_override("session.store_path", path.display().to_string())?;
        }
        if let Some(enabled) = cli.nfc_enabled {
            builder = builder.set_override("nfc.enabled", enabled)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("log.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
