use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "mercado.toml",
    "config/mercado.toml",
    "crates/config/mercado.toml",
    "../mercado.toml",
    "../config/mercado.toml",
    "../crates/config/mercado.toml",
    "backend/mercado.toml",
    "backend/config/mercado.toml",
    "backend/crates/config/mercado.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://mercado.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Settings for the realtime broadcast channel.
///
/// ```
/// use mercado_config::RealtimeConfig;
///
/// let realtime = RealtimeConfig::default();
/// assert_eq!(realtime.outbound_buffer, 100);
/// assert!(!realtime.replay_history_on_connect);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Events queued per connection before further events are dropped for it.
    #[serde(default = "RealtimeConfig::default_outbound_buffer")]
    pub outbound_buffer: usize,
    /// Send the stored chat history to every new connection.
    #[serde(default)]
    pub replay_history_on_connect: bool,
}

impl RealtimeConfig {
    const fn default_outbound_buffer() -> usize {
        100
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: Self::default_outbound_buffer(),
            replay_history_on_connect: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Static site root; uploaded images and documents land underneath it.
    #[serde(default = "UploadConfig::default_public_dir")]
    pub public_dir: String,
    /// Served verbatim under `/uploads`.
    #[serde(default = "UploadConfig::default_uploads_dir")]
    pub uploads_dir: String,
}

impl UploadConfig {
    fn default_public_dir() -> String {
        "public".to_string()
    }

    fn default_uploads_dir() -> String {
        "uploads".to_string()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            public_dir: Self::default_public_dir(),
            uploads_dir: Self::default_uploads_dir(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use mercado_config::load;
///
/// std::env::remove_var("MERCADO_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let outbound_buffer =
        i64::try_from(defaults.realtime.outbound_buffer).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("realtime.outbound_buffer", outbound_buffer)?
        .set_default(
            "realtime.replay_history_on_connect",
            defaults.realtime.replay_history_on_connect,
        )?
        .set_default("uploads.public_dir", defaults.uploads.public_dir.clone())?
        .set_default("uploads.uploads_dir", defaults.uploads.uploads_dir.clone())?;

    let environment_overrides = config::Environment::with_prefix("MERCADO").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("MERCADO_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via MERCADO_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    // A zero-capacity queue cannot be created.
    if config.realtime.outbound_buffer == 0 {
        config.realtime.outbound_buffer = 1;
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
