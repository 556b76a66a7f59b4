use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable read when no API key is configured anywhere else.
const LEGACY_API_KEY_VAR: &str = "ZHIPU_API_KEY";

pub const DEFAULT_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "remote", "ollama", or "disabled"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

// Hand-written so the bearer credential never ends up in a log line.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub store: String, // "memory" or "file"
    pub data_dir: String,
    pub schema_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub data: DataConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for data storage
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Dataset store backing ("memory" or "file")
    #[arg(long)]
    pub store: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        // Start with default configuration
        let mut config_builder = Config::builder()
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", defaults.web.port as i64)?
            .set_default("llm.backend", defaults.llm.backend)?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.api_url", DEFAULT_API_URL)?
            .set_default("llm.temperature", defaults.llm.temperature as f64)?
            .set_default("llm.timeout_secs", defaults.llm.timeout_secs as i64)?
            .set_default("data.store", defaults.data.store)?
            .set_default("data.data_dir", defaults.data.data_dir)?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/datainsight/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // DATAINSIGHT__LLM__API_KEY and friends
        config_builder = config_builder.add_source(
            Environment::with_prefix("DATAINSIGHT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(data_dir) = &args.data_dir {
            config.data.data_dir = data_dir.clone();
        }
        if let Some(store) = &args.store {
            config.data.store = store.clone();
        }

        if config.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            config.llm.api_key = std::env::var(LEGACY_API_KEY_VAR)
                .ok()
                .filter(|k| !k.trim().is_empty());
        }

        if config.llm.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.data_dir)
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 3002,
            },
            llm: LlmConfig {
                backend: "remote".to_string(),
                model: "glm-4-flash".to_string(),
                api_key: None,
                api_url: Some(DEFAULT_API_URL.to_string()),
                temperature: 0.7,
                timeout_secs: 30,
            },
            data: DataConfig {
                store: "memory".to_string(),
                data_dir: "data".to_string(),
                schema_file: None,
            },
        }
    }
}
