//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `driphub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use driphub_adapter_email_reqwest::EmailConfig;
use driphub_adapter_mqtt::MqttConfig;
use driphub_adapter_storage_sqlite_sqlx::Config as DatabaseConfig;
use driphub_app::action_executor::RetryPolicy;
use driphub_app::action_scheduler::SchedulerConfig;
use driphub_domain::id::MerchantId;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Sweep loop and retry settings.
    pub scheduler: SchedulerSection,
    /// MQTT consumer settings.
    pub mqtt: MqttSection,
    /// Email provider settings. Left unconfigured, notifications go to
    /// the virtual gateway instead.
    pub email: EmailConfig,
    /// Demo conveniences.
    pub demo: DemoConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Sweep loop and retry policy settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Seconds between sweeps of the action store.
    pub sweep_interval_secs: u16,
    /// Maximum number of actions claimed per batch.
    pub batch_size: u32,
    /// Seconds before a held claim is presumed crashed and reclaimed.
    pub claim_timeout_secs: u16,
    /// Total attempts per action, the first one included.
    pub max_attempts: u32,
    /// Seconds before the first retry; doubles per attempt after that.
    pub retry_base_secs: u16,
}

impl SchedulerSection {
    /// The sweep-loop part of this section.
    #[must_use]
    pub fn sweep_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            sweep_interval_secs: self.sweep_interval_secs,
            batch_size: self.batch_size,
            claim_timeout_secs: self.claim_timeout_secs,
        }
    }

    /// The retry part of this section. The backoff cap stays at the
    /// executor default.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_base: chrono::Duration::seconds(i64::from(self.retry_base_secs)),
            ..RetryPolicy::default()
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 5,
            batch_size: 100,
            claim_timeout_secs: 120,
            max_attempts: 5,
            retry_base_secs: 30,
        }
    }
}

/// MQTT consumer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttSection {
    /// Whether to run the MQTT consumer at all.
    pub enabled: bool,
    /// Broker connection settings.
    #[serde(flatten)]
    pub connection: MqttConfig,
}

impl Default for MqttSection {
    fn default() -> Self {
        Self {
            enabled: false,
            connection: MqttConfig::default(),
        }
    }
}

/// Demo conveniences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Seed the preset automations at startup.
    pub seed: bool,
    /// Merchant the presets are seeded under.
    pub merchant_id: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: false,
            merchant_id: "00000000-0000-0000-0000-000000000001".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `driphub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("driphub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DRIPHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("DRIPHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("DRIPHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("DRIPHUB_DATABASE_URL") {
            self.database.database_url = val;
        }
        if let Ok(val) = std::env::var("DRIPHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("DRIPHUB_MQTT_ENABLED") {
            if let Ok(enabled) = val.parse() {
                self.mqtt.enabled = enabled;
            }
        }
        if let Ok(val) = std::env::var("DRIPHUB_EMAIL_API_KEY") {
            self.email.api_key = val;
        }
        if let Ok(val) = std::env::var("DRIPHUB_DEMO_SEED") {
            if let Ok(seed) = val.parse() {
                self.demo.seed = seed;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.batch_size == 0 {
            return Err(ConfigError::Validation(
                "scheduler.batch_size must be non-zero".to_string(),
            ));
        }
        if self.scheduler.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "scheduler.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.demo.seed {
            self.demo_merchant()?;
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The merchant the demo presets are seeded under.
    ///
    /// # Errors
    ///
    /// Returns an error when `demo.merchant_id` is not a UUID.
    pub fn demo_merchant(&self) -> Result<MerchantId, ConfigError> {
        self.demo.merchant_id.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "demo.merchant_id is not a valid UUID: {}",
                self.demo.merchant_id
            ))
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "driphubd=info,driphub=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
