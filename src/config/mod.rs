use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub payments: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SmsConfig {
    #[serde(default)]
    pub enabled: bool,
    pub api_key: Option<String>,
    pub sender_id: Option<String>,
    #[serde(default = "default_sms_base_url")]
    pub base_url: String,
}

fn default_sms_base_url() -> String {
    "https://bulksmsbd.net/api/smsapi".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct YouTubeConfig {
    #[serde(default)]
    pub enabled: bool,
    pub api_key: Option<String>,
}

/// Receiver wallet numbers shown on the checkout page. Buyers send money
/// to one of these and paste back the transaction id.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaymentConfig {
    pub bkash_number: Option<String>,
    pub nagad_number: Option<String>,
    pub rocket_number: Option<String>,
    pub moynapay_number: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://pathshala.db")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("sms.enabled", false)?
            .set_default("youtube.enabled", false)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with PATHSHALA__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("PATHSHALA").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Validated once at startup; an enabled integration with missing
    /// credentials aborts boot instead of failing per request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sms.enabled {
            if self.sms.api_key.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::Message(
                    "sms.enabled is set but sms.api_key is missing".to_string(),
                ));
            }
            if self.sms.sender_id.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::Message(
                    "sms.enabled is set but sms.sender_id is missing".to_string(),
                ));
            }
        }
        if self.youtube.enabled && self.youtube.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::Message(
                "youtube.enabled is set but youtube.api_key is missing".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://pathshala.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
            },
            sms: SmsConfig::default(),
            youtube: YouTubeConfig::default(),
            payments: PaymentConfig::default(),
        }
    }
}
