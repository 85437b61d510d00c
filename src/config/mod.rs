use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub integrations: IntegrationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    #[serde(default)]
    pub secure_cookies: bool,
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

/// Default administrator created on startup when no admin exists yet.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    pub seed_default_admin: bool,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            seed_default_admin: false,
            admin_email: "admin@residence.local".to_string(),
            admin_password: "Admin@12345".to_string(),
            admin_name: "System Administrator".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IntegrationConfig {
    pub webhook: Option<WebhookConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

fn default_webhook_timeout() -> u64 {
    5
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("server.secure_cookies", false)?
            .set_default("database.url", "sqlite://residence.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("bootstrap.seed_default_admin", cfg!(debug_assertions))?
            .set_default("bootstrap.admin_email", "admin@residence.local")?
            .set_default("bootstrap.admin_password", "Admin@12345")?
            .set_default("bootstrap.admin_name", "System Administrator")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Environment variables, e.g. RESIDENCE__SERVER__PORT=9000
            .add_source(Environment::with_prefix("RESIDENCE").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
                secure_cookies: false,
            },
            database: DatabaseConfig {
                url: "sqlite://residence.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
            },
            bootstrap: BootstrapConfig {
                seed_default_admin: cfg!(debug_assertions),
                ..BootstrapConfig::default()
            },
            integrations: IntegrationConfig { webhook: None },
        }
    }
}
