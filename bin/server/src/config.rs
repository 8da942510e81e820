//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. Nested keys use
//! a double underscore, so `BOT__APP_ID` sets `bot.app_id`.

use proactive_bot_dispatch::DEFAULT_PROACTIVE_MESSAGE;
use proactive_bot_integration::{AppCredentials, DEFAULT_OAUTH_ENDPOINT, DEFAULT_OAUTH_SCOPE};
use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL, advertised in the welcome message.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Bot registration and messaging configuration.
    #[serde(default)]
    pub bot: BotConfig,
}

/// Bot registration and messaging configuration.
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    /// Application id. Empty means the bot runs anonymously.
    #[serde(default)]
    pub app_id: String,

    /// Application secret.
    #[serde(default)]
    pub app_password: String,

    #[serde(default = "default_oauth_endpoint")]
    pub oauth_endpoint: String,

    #[serde(default = "default_oauth_scope")]
    pub oauth_scope: String,

    /// Text sent to every conversation on `/api/notify`.
    #[serde(default = "default_proactive_message")]
    pub proactive_message: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("app_id", &self.app_id)
            .field("oauth_endpoint", &self.oauth_endpoint)
            .field("oauth_scope", &self.oauth_scope)
            .field("proactive_message", &self.proactive_message)
            .finish_non_exhaustive()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3978
}

fn default_public_url() -> String {
    "http://localhost:3978".to_string()
}

fn default_oauth_endpoint() -> String {
    DEFAULT_OAUTH_ENDPOINT.to_string()
}

fn default_oauth_scope() -> String {
    DEFAULT_OAUTH_SCOPE.to_string()
}

fn default_proactive_message() -> String {
    DEFAULT_PROACTIVE_MESSAGE.to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_password: String::new(),
            oauth_endpoint: default_oauth_endpoint(),
            oauth_scope: default_oauth_scope(),
            proactive_message: default_proactive_message(),
        }
    }
}

impl BotConfig {
    /// Builds the credentials used for outbound channel calls.
    #[must_use]
    pub fn credentials(&self) -> AppCredentials {
        AppCredentials::new(&self.app_id, &self.app_password)
            .with_oauth_endpoint(&self.oauth_endpoint)
            .with_oauth_scope(&self.oauth_scope)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::default())
    }

    fn from_source(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the notify URL advertised to new members.
    #[must_use]
    pub fn notify_url(&self) -> String {
        format!("{}/api/notify", self.public_url.trim_end_matches('/'))
    }
}
