//! TOML file configuration.
//!
//! These structs directly map to the `cpgw-config.toml` file format and are
//! converted into the core [`GatewayConfig`] after validation.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cpgw_core::config::{GatewayConfig, GatewayCredentials};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub gateway: GatewaySection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Gateway configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySection {
    /// CoinPayments client id.
    pub client_id: String,
    /// CoinPayments client secret; required when `webhooks` is on.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Whether to use the signed merchant API and webhook notifications.
    #[serde(default)]
    pub webhooks: bool,
    /// Public base URL of this installation, e.g.
    /// `https://billing.example.com`.
    pub callback_url: String,
    /// Company identifier used in the notification URL path.
    pub company_id: String,
    /// Store name shown in invoice notes.
    pub store_name: String,
}

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("callback_url is not a valid URL: {0}")]
    CallbackUrl(#[from] url::ParseError),
    #[error("invalid gateway settings: {0}")]
    Gateway(#[from] cpgw_core::error::GatewayError),
}

impl FileConfig {
    /// Load and parse the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Validate the gateway section and convert it into the core config.
    ///
    /// The callback URL must parse and is normalized to have no trailing
    /// slash, since it participates byte-for-byte in the host fingerprint
    /// and the signed notification URL.
    pub fn into_gateway_config(self) -> Result<GatewayConfig, ConfigError> {
        url::Url::parse(&self.gateway.callback_url)?;
        let callback_url = self
            .gateway
            .callback_url
            .trim_end_matches('/')
            .to_owned();

        let credentials = GatewayCredentials {
            client_id: self.gateway.client_id,
            client_secret: self.gateway.client_secret,
            webhooks_enabled: self.gateway.webhooks,
        };
        credentials.validate()?;

        Ok(GatewayConfig {
            credentials,
            callback_url,
            company_id: self.gateway.company_id,
            store_name: self.gateway.store_name,
            integration: format!("cpgw_v{}", env!("CARGO_PKG_VERSION")),
        })
    }
}
