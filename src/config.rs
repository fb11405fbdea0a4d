use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<MongoDbConfig>,
    pub cors: CorsConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MongoDbConfig {
    pub uri: String,
    pub database: String,
    pub connection_timeout_ms: u64,
    pub max_pool_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub supports_credentials: bool,
}

/// Helios network the dApp talks to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpcs: Vec<String>,
    pub erc20_factory_address: String,
    pub governance_address: String,
    #[serde(default)]
    pub block_explorer: Option<String>,
    /// Hex-encoded key of the deployer account. Without it no wallet is connected.
    #[serde(default)]
    pub private_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeploymentConfig {
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub thread_id: Option<u64>,
    pub error_thread_id: Option<u64>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 120,
            poll_interval_ms: 2000,
            max_poll_attempts: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8081,
                log_level: "info".to_string(),
                api_key: None,
            },
            database: None,
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
                allowed_methods: vec!["GET".to_string(), "POST".to_string()],
                allowed_headers: vec![
                    "Authorization".to_string(),
                    "X-API-Key".to_string(),
                    "Accept".to_string(),
                    "Content-Type".to_string(),
                ],
                supports_credentials: true,
            },
            network: NetworkConfig {
                name: "Helios Testnet".to_string(),
                chain_id: 42000,
                rpcs: vec!["https://testnet1.helioschainlabs.org".to_string()],
                erc20_factory_address: "0x0000000000000000000000000000000000000806".to_string(),
                governance_address: "0x0000000000000000000000000000000000000805".to_string(),
                block_explorer: Some("https://explorer.helioschainlabs.org".to_string()),
                private_key: None,
            },
            deployment: DeploymentConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl MongoDbConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(anyhow!("MongoDB URI not configured"));
        }

        if self.database.is_empty() {
            return Err(anyhow!("MongoDB database name not configured"));
        }

        Ok(())
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rpcs.is_empty() {
            return Err(anyhow!("No RPC URL configured for {}", self.name));
        }
        self.erc20_factory_address
            .parse::<alloy::primitives::Address>()
            .context("Invalid erc20_factory_address")?;
        self.governance_address
            .parse::<alloy::primitives::Address>()
            .context("Invalid governance_address")?;
        Ok(())
    }
}

impl DeploymentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.confirmation_timeout_secs == 0 {
            return Err(anyhow!("confirmation_timeout_secs must be greater than zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than zero"));
        }
        if self.max_poll_attempts == 0 {
            return Err(anyhow!("max_poll_attempts must be greater than zero"));
        }
        if !(60..=180).contains(&self.confirmation_timeout_secs) {
            warn!(
                "Confirmation timeout of {}s is outside the usual 60-180s window",
                self.confirmation_timeout_secs
            );
        }
        Ok(())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading config from {}", path.as_ref().display());
        let config = match Self::load_from_file(&path) {
            Ok(config) => {
                info!("Config loaded from file");
                config
            }
            Err(e) => {
                error!("Failed to load config from file: {}", e);
                info!("Falling back to environment variables or defaults");
                Self::from_env()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.network.validate()?;
        self.deployment.validate()?;
        Ok(())
    }

    pub fn from_env() -> Self {
        let mut config = Config::default();

        // Override with environment variables if present
        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("SERVER_PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.server.port = port_num;
            }
        }

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            config.server.log_level = log_level;
        }

        if let Ok(api_key) = std::env::var("API_KEY") {
            config.server.api_key = Some(api_key);
        }

        if let Ok(uri) = std::env::var("MONGODB_URI") {
            let database = std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "helios_dapp".to_string());
            config.database = Some(MongoDbConfig {
                uri,
                database,
                connection_timeout_ms: 5000,
                max_pool_size: Some(10),
            });
        }

        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.cors.allowed_origins =
                origins.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Helios network
        if let Ok(rpcs) = std::env::var("HELIOS_RPC_URLS") {
            config.network.rpcs = rpcs
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(chain_id) = std::env::var("HELIOS_CHAIN_ID") {
            if let Ok(chain_id) = chain_id.parse::<u64>() {
                config.network.chain_id = chain_id;
            }
        }

        if let Ok(private_key) = std::env::var("HELIOS_PRIVATE_KEY") {
            config.network.private_key = Some(private_key);
        }

        if let Ok(timeout) = std::env::var("DEPLOYMENT_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                config.deployment.confirmation_timeout_secs = timeout;
            }
        }

        // Telegram configuration
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            config.telegram.token = Some(token);
        }

        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            config.telegram.chat_id = Some(chat_id);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8081);
        assert!(config.database.is_none());
        assert_eq!(config.network.chain_id, 42000);
        assert_eq!(config.deployment.poll_interval_ms, 2000);
        assert_eq!(config.deployment.max_poll_attempts, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("SERVER_PORT", "9090");
        std::env::set_var("MONGODB_URI", "mongodb://test:27017");
        std::env::set_var("HELIOS_RPC_URLS", "http://a:8545, http://b:8545");

        let config = Config::from_env();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.unwrap().uri, "mongodb://test:27017");
        assert_eq!(config.network.rpcs, vec!["http://a:8545", "http://b:8545"]);

        // Clean up
        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("MONGODB_URI");
        std::env::remove_var("HELIOS_RPC_URLS");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();
        assert!(toml_string.contains("127.0.0.1"));
        assert!(toml_string.contains("8081"));
        assert!(toml_string.contains("0x0000000000000000000000000000000000000806"));

        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.network.chain_id, config.network.chain_id);
    }

    #[test]
    fn test_network_config_rejects_bad_address() {
        let mut config = Config::default();
        config.network.governance_address = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.rpcs.clear();
        assert!(config.validate().is_err());
    }
}
