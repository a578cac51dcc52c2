//! Process configuration read from environment variables

use crate::validate::{validate_address, Address, ValidationError};
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CHAIN_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;
pub const DEFAULT_CHAT_IDLE_SECS: u64 = 300;
pub const DEFAULT_SIGN_URL: &str = "http://localhost:3000/sign";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.movementnetwork.xyz";
pub const DEFAULT_NETWORK: &str = "testnet";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a valid URL: {message}")]
    InvalidUrl { name: &'static str, message: String },
    #[error("VAULT_ADDRESS is invalid: {0}")]
    InvalidVault(#[from] ValidationError),
}

#[derive(Debug, Clone)]
pub struct CopilotConfig {
    pub rpc_url: String,
    pub vault_address: Address,
    pub chain_timeout: Duration,
    /// `None` keeps sessions until their flow ends
    pub session_ttl: Option<Duration>,
    /// How long a chat's runtime task lingers without events
    pub chat_idle: Duration,
    pub sign_url: Url,
    pub explorer_url: Url,
    pub network: String,
    pub port: u16,
}

impl CopilotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let rpc_url = get("MOVEMENT_RPC_URL").ok_or(ConfigError::Missing("MOVEMENT_RPC_URL"))?;
        let vault = get("VAULT_ADDRESS").ok_or(ConfigError::Missing("VAULT_ADDRESS"))?;
        let vault_address = validate_address(vault.trim())?;

        let timeout_secs = number(
            "CHAIN_TIMEOUT_SECS",
            get("CHAIN_TIMEOUT_SECS"),
            DEFAULT_CHAIN_TIMEOUT_SECS,
        )?;
        let ttl_secs = number(
            "SESSION_TTL_SECS",
            get("SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;
        let idle_secs = number("CHAT_IDLE_SECS", get("CHAT_IDLE_SECS"), DEFAULT_CHAT_IDLE_SECS)?;
        let port = number("COPILOT_PORT", get("COPILOT_PORT"), DEFAULT_PORT)?;

        Ok(Self {
            rpc_url: rpc_url.trim().trim_end_matches('/').to_string(),
            vault_address,
            chain_timeout: Duration::from_secs(timeout_secs),
            session_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            chat_idle: Duration::from_secs(idle_secs.max(1)),
            sign_url: url("SIGN_URL", get("SIGN_URL"), DEFAULT_SIGN_URL)?,
            explorer_url: url("EXPLORER_URL", get("EXPLORER_URL"), DEFAULT_EXPLORER_URL)?,
            network: get("MOVEMENT_NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
            port,
        })
    }
}

fn number<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

fn url(name: &'static str, raw: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_string());
    Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        name,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CopilotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CopilotConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("MOVEMENT_RPC_URL", "https://testnet.movementnetwork.xyz/v1/"),
        ("VAULT_ADDRESS", "0xabc"),
    ];

    #[test]
    fn defaults_apply() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.rpc_url, "https://testnet.movementnetwork.xyz/v1");
        assert_eq!(config.vault_address.as_str(), "0xabc");
        assert_eq!(config.chain_timeout, Duration::from_secs(15));
        assert_eq!(config.session_ttl, Some(Duration::from_secs(900)));
        assert_eq!(config.chat_idle, Duration::from_secs(300));
        assert_eq!(config.sign_url.as_str(), "http://localhost:3000/sign");
        assert_eq!(config.explorer_url.host_str(), Some("explorer.movementnetwork.xyz"));
        assert_eq!(config.network, "testnet");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn overrides_apply() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("CHAIN_TIMEOUT_SECS", "3"),
            ("SESSION_TTL_SECS", "0"),
            ("CHAT_IDLE_SECS", "0"),
            ("SIGN_URL", "https://app.example/sign"),
            ("MOVEMENT_NETWORK", "mainnet"),
            ("COPILOT_PORT", "9090"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.chain_timeout, Duration::from_secs(3));
        assert_eq!(config.session_ttl, None);
        assert_eq!(config.chat_idle, Duration::from_secs(1));
        assert_eq!(config.sign_url.host_str(), Some("app.example"));
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn required_values_are_enforced() {
        assert!(matches!(
            load(&[("VAULT_ADDRESS", "0xabc")]),
            Err(ConfigError::Missing("MOVEMENT_RPC_URL"))
        ));
        assert!(matches!(
            load(&[("MOVEMENT_RPC_URL", "http://node"), ("VAULT_ADDRESS", "  ")]),
            Err(ConfigError::Missing("VAULT_ADDRESS"))
        ));
        assert!(matches!(
            load(&[("MOVEMENT_RPC_URL", "http://node"), ("VAULT_ADDRESS", "abc")]),
            Err(ConfigError::InvalidVault(_))
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("COPILOT_PORT", "eighty"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidNumber { name: "COPILOT_PORT", .. })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("SIGN_URL", "not a url"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::InvalidUrl { name: "SIGN_URL", .. })
        ));
    }
}
