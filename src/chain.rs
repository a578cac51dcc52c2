//! Read-only access to the vault contract
//!
//! Only view functions and account resources are queried; nothing here
//! signs or submits transactions.

mod error;
mod http;
mod types;

pub use error::{ChainError, ChainErrorKind};
pub use http::HttpChainGateway;
pub use types::*;

use crate::validate::Address;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Coin type every vault call is instantiated with
pub const COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";

pub fn strategies_function(vault_address: &str) -> String {
    format!("{vault_address}::vault::get_strategies")
}

pub fn vault_state_function(vault_address: &str) -> String {
    format!("{vault_address}::vault::get_vault_state")
}

/// Common interface for chain queries
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Address of the vault module this gateway queries
    fn vault_address(&self) -> &str;

    /// Call a view function. Returns the raw positional results.
    async fn view(
        &self,
        function: &str,
        arguments: Vec<String>,
        type_arguments: Vec<String>,
    ) -> Result<Vec<Value>, ChainError>;

    /// List of account resources. An absent account is `ChainErrorKind::NotFound`.
    async fn get_account_resources(&self, address: &Address) -> Result<Vec<Resource>, ChainError>;

    async fn get_strategies(&self) -> Result<Vec<Strategy>, ChainError> {
        let vault = self.vault_address().to_string();
        let values = self
            .view(
                &strategies_function(&vault),
                vec![vault],
                vec![COIN_TYPE.to_string()],
            )
            .await?;
        parse_strategies(values).into_result()
    }

    async fn get_vault_state(&self) -> Result<VaultState, ChainError> {
        let values = self
            .view(
                &vault_state_function(self.vault_address()),
                vec![],
                vec![COIN_TYPE.to_string()],
            )
            .await?;
        parse_vault_state(values).into_result()
    }
}

#[async_trait]
impl<T: ChainGateway + ?Sized> ChainGateway for Arc<T> {
    fn vault_address(&self) -> &str {
        (**self).vault_address()
    }

    async fn view(
        &self,
        function: &str,
        arguments: Vec<String>,
        type_arguments: Vec<String>,
    ) -> Result<Vec<Value>, ChainError> {
        (**self).view(function, arguments, type_arguments).await
    }

    async fn get_account_resources(&self, address: &Address) -> Result<Vec<Resource>, ChainError> {
        (**self).get_account_resources(address).await
    }

    async fn get_strategies(&self) -> Result<Vec<Strategy>, ChainError> {
        (**self).get_strategies().await
    }

    async fn get_vault_state(&self) -> Result<VaultState, ChainError> {
        (**self).get_vault_state().await
    }
}

/// Logging wrapper for chain gateways
pub struct LoggingGateway {
    inner: Arc<dyn ChainGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn ChainGateway>) -> Self {
        Self { inner }
    }

    fn record<T>(query: &str, started: std::time::Instant, result: &Result<T, ChainError>) {
        let duration = started.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    query,
                    duration_ms = %duration.as_millis(),
                    "Chain query completed"
                );
            }
            Err(e) if e.kind.is_not_found() => {
                tracing::info!(
                    query,
                    duration_ms = %duration.as_millis(),
                    "Chain query: account not found"
                );
            }
            Err(e) => {
                tracing::error!(
                    query,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Chain query failed"
                );
            }
        }
    }
}

#[async_trait]
impl ChainGateway for LoggingGateway {
    fn vault_address(&self) -> &str {
        self.inner.vault_address()
    }

    async fn view(
        &self,
        function: &str,
        arguments: Vec<String>,
        type_arguments: Vec<String>,
    ) -> Result<Vec<Value>, ChainError> {
        let started = std::time::Instant::now();
        let result = self.inner.view(function, arguments, type_arguments).await;
        Self::record(function, started, &result);
        result
    }

    async fn get_account_resources(&self, address: &Address) -> Result<Vec<Resource>, ChainError> {
        let started = std::time::Instant::now();
        let result = self.inner.get_account_resources(address).await;
        Self::record("account_resources", started, &result);
        result
    }

    async fn get_strategies(&self) -> Result<Vec<Strategy>, ChainError> {
        let started = std::time::Instant::now();
        let result = self.inner.get_strategies().await;
        if let Ok(strategies) = &result {
            tracing::debug!(count = strategies.len(), "Fetched strategies");
        }
        Self::record("get_strategies", started, &result);
        result
    }

    async fn get_vault_state(&self) -> Result<VaultState, ChainError> {
        let started = std::time::Instant::now();
        let result = self.inner.get_vault_state().await;
        Self::record("get_vault_state", started, &result);
        result
    }
}
