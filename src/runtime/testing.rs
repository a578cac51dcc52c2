//! Mock implementations for testing
//!
//! These mocks enable flow testing without a chain node.

use crate::chain::{ChainError, ChainGateway, Resource, Strategy, VaultState};
use crate::validate::Address;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Chain Gateway
// ============================================================================

/// Mock chain gateway that returns queued responses
pub struct MockChainGateway {
    vault_address: String,
    strategies: Mutex<VecDeque<Result<Vec<Strategy>, ChainError>>>,
    vault_states: Mutex<VecDeque<Result<VaultState, ChainError>>>,
    /// Resources per address; unknown addresses are `NotFound`
    accounts: Mutex<HashMap<String, Result<Vec<Resource>, ChainError>>>,
    /// When set, strategy queries wait here before answering
    strategies_gate: Mutex<Option<Arc<Notify>>>,
    /// Record of all queries made
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockChainGateway {
    pub fn new(vault_address: impl Into<String>) -> Self {
        Self {
            vault_address: vault_address.into(),
            strategies: Mutex::new(VecDeque::new()),
            vault_states: Mutex::new(VecDeque::new()),
            accounts: Mutex::new(HashMap::new()),
            strategies_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_strategies(&self, result: Result<Vec<Strategy>, ChainError>) {
        self.strategies.lock().unwrap().push_back(result);
    }

    pub fn queue_vault_state(&self, result: Result<VaultState, ChainError>) {
        self.vault_states.lock().unwrap().push_back(result);
    }

    pub fn set_account(&self, address: &str, result: Result<Vec<Resource>, ChainError>) {
        self.accounts
            .lock()
            .unwrap()
            .insert(address.to_string(), result);
    }

    /// Hold strategy queries until the returned `Notify` is signalled
    pub fn hold_strategies(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.strategies_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ChainGateway for MockChainGateway {
    fn vault_address(&self) -> &str {
        &self.vault_address
    }

    async fn view(
        &self,
        function: &str,
        _arguments: Vec<String>,
        _type_arguments: Vec<String>,
    ) -> Result<Vec<Value>, ChainError> {
        self.record(format!("view {function}"));
        Err(ChainError::network("Raw view calls are not mocked"))
    }

    async fn get_account_resources(&self, address: &Address) -> Result<Vec<Resource>, ChainError> {
        self.record(format!("get_account_resources {address}"));
        self.accounts
            .lock()
            .unwrap()
            .get(address.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ChainError::not_found(format!("Account {address} not found"))))
    }

    async fn get_strategies(&self) -> Result<Vec<Strategy>, ChainError> {
        self.record("get_strategies");
        let gate = self.strategies_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.strategies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChainError::network("No mock response queued")))
    }

    async fn get_vault_state(&self) -> Result<VaultState, ChainError> {
        self.record("get_vault_state");
        self.vault_states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChainError::network("No mock response queued")))
    }
}
