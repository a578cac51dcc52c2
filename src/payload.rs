//! Unsigned transaction descriptors and the hand-off to an external signer
//!
//! The descriptor built here crosses the boundary to the wallet unmodified.
//! Amounts are passed through exactly as validated; no unit conversion
//! happens at this layer.

use crate::chain::{Strategy, COIN_TYPE};
use crate::validate::{validate_address, validate_amount, Address, Amount, ValidationError};
use reqwest::Url;
use serde::Serialize;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vault action: {0:?}")]
pub struct UnknownActionError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Deposit,
    Withdraw,
}

impl Action {
    pub fn parse(raw: &str) -> Result<Self, UnknownActionError> {
        match raw {
            "deposit" => Ok(Action::Deposit),
            "withdraw" => Ok(Action::Withdraw),
            other => Err(UnknownActionError(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Deposit => "deposit",
            Action::Withdraw => "withdraw",
        }
    }
}

/// Entry function call for the wallet to sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDescriptor {
    function: String,
    type_arguments: Vec<String>,
    arguments: Vec<String>,
}

impl TransactionDescriptor {
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn type_arguments(&self) -> &[String] {
        &self.type_arguments
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// Build the descriptor for `<vault>::vault::<action>(amount)`.
pub fn build(
    action: &str,
    amount: &Amount,
    vault_address: &str,
) -> Result<TransactionDescriptor, UnknownActionError> {
    let action = Action::parse(action)?;
    Ok(TransactionDescriptor {
        function: format!("{vault_address}::vault::{}", action.as_str()),
        type_arguments: vec![COIN_TYPE.to_string()],
        arguments: vec![amount.as_str().to_string()],
    })
}

/// Fee in basis points as a percentage with two decimals (`250` -> `"2.50"`).
pub fn bps_percent(bps: u64) -> String {
    format!("{}.{:02}", bps / 100, bps % 100)
}

/// Link targets for completing a transaction outside the chat
#[derive(Debug, Clone)]
pub struct HandOffLinks {
    sign_url: Url,
    explorer_url: Url,
    network: String,
}

impl HandOffLinks {
    pub fn new(sign_url: Url, explorer_url: Url, network: impl Into<String>) -> Self {
        Self {
            sign_url,
            explorer_url,
            network: network.into(),
        }
    }

    /// Signing page link carrying the three mandatory hand-off parameters.
    pub fn sign_link(&self, action: Action, amount: &Amount, vault_address: &str) -> String {
        let mut url = self.sign_url.clone();
        url.query_pairs_mut()
            .append_pair("action", action.as_str())
            .append_pair("amount", amount.as_str())
            .append_pair("vault", vault_address);
        url.to_string()
    }

    /// Explorer page for running the entry function by hand
    pub fn explorer_link(&self, action: Action, vault_address: &str) -> String {
        let mut url = self.explorer_url.clone();
        let path = format!(
            "{}/account/{vault_address}/modules/run/vault/{}",
            url.path().trim_end_matches('/'),
            action.as_str()
        );
        url.set_path(&path);
        url.query_pairs_mut().append_pair("network", &self.network);
        url.to_string()
    }
}

/// Everything the chat needs to hand a transaction off to the user's wallet
#[derive(Debug, Clone)]
pub struct PreparedPayload {
    pub action: Action,
    pub descriptor: TransactionDescriptor,
    pub summary: String,
    pub sign_link: String,
    pub explorer_link: String,
}

pub struct PayloadBuilder {
    vault_address: Address,
    links: HandOffLinks,
}

impl PayloadBuilder {
    pub fn new(vault_address: Address, links: HandOffLinks) -> Self {
        Self {
            vault_address,
            links,
        }
    }

    pub fn prepare(
        &self,
        action: &str,
        amount: &Amount,
        strategy: Option<&Strategy>,
    ) -> Result<PreparedPayload, UnknownActionError> {
        let vault = self.vault_address.as_str();
        let descriptor = build(action, amount, vault)?;
        let action = Action::parse(action)?;
        Ok(PreparedPayload {
            action,
            summary: render_summary(action, amount, strategy, &descriptor),
            sign_link: self.links.sign_link(action, amount, vault),
            explorer_link: self.links.explorer_link(action, vault),
            descriptor,
        })
    }
}

pub fn render_summary(
    action: Action,
    amount: &Amount,
    strategy: Option<&Strategy>,
    descriptor: &TransactionDescriptor,
) -> String {
    let mut text = String::new();
    match action {
        Action::Deposit => {
            let _ = writeln!(text, "✅ *Deposit Ready*\n");
            let _ = writeln!(text, "💰 *Amount:* {amount} MOVE");
            if let Some(strategy) = strategy {
                let _ = writeln!(text, "📊 *Strategy:* {}", strategy.name);
                let _ = writeln!(
                    text,
                    "💸 *Management Fee:* {}%",
                    bps_percent(strategy.management_fee_bps)
                );
                let _ = writeln!(
                    text,
                    "💸 *Performance Fee:* {}%",
                    bps_percent(strategy.performance_fee_bps)
                );
            }
        }
        Action::Withdraw => {
            let _ = writeln!(text, "💸 *Withdraw Ready*\n");
            let _ = writeln!(text, "💰 *Shares to withdraw:* {amount}");
        }
    }

    let json = serde_json::to_string_pretty(descriptor).unwrap_or_default();
    let _ = write!(
        text,
        "\n📝 *Transaction Payload:*\n```json\n{json}\n```\n\n\
         👉 *To complete:*\n\
         1. Open the signing page below and connect your wallet\n\
         2. Switch to Movement Testnet if prompted\n\
         3. Approve the {} transaction\n\n\
         Or submit it through Movement Explorer.",
        action.as_str()
    );
    text
}

/// Problems with an incoming hand-off link. Every one of them is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandOffError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error(transparent)]
    UnknownAction(#[from] UnknownActionError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parameters of a hand-off link as received by the signing surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandOff {
    pub action: Action,
    pub amount: Amount,
    pub vault: Address,
}

impl HandOff {
    pub fn from_params(
        action: Option<&str>,
        amount: Option<&str>,
        vault: Option<&str>,
    ) -> Result<Self, HandOffError> {
        fn required<'a>(
            value: Option<&'a str>,
            name: &'static str,
        ) -> Result<&'a str, HandOffError> {
            value
                .filter(|v| !v.is_empty())
                .ok_or(HandOffError::MissingParameter(name))
        }

        let action = Action::parse(required(action, "action")?)?;
        let amount = validate_amount(required(amount, "amount")?)?;
        let vault = validate_address(required(vault, "vault")?)?;
        Ok(Self {
            action,
            amount,
            vault,
        })
    }

    pub fn descriptor(&self) -> TransactionDescriptor {
        TransactionDescriptor {
            function: format!("{}::vault::{}", self.vault, self.action.as_str()),
            type_arguments: vec![COIN_TYPE.to_string()],
            arguments: vec![self.amount.as_str().to_string()],
        }
    }
}
