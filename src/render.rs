//! Outbound chat messages
//!
//! Text uses Telegram-style Markdown; buttons are either callbacks that map
//! back to entry commands or plain links.

use crate::chain::{find_position, ChainError, Resource, Strategy, VaultState};
use crate::payload::PreparedPayload;
use crate::validate::Amount;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    #[serde(flatten)]
    pub target: ButtonTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonTarget {
    Callback(String),
    Url(String),
}

impl Button {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Url(url.into()),
        }
    }
}

pub fn welcome() -> OutboundMessage {
    OutboundMessage::text(
        "🚀 *MoveYield Copilot*\n\n\
         Telegram-first, non-custodial vault controller on Movement Testnet.\n\n\
         Choose an action:",
    )
    .with_button(Button::callback("📊 View strategies", "strategies"))
    .with_button(Button::callback("💰 Deposit", "deposit"))
    .with_button(Button::callback("💸 Withdraw", "withdraw"))
    .with_button(Button::callback("📈 Check position", "position"))
}

pub fn deposit_amount_prompt() -> OutboundMessage {
    OutboundMessage::text(
        "Enter amount of MOVE to deposit (integer, in smallest unit if applicable).",
    )
}

pub fn withdraw_amount_prompt() -> OutboundMessage {
    OutboundMessage::text("Enter amount of shares to withdraw (integer).")
}

pub fn position_address_prompt() -> OutboundMessage {
    OutboundMessage::text(
        "To show your position I need your wallet address. Please reply with your wallet address.",
    )
}

pub fn invalid_amount() -> OutboundMessage {
    OutboundMessage::text(
        "❌ *Invalid amount*\n\nPlease enter a valid positive integer (e.g., 100, 1000).",
    )
}

pub fn invalid_strategy(count: usize) -> OutboundMessage {
    OutboundMessage::text(format!(
        "❌ *Invalid strategy*\n\nPlease reply with a number between 0 and {}.",
        count.saturating_sub(1)
    ))
}

pub fn invalid_address() -> OutboundMessage {
    OutboundMessage::text(
        "❌ *Invalid wallet address*\n\nPlease enter a valid Movement address (e.g., 0x1234...abcd).",
    )
}

pub fn strategies_unavailable() -> OutboundMessage {
    OutboundMessage::text("❌ Could not fetch strategies from chain. Please try later.")
}

pub fn no_strategies() -> OutboundMessage {
    OutboundMessage::text("❌ No strategies found on-chain.")
}

pub fn account_not_found() -> OutboundMessage {
    OutboundMessage::text(
        "❌ *Account not found*\n\nThis address does not exist on Movement Testnet.",
    )
}

pub fn generic_error() -> OutboundMessage {
    OutboundMessage::text("An error occurred while processing your request.")
}

fn strategy_lines(text: &mut String, strategies: &[Strategy]) {
    for s in strategies {
        let risk = s
            .risk_level
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let _ = write!(
            text,
            "\n*{}: {}*\nRisk: {risk}\n{}\n",
            s.index, s.name, s.description
        );
    }
}

/// Deposit step two: numbered list to pick from
pub fn strategy_selection(amount: &Amount, strategies: &[Strategy]) -> OutboundMessage {
    let mut text = format!(
        "💰 *Deposit Amount:* {amount} MOVE\n\n*Available strategies* (reply with the number):\n"
    );
    strategy_lines(&mut text, strategies);
    OutboundMessage::text(text)
}

/// Standalone `/strategies` listing
pub fn strategy_listing(result: &Result<Vec<Strategy>, ChainError>) -> OutboundMessage {
    match result {
        Err(_) => OutboundMessage::text(
            "Could not fetch strategies from chain. Please try again later.",
        ),
        Ok(strategies) if strategies.is_empty() => {
            OutboundMessage::text("No strategies found on-chain.")
        }
        Ok(strategies) => {
            let mut text = "📊 *Strategies:*\n".to_string();
            strategy_lines(&mut text, strategies);
            text.push_str("\n_Note: No APY or projected yield is shown (testnet)._");
            OutboundMessage::text(text)
        }
    }
}

/// Combined vault + position report for an address that exists on-chain
pub fn position_report(
    vault: &Result<VaultState, ChainError>,
    resources: &Result<Vec<Resource>, ChainError>,
) -> OutboundMessage {
    let mut text = "📊 *Vault State*\n".to_string();
    match vault {
        Ok(state) => {
            let _ = write!(
                text,
                "\nTotal Assets: {} MOVE\nTotal Shares: {}\nActive Strategy: {}",
                state.total_assets, state.total_shares, state.active_strategy
            );
        }
        Err(_) => text.push_str("\nCould not fetch vault state."),
    }

    text.push_str("\n\n📈 *Your Position*\n");
    match resources {
        Ok(resources) => match find_position(resources) {
            Some(position) => {
                let _ = write!(text, "\nShares: {}", position.shares);
            }
            None => text.push_str("\nNo position found for this address."),
        },
        Err(_) => text.push_str("\nCould not fetch position."),
    }
    OutboundMessage::text(text)
}

pub fn payload_ready(prepared: &PreparedPayload) -> OutboundMessage {
    OutboundMessage::text(prepared.summary.clone())
        .with_button(Button::url("✍️ Sign with wallet", prepared.sign_link.clone()))
        .with_button(Button::url(
            "🔗 Open Movement Explorer",
            prepared.explorer_link.clone(),
        ))
}
