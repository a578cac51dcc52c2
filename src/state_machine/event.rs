//! Events that can occur in a chat

use crate::chain::{ChainError, Resource, Strategy, VaultState};

/// Commands and buttons that start (or restart) a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCommand {
    Start,
    Deposit,
    Withdraw,
    Strategies,
    Position,
}

impl EntryCommand {
    /// Parse a slash command. A `@botname` suffix is ignored.
    pub fn from_command(text: &str) -> Option<Self> {
        let command = text.strip_prefix('/')?;
        let command = command.split('@').next().unwrap_or(command);
        match command {
            "start" => Some(Self::Start),
            "deposit" => Some(Self::Deposit),
            "withdraw" => Some(Self::Withdraw),
            "strategies" => Some(Self::Strategies),
            "position" => Some(Self::Position),
            _ => None,
        }
    }

    /// Parse the callback data of a menu button
    pub fn from_button(data: &str) -> Option<Self> {
        match data {
            "strategies" => Some(Self::Strategies),
            "deposit" => Some(Self::Deposit),
            "withdraw" => Some(Self::Withdraw),
            "position" => Some(Self::Position),
            _ => None,
        }
    }
}

/// Why a strategy list was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategiesPurpose {
    /// Single-shot `/strategies` listing; does not touch the session
    Listing,
    /// Second step of the deposit flow
    DepositSelection,
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Command(EntryCommand),
    Text(String),

    // Chain query results
    StrategiesFetched {
        purpose: StrategiesPurpose,
        result: Result<Vec<Strategy>, ChainError>,
    },
    PositionFetched {
        vault: Result<VaultState, ChainError>,
        resources: Result<Vec<Resource>, ChainError>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Command(_) => "command",
            Event::Text(_) => "text",
            Event::StrategiesFetched { .. } => "strategies_fetched",
            Event::PositionFetched { .. } => "position_fetched",
        }
    }
}
