//! Effects produced by state transitions

use super::event::StrategiesPurpose;
use crate::chain::Strategy;
use crate::payload::Action;
use crate::render::OutboundMessage;
use crate::validate::{Address, Amount};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the chat
    Reply(OutboundMessage),

    /// Store the new state as the chat's session
    PersistSession,

    /// Mark the session as active without changing what it holds
    TouchSession,

    /// Drop the chat's session (back to `Idle`)
    ClearSession,

    /// Query the vault's strategy list
    FetchStrategies { purpose: StrategiesPurpose },

    /// Query vault state and the address's resources
    FetchPosition { address: Address },

    /// Build the transaction descriptor and send the hand-off message
    EmitPayload {
        action: Action,
        amount: Amount,
        strategy: Option<Strategy>,
    },
}

impl Effect {
    pub fn reply(message: OutboundMessage) -> Self {
        Effect::Reply(message)
    }
}
