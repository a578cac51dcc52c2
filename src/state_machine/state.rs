//! Flow state types
//!
//! Each variant carries exactly the fields its flow has collected so far, so
//! data from one flow cannot leak into another.

use crate::chain::Strategy;
use crate::validate::{Address, Amount};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    /// No flow in progress (equivalent to having no session)
    #[default]
    Idle,

    /// Deposit started, waiting for the amount
    AwaitingDepositAmount,

    /// Amount accepted, strategy list being fetched
    FetchingStrategies { amount: Amount },

    /// Strategy list shown, waiting for a zero-based index.
    /// The list is captured here so it cannot change between prompts.
    AwaitingDepositStrategy {
        amount: Amount,
        strategies: Vec<Strategy>,
    },

    /// Withdraw started, waiting for the share amount
    AwaitingWithdrawAmount,

    /// Position check started, waiting for a wallet address
    AwaitingPositionAddress,

    /// Address accepted, vault state and account resources being fetched
    FetchingPosition { address: Address },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingDepositAmount => "awaiting_deposit_amount",
            FlowState::FetchingStrategies { .. } => "fetching_strategies",
            FlowState::AwaitingDepositStrategy { .. } => "awaiting_deposit_strategy",
            FlowState::AwaitingWithdrawAmount => "awaiting_withdraw_amount",
            FlowState::AwaitingPositionAddress => "awaiting_position_address",
            FlowState::FetchingPosition { .. } => "fetching_position",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FlowState::Idle)
    }
}
