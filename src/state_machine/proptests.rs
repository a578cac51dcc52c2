//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::{EntryCommand, StrategiesPurpose};
use super::*;
use crate::chain::{ChainError, RiskLevel, Strategy};
use crate::validate::{validate_address, validate_amount};
use proptest::prelude::*;
use proptest::strategy::Strategy as _;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_strategy(index: usize) -> impl proptest::strategy::Strategy<Value = Strategy> {
    ("[A-Za-z ]{1,12}", 0u64..5, 0u64..3000, 0u64..3000).prop_map(
        move |(name, risk, mgmt, perf)| Strategy {
            index,
            name,
            risk_level: Some(RiskLevel::from_code(&risk.to_string())),
            description: String::new(),
            management_fee_bps: mgmt,
            performance_fee_bps: perf,
        },
    )
}

fn arb_strategies() -> impl proptest::strategy::Strategy<Value = Vec<Strategy>> {
    (1usize..6).prop_flat_map(|n| (0..n).map(arb_strategy).collect::<Vec<_>>())
}

fn arb_awaiting_state() -> impl proptest::strategy::Strategy<Value = FlowState> {
    prop_oneof![
        Just(FlowState::AwaitingDepositAmount),
        Just(FlowState::AwaitingWithdrawAmount),
        Just(FlowState::AwaitingPositionAddress),
        ("[1-9][0-9]{0,6}", arb_strategies()).prop_map(|(amount, strategies)| {
            FlowState::AwaitingDepositStrategy {
                amount: validate_amount(&amount).unwrap(),
                strategies,
            }
        }),
    ]
}

fn arb_state() -> impl proptest::strategy::Strategy<Value = FlowState> {
    prop_oneof![
        Just(FlowState::Idle),
        arb_awaiting_state(),
        "[1-9][0-9]{0,6}".prop_map(|amount| FlowState::FetchingStrategies {
            amount: validate_amount(&amount).unwrap()
        }),
        "0x[0-9a-f]{1,64}".prop_map(|address| FlowState::FetchingPosition {
            address: validate_address(&address).unwrap()
        }),
    ]
}

fn arb_command() -> impl proptest::strategy::Strategy<Value = EntryCommand> {
    prop_oneof![
        Just(EntryCommand::Start),
        Just(EntryCommand::Deposit),
        Just(EntryCommand::Withdraw),
        Just(EntryCommand::Strategies),
        Just(EntryCommand::Position),
    ]
}

/// Text that none of the validators accept
fn arb_garbage() -> impl proptest::strategy::Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("-1".to_string()),
        "[a-z]{1,10}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "0x[g-z]{1,10}",
    ]
}

proptest! {
    /// Invalid input never changes state or session contents; it only
    /// refreshes the session's activity time and prompts again
    #[test]
    fn garbage_input_reprompts(state in arb_awaiting_state(), text in arb_garbage()) {
        let result = transition(&state, Event::Text(text)).unwrap();
        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.effects.len(), 2);
        prop_assert_eq!(&result.effects[0], &Effect::TouchSession);
        prop_assert!(matches!(result.effects[1], Effect::Reply(_)));
    }

    /// Flow-starting commands always land in the flow's first state,
    /// whatever was in progress before
    #[test]
    fn commands_override_any_state(state in arb_state(), command in arb_command()) {
        let result = transition(&state, Event::Command(command)).unwrap();
        match command {
            EntryCommand::Deposit => {
                prop_assert_eq!(result.new_state, FlowState::AwaitingDepositAmount);
            }
            EntryCommand::Withdraw => {
                prop_assert_eq!(result.new_state, FlowState::AwaitingWithdrawAmount);
            }
            EntryCommand::Position => {
                prop_assert_eq!(result.new_state, FlowState::AwaitingPositionAddress);
            }
            EntryCommand::Start | EntryCommand::Strategies => {
                prop_assert_eq!(&result.new_state, &state);
                prop_assert!(!result.effects.contains(&Effect::PersistSession));
                prop_assert!(!result.effects.contains(&Effect::ClearSession));
            }
        }
    }

    /// Transitions to Idle always clear the session; other flow states always persist it
    #[test]
    fn session_effects_match_state(state in arb_state(), command in arb_command()) {
        let result = transition(&state, Event::Command(command)).unwrap();
        if result.new_state != state {
            prop_assert!(
                result.new_state.is_idle() || result.effects.contains(&Effect::PersistSession)
            );
        }
    }

    /// Strategy selection accepts exactly the indices of the captured list
    #[test]
    fn strategy_selection_bounds(strategies in arb_strategies(), pick in 0usize..10) {
        let n = strategies.len();
        let state = FlowState::AwaitingDepositStrategy {
            amount: validate_amount("100").unwrap(),
            strategies: strategies.clone(),
        };
        let result = transition(&state, Event::Text(pick.to_string())).unwrap();
        if pick < n {
            prop_assert!(result.new_state.is_idle());
            let emitted = result.effects.iter().any(|e| matches!(
                e,
                Effect::EmitPayload { strategy: Some(s), .. } if *s == strategies[pick]
            ));
            prop_assert!(emitted);
        } else {
            prop_assert_eq!(result.new_state, state);
        }
    }

    /// Every chain failure in the deposit flow ends it
    #[test]
    fn strategy_errors_return_to_idle(amount in "[1-9][0-9]{0,6}", message in "[a-z ]{0,20}") {
        let state = FlowState::FetchingStrategies { amount: validate_amount(&amount).unwrap() };
        let result = transition(&state, Event::StrategiesFetched {
            purpose: StrategiesPurpose::DepositSelection,
            result: Err(ChainError::network(message)),
        }).unwrap();
        prop_assert!(result.new_state.is_idle());
        prop_assert!(result.effects.contains(&Effect::ClearSession));
    }

    /// Transitions are deterministic
    #[test]
    fn transition_is_pure(state in arb_state(), text in "\\PC{0,12}") {
        let a = transition(&state, Event::Text(text.clone()));
        let b = transition(&state, Event::Text(text));
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "same input produced different outcomes"),
        }
    }
}
