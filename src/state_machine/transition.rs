//! Pure state transition function

use super::event::{EntryCommand, StrategiesPurpose};
use super::{Effect, Event, FlowState};
use crate::payload::Action;
use crate::render;
use crate::validate::{validate_address, validate_amount, validate_strategy_index};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: FlowState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: FlowState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Terminal outcome: back to `Idle` with the session dropped
    fn finish() -> Self {
        Self::new(FlowState::Idle).with_effect(Effect::ClearSession)
    }

    /// Invalid input: same state and session contents, prompt again.
    /// The attempt still counts as activity for idle expiry.
    fn reprompt(state: &FlowState, message: render::OutboundMessage) -> Self {
        Self::new(state.clone())
            .with_effect(Effect::TouchSession)
            .with_effect(Effect::reply(message))
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A chain query is still in progress")]
    Busy,
    #[error("Unexpected {event} event in state {state}")]
    UnexpectedEvent {
        state: &'static str,
        event: &'static str,
    },
}

/// Pure transition function
///
/// Given the same state and event it always produces the same result.
/// Validation failures never surface as errors; they re-prompt.
pub fn transition(state: &FlowState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Entry commands (valid in every state; they replace any session)
        // ============================================================
        (_, Event::Command(command)) => Ok(enter(state, command)),

        // ============================================================
        // Deposit
        // ============================================================
        (FlowState::AwaitingDepositAmount, Event::Text(text)) => {
            match validate_amount(text.trim()) {
                Err(_) => Ok(TransitionResult::reprompt(state, render::invalid_amount())),
                Ok(amount) => Ok(TransitionResult::new(FlowState::FetchingStrategies { amount })
                    .with_effect(Effect::PersistSession)
                    .with_effect(Effect::FetchStrategies {
                        purpose: StrategiesPurpose::DepositSelection,
                    })),
            }
        }

        (
            FlowState::FetchingStrategies { amount },
            Event::StrategiesFetched {
                purpose: StrategiesPurpose::DepositSelection,
                result,
            },
        ) => match result {
            Err(_) => Ok(TransitionResult::finish()
                .with_effect(Effect::reply(render::strategies_unavailable()))),
            Ok(strategies) if strategies.is_empty() => {
                Ok(TransitionResult::finish().with_effect(Effect::reply(render::no_strategies())))
            }
            Ok(strategies) => {
                let prompt = render::strategy_selection(amount, &strategies);
                Ok(TransitionResult::new(FlowState::AwaitingDepositStrategy {
                    amount: amount.clone(),
                    strategies,
                })
                .with_effect(Effect::PersistSession)
                .with_effect(Effect::reply(prompt)))
            }
        },

        (FlowState::AwaitingDepositStrategy { amount, strategies }, Event::Text(text)) => {
            let selected = validate_strategy_index(text.trim(), strategies.len())
                .ok()
                .and_then(|index| strategies.get(index));
            match selected {
                None => Ok(TransitionResult::reprompt(
                    state,
                    render::invalid_strategy(strategies.len()),
                )),
                Some(strategy) => Ok(TransitionResult::finish().with_effect(Effect::EmitPayload {
                    action: Action::Deposit,
                    amount: amount.clone(),
                    strategy: Some(strategy.clone()),
                })),
            }
        }

        // ============================================================
        // Withdraw
        // ============================================================
        (FlowState::AwaitingWithdrawAmount, Event::Text(text)) => {
            match validate_amount(text.trim()) {
                Err(_) => Ok(TransitionResult::reprompt(state, render::invalid_amount())),
                Ok(amount) => Ok(TransitionResult::finish().with_effect(Effect::EmitPayload {
                    action: Action::Withdraw,
                    amount,
                    strategy: None,
                })),
            }
        }

        // ============================================================
        // Position
        // ============================================================
        (FlowState::AwaitingPositionAddress, Event::Text(text)) => {
            match validate_address(text.trim()) {
                Err(_) => Ok(TransitionResult::reprompt(state, render::invalid_address())),
                Ok(address) => Ok(TransitionResult::new(FlowState::FetchingPosition {
                    address: address.clone(),
                })
                .with_effect(Effect::PersistSession)
                .with_effect(Effect::FetchPosition { address })),
            }
        }

        // Single-shot report: the session ends whatever the queries returned
        (FlowState::FetchingPosition { .. }, Event::PositionFetched { vault, resources }) => {
            let message = match &resources {
                Err(e) if e.kind.is_not_found() => render::account_not_found(),
                _ => render::position_report(&vault, &resources),
            };
            Ok(TransitionResult::finish().with_effect(Effect::reply(message)))
        }

        // ============================================================
        // Stateless listing (any state; the session is left as it was)
        // ============================================================
        (
            _,
            Event::StrategiesFetched {
                purpose: StrategiesPurpose::Listing,
                result,
            },
        ) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::reply(render::strategy_listing(&result)))),

        // ============================================================
        // Everything else
        // ============================================================

        // Text outside a flow is not ours to answer
        (FlowState::Idle, Event::Text(_)) => Ok(TransitionResult::new(FlowState::Idle)),

        (
            FlowState::FetchingStrategies { .. } | FlowState::FetchingPosition { .. },
            Event::Text(_),
        ) => Err(TransitionError::Busy),

        (state, event @ (Event::StrategiesFetched { .. } | Event::PositionFetched { .. })) => {
            Err(TransitionError::UnexpectedEvent {
                state: state.name(),
                event: event.name(),
            })
        }
    }
}

/// Entry transitions. Starting a flow discards whatever session existed.
fn enter(state: &FlowState, command: EntryCommand) -> TransitionResult {
    match command {
        EntryCommand::Start => {
            TransitionResult::new(state.clone()).with_effect(Effect::reply(render::welcome()))
        }
        EntryCommand::Strategies => {
            TransitionResult::new(state.clone()).with_effect(Effect::FetchStrategies {
                purpose: StrategiesPurpose::Listing,
            })
        }
        EntryCommand::Deposit => TransitionResult::new(FlowState::AwaitingDepositAmount)
            .with_effect(Effect::PersistSession)
            .with_effect(Effect::reply(render::deposit_amount_prompt())),
        EntryCommand::Withdraw => TransitionResult::new(FlowState::AwaitingWithdrawAmount)
            .with_effect(Effect::PersistSession)
            .with_effect(Effect::reply(render::withdraw_amount_prompt())),
        EntryCommand::Position => TransitionResult::new(FlowState::AwaitingPositionAddress)
            .with_effect(Effect::PersistSession)
            .with_effect(Effect::reply(render::position_address_prompt())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainError, RiskLevel, Strategy};
    use crate::validate::validate_amount;

    fn strategies(n: usize) -> Vec<Strategy> {
        (0..n)
            .map(|index| Strategy {
                index,
                name: format!("S{index}"),
                risk_level: Some(RiskLevel::Medium),
                description: String::new(),
                management_fee_bps: 100,
                performance_fee_bps: 1000,
            })
            .collect()
    }

    fn text(s: &str) -> Event {
        Event::Text(s.to_string())
    }

    #[test]
    fn deposit_happy_path() {
        let r = transition(&FlowState::Idle, Event::Command(EntryCommand::Deposit)).unwrap();
        assert_eq!(r.new_state, FlowState::AwaitingDepositAmount);
        assert!(r.effects.contains(&Effect::PersistSession));

        let r = transition(&r.new_state, text(" 100 ")).unwrap();
        let amount = validate_amount("100").unwrap();
        assert_eq!(
            r.new_state,
            FlowState::FetchingStrategies {
                amount: amount.clone()
            }
        );
        assert!(r.effects.contains(&Effect::FetchStrategies {
            purpose: StrategiesPurpose::DepositSelection
        }));

        let r = transition(
            &r.new_state,
            Event::StrategiesFetched {
                purpose: StrategiesPurpose::DepositSelection,
                result: Ok(strategies(2)),
            },
        )
        .unwrap();
        assert!(matches!(
            r.new_state,
            FlowState::AwaitingDepositStrategy { ref strategies, .. } if strategies.len() == 2
        ));

        let r = transition(&r.new_state, text("1")).unwrap();
        assert_eq!(r.new_state, FlowState::Idle);
        assert_eq!(
            r.effects,
            vec![
                Effect::ClearSession,
                Effect::EmitPayload {
                    action: Action::Deposit,
                    amount,
                    strategy: Some(strategies(2)[1].clone()),
                }
            ]
        );
    }

    #[test]
    fn invalid_amount_reprompts_and_keeps_session() {
        let r = transition(&FlowState::AwaitingDepositAmount, text("0")).unwrap();
        assert_eq!(r.new_state, FlowState::AwaitingDepositAmount);
        assert_eq!(
            r.effects,
            vec![
                Effect::TouchSession,
                Effect::Reply(render::invalid_amount())
            ]
        );
    }

    #[test]
    fn strategy_fetch_failure_ends_flow() {
        let state = FlowState::FetchingStrategies {
            amount: validate_amount("5").unwrap(),
        };
        let r = transition(
            &state,
            Event::StrategiesFetched {
                purpose: StrategiesPurpose::DepositSelection,
                result: Err(ChainError::timeout("slow")),
            },
        )
        .unwrap();
        assert_eq!(r.new_state, FlowState::Idle);
        assert!(r.effects.contains(&Effect::ClearSession));

        let r = transition(
            &state,
            Event::StrategiesFetched {
                purpose: StrategiesPurpose::DepositSelection,
                result: Ok(vec![]),
            },
        )
        .unwrap();
        assert_eq!(r.new_state, FlowState::Idle);
        assert!(r.effects.contains(&Effect::Reply(render::no_strategies())));
    }

    #[test]
    fn out_of_range_strategy_reprompts() {
        let state = FlowState::AwaitingDepositStrategy {
            amount: validate_amount("5").unwrap(),
            strategies: strategies(2),
        };
        for bad in ["2", "-1", "first", ""] {
            let r = transition(&state, text(bad)).unwrap();
            assert_eq!(r.new_state, state);
            assert_eq!(
                r.effects,
                vec![
                    Effect::TouchSession,
                    Effect::Reply(render::invalid_strategy(2))
                ]
            );
        }
    }

    #[test]
    fn withdraw_skips_strategy_step() {
        let r = transition(&FlowState::AwaitingWithdrawAmount, text("50")).unwrap();
        assert_eq!(r.new_state, FlowState::Idle);
        assert!(r.effects.contains(&Effect::EmitPayload {
            action: Action::Withdraw,
            amount: validate_amount("50").unwrap(),
            strategy: None,
        }));
    }

    #[test]
    fn position_not_found_is_terminal() {
        let address = validate_address("0xdead").unwrap();
        let r = transition(&FlowState::AwaitingPositionAddress, text("0xdead")).unwrap();
        assert_eq!(
            r.new_state,
            FlowState::FetchingPosition {
                address: address.clone()
            }
        );

        let r = transition(
            &r.new_state,
            Event::PositionFetched {
                vault: Err(ChainError::network("down")),
                resources: Err(ChainError::not_found("gone")),
            },
        )
        .unwrap();
        assert_eq!(r.new_state, FlowState::Idle);
        assert_eq!(
            r.effects,
            vec![
                Effect::ClearSession,
                Effect::Reply(render::account_not_found())
            ]
        );
    }

    #[test]
    fn new_command_discards_stale_flow() {
        let stale = FlowState::AwaitingDepositStrategy {
            amount: validate_amount("999").unwrap(),
            strategies: strategies(3),
        };
        let r = transition(&stale, Event::Command(EntryCommand::Withdraw)).unwrap();
        assert_eq!(r.new_state, FlowState::AwaitingWithdrawAmount);
    }

    #[test]
    fn listing_leaves_state_alone() {
        let state = FlowState::AwaitingWithdrawAmount;
        let r = transition(&state, Event::Command(EntryCommand::Strategies)).unwrap();
        assert_eq!(r.new_state, state);
        assert!(!r.effects.contains(&Effect::PersistSession));

        let r = transition(
            &state,
            Event::StrategiesFetched {
                purpose: StrategiesPurpose::Listing,
                result: Ok(strategies(1)),
            },
        )
        .unwrap();
        assert_eq!(r.new_state, state);
        assert_eq!(r.effects.len(), 1);
    }

    #[test]
    fn stray_results_are_rejected() {
        let err = transition(
            &FlowState::Idle,
            Event::PositionFetched {
                vault: Err(ChainError::network("x")),
                resources: Ok(vec![]),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::UnexpectedEvent {
                state: "idle",
                event: "position_fetched"
            }
        );
        assert_eq!(
            transition(
                &FlowState::FetchingPosition {
                    address: validate_address("0x1").unwrap()
                },
                text("hello")
            )
            .unwrap_err(),
            TransitionError::Busy
        );
    }

    #[test]
    fn idle_text_is_ignored() {
        let r = transition(&FlowState::Idle, text("hello")).unwrap();
        assert_eq!(r.new_state, FlowState::Idle);
        assert!(r.effects.is_empty());
    }
}
