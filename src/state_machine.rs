//! Conversation flow state machine
//!
//! Pure transitions in the Elm style: `transition(state, event)` returns the
//! next state and the effects the runtime must perform. No I/O happens here.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{EntryCommand, Event};
pub use state::FlowState;
pub use transition::transition;
