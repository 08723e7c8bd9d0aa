//! Dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in and delivers the returned effects.

mod effect;
pub mod event;
pub mod state;
pub mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Command, Event};
pub use state::{ConvContext, ConvState, Conversation, DiceRollPolicy, Scratch};
pub use transition::{transition, TransitionError, TransitionResult};
