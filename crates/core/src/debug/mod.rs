//! Reversible debugging: change log and interactive debugger.

/// Change capture and the undo stack.
pub mod changelog;

/// The interactive time-travel debugger.
pub mod debugger;

pub use changelog::{ChangeLog, StateChange};
pub use debugger::Debugger;
