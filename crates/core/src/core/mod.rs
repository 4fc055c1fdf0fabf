//! Machine core: register state and the execution engine.

/// Architectural register files (general, floating-point, flags).
pub mod arch;

/// The execution engine and its dispatch/syscall tables.
pub mod engine;

pub use engine::{EngineState, ExecutionEngine, StepOutcome};
