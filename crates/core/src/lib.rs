//! MIPS-like teaching virtual machine with a reversible debugger.
//!
//! This crate implements a self-contained instruction-set interpreter and
//! time-travel debugger with the following:
//! 1. **Memory:** Byte-addressable data/text store, label table, and open-file table.
//! 2. **Registers:** General, floating-point (with double pairing), and special registers.
//! 3. **Loader:** Turns an assembled node sequence into a populated machine.
//! 4. **Engine:** The fetch/decode/dispatch loop over a pluggable handler table.
//! 5. **Debugger:** Breakpoints, single-step, reverse-step, and inspection.

/// Common types (constants, errors, the unified register file).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Machine core (register state and the execution engine).
pub mod core;
/// Reversible debugging (change log and REPL debugger).
pub mod debug;
/// Host callback surface and cancellation.
pub mod host;
/// Instruction set (data model and handler dispatch).
pub mod isa;
/// Simulated memory (segments, labels, open files).
pub mod mem;
/// Program input and loading.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The execution engine; owns one simulated machine.
pub use crate::core::ExecutionEngine;
/// The interactive time-travel debugger wrapping an engine.
pub use crate::debug::Debugger;
