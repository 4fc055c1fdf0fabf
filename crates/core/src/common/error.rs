//! Simulator error definitions.
//!
//! This module defines the error taxonomy shared by the loader, the execution
//! engine, and the debugger. It provides:
//! 1. **Load-time failures:** Label and alignment problems that abort loading.
//! 2. **Run-time failures:** Memory, syscall, and instruction-limit faults that abort a run.
//! 3. **Register-shape failures:** Structurally invalid register accesses.
//!
//! Breakpoints are deliberately *not* represented here: hitting a breakpoint is
//! expected control flow and travels as a [`StepOutcome`](crate::core::engine::StepOutcome)
//! variant instead of an error.

use thiserror::Error;

/// Errors raised while loading or executing a simulated program.
///
/// Load-time variants (`UndefinedLabel`, `DuplicateLabel`, `NoMainLabel`,
/// `BadAlignment`, `MalformedProgram`) always abort loading. Run-time variants
/// abort the current run; the engine never retries or self-heals. The
/// presenting layer (debugger REPL or CLI wrapper) is the only place an error
/// is turned into a message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// A data or text access touched an address with nothing mapped at it.
    #[error("memory access out of bounds at {0:#010x}")]
    MemoryOutOfBounds(u32),

    /// A label was referenced but never bound by the program.
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    /// A label was bound twice.
    #[error("duplicate label `{0}`")]
    DuplicateLabel(String),

    /// The program defines no `main` label to start execution from.
    #[error("program has no `main` label")]
    NoMainLabel,

    /// A structurally invalid register access, e.g. a double-precision
    /// read at an odd-numbered floating-point register.
    #[error("invalid register `{0}`")]
    InvalidRegister(String),

    /// An alignment boundary that is zero, not a power of two, or too large.
    #[error("invalid alignment boundary {0}")]
    BadAlignment(u32),

    /// A syscall code with no entry in the syscall table.
    #[error("invalid or disabled syscall code {0}")]
    InvalidSyscall(u32),

    /// The cumulative instruction counter passed the configured ceiling.
    ///
    /// This is the runaway-program guard: an infinite loop halts with this
    /// error instead of hanging the host.
    #[error("instruction limit exceeded after {0} instructions")]
    InstrCountExceeded(u64),

    /// A mnemonic with no entry in the instruction handler table.
    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),

    /// An instruction whose operand list does not fit its mnemonic.
    ///
    /// This indicates a broken assembler front-end, not a program bug.
    #[error("malformed operands for `{0}`")]
    MalformedOperands(String),

    /// Integer division by zero.
    #[error("division by zero")]
    DivideByZero,

    /// A file descriptor with no entry in the open-file table.
    #[error("bad file descriptor {0}")]
    BadDescriptor(u32),

    /// The program input could not be deserialized.
    #[error("malformed program: {0}")]
    MalformedProgram(String),

    /// A host I/O operation failed.
    #[error("i/o error: {0}")]
    Io(String),
}
