//! Instruction set: data model and handler dispatch.
//!
//! The instruction representation (variants, operands, directives, mnemonic
//! classification) lives in [`instruction`]; the pluggable per-mnemonic
//! semantics live behind the [`handlers`] table.

/// Pluggable instruction handler table and the built-in reference handlers.
pub mod handlers;

/// Instruction, operand, and directive data model.
pub mod instruction;

pub use handlers::{DispatchCtx, Handler, HandlerTable, Operands};
pub use instruction::{DataDirective, Instruction, Operand, SourceLoc};
