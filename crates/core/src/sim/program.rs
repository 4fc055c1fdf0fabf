//! Assembled program input.
//!
//! The simulator does not parse assembly source; an external assembler emits
//! an ordered node sequence (declarations, labels, instructions,
//! pseudo-instructions) which arrives here as JSON.

use serde::Deserialize;

use crate::common::error::SimError;
use crate::isa::instruction::Instruction;

/// One assembled program: the ordered node sequence the loader consumes.
///
/// # Examples
///
/// ```
/// use mipsim_core::sim::program::Program;
///
/// let json = r#"{
///     "nodes": [
///         { "kind": "label", "name": "main" },
///         { "kind": "i_type", "op": "addi", "rt": 8, "rs": 0,
///           "imm": { "imm": 41 }, "loc": { "file": "demo.s", "line": 2 } },
///         { "kind": "syscall" }
///     ]
/// }"#;
///
/// let program = Program::from_json(json).unwrap();
/// assert_eq!(program.nodes.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Program {
    /// Program nodes in source order.
    pub nodes: Vec<Instruction>,
}

impl Program {
    /// Builds a program from an in-memory node sequence.
    pub fn new(nodes: Vec<Instruction>) -> Self {
        Self { nodes }
    }

    /// Deserializes a program from the assembler's JSON output.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MalformedProgram`] if the text is not a valid
    /// node sequence.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        serde_json::from_str(text).map_err(|e| SimError::MalformedProgram(e.to_string()))
    }
}
