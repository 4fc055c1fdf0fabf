//! Pluggable instruction handler table.
//!
//! This module defines the dispatch contract between the execution engine and
//! the per-mnemonic semantics. It provides:
//! 1. **Dispatch Context:** The register file, memory, and the normalized
//!    signed/double flags an operation may consult.
//! 2. **Operand View:** Uniform destination/source operand lists with typed
//!    accessors, so one handler serves every instruction class that shares a
//!    mnemonic (e.g. `add` and `addi`).
//! 3. **Handler Table:** Mnemonic-keyed registration and lookup; the built-in
//!    reference table covers the common integer, branch, floating-point,
//!    move, and memory mnemonics and can be replaced or extended entry by
//!    entry.
//!
//! Per-opcode arithmetic is deliberately *not* part of the engine core; the
//! engine defines this contract and the table supplies the behavior.

/// Integer ALU handlers.
mod alu;

/// Control-transfer handlers.
mod branch;

/// Floating-point arithmetic, compare, and convert handlers.
mod fp;

/// Load/store handlers.
mod memops;

/// Special-register, cross-file, and conditional move handlers.
mod moves;

use std::collections::HashMap;

use crate::common::constants::NUM_FLAGS;
use crate::common::error::SimError;
use crate::common::reg::RegisterFile;
use crate::isa::instruction::Operand;
use crate::mem::Memory;

/// Everything a handler may touch while executing one instruction.
///
/// The engine constructs one context per dispatch; `signed` and `double`
/// carry the result of mnemonic normalization (`addu` → `add` with
/// `signed = false`, `div.d` → `div.s` with `double = true`).
pub struct DispatchCtx<'a> {
    /// The unified register file, including condition flags and `hi`/`lo`.
    pub regs: &'a mut RegisterFile,
    /// The machine memory, for loads, stores, and string operands.
    pub mem: &'a mut Memory,
    /// The original, un-normalized mnemonic, for diagnostics and width checks.
    pub op: &'a str,
    /// False for `u`-suffixed mnemonics.
    pub signed: bool,
    /// True for `.d`-suffixed mnemonics.
    pub double: bool,
}

/// The destination and source operand lists of one dispatch.
#[derive(Clone, Copy, Debug)]
pub struct Operands<'a> {
    /// Locations the operation writes.
    pub dst: &'a [Operand],
    /// Values the operation reads.
    pub src: &'a [Operand],
}

impl Operands<'_> {
    fn malformed(ctx: &DispatchCtx<'_>) -> SimError {
        SimError::MalformedOperands(ctx.op.to_string())
    }

    /// Returns the `i`-th source operand.
    pub fn src(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<&Operand, SimError> {
        self.src.get(i).ok_or_else(|| Self::malformed(ctx))
    }

    /// Returns the `i`-th destination operand.
    pub fn dst(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<&Operand, SimError> {
        self.dst.get(i).ok_or_else(|| Self::malformed(ctx))
    }

    /// Reads the `i`-th source operand as a word value: a register is read
    /// from the register file, an immediate is truncated to 32 bits.
    pub fn src_value(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<u32, SimError> {
        match self.src(ctx, i)? {
            Operand::Reg(r) => Ok(ctx.regs.read(*r as usize)),
            Operand::Imm(v) => Ok(*v as u32),
            _ => Err(Self::malformed(ctx)),
        }
    }

    /// Returns the `i`-th source operand as a floating-point register index.
    pub fn src_freg(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<usize, SimError> {
        match self.src(ctx, i)? {
            Operand::FReg(r) => Ok(*r as usize),
            _ => Err(Self::malformed(ctx)),
        }
    }

    /// Returns the `i`-th source operand as a validated condition-flag index.
    pub fn src_flag(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<usize, SimError> {
        match self.src(ctx, i)? {
            Operand::Flag(c) if (*c as usize) < NUM_FLAGS => Ok(*c as usize),
            Operand::Flag(c) => Err(SimError::InvalidRegister(format!("$fcc{c}"))),
            _ => Err(Self::malformed(ctx)),
        }
    }

    /// Returns the `i`-th destination operand as a general register index.
    pub fn dst_reg(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<usize, SimError> {
        match self.dst(ctx, i)? {
            Operand::Reg(r) => Ok(*r as usize),
            _ => Err(Self::malformed(ctx)),
        }
    }

    /// Returns the `i`-th destination operand as a floating-point register index.
    pub fn dst_freg(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<usize, SimError> {
        match self.dst(ctx, i)? {
            Operand::FReg(r) => Ok(*r as usize),
            _ => Err(Self::malformed(ctx)),
        }
    }

    /// Returns the `i`-th destination operand as a validated condition-flag index.
    pub fn dst_flag(&self, ctx: &DispatchCtx<'_>, i: usize) -> Result<usize, SimError> {
        match self.dst(ctx, i)? {
            Operand::Flag(c) if (*c as usize) < NUM_FLAGS => Ok(*c as usize),
            Operand::Flag(c) => Err(SimError::InvalidRegister(format!("$fcc{c}"))),
            _ => Err(Self::malformed(ctx)),
        }
    }
}

/// Computes the effective address of a memory operand.
///
/// A base+offset reference adds the signed offset to the base register; a
/// bare immediate is a direct (label-resolved) address.
pub fn effective_address(
    regs: &RegisterFile,
    operand: &Operand,
    op: &str,
) -> Result<u32, SimError> {
    match operand {
        Operand::Mem { base, offset } => {
            Ok(regs.read(*base as usize).wrapping_add(*offset as u32))
        }
        Operand::Imm(v) => Ok(*v as u32),
        _ => Err(SimError::MalformedOperands(op.to_string())),
    }
}

/// One instruction handler.
///
/// Handlers are plain function pointers so a host can assemble a table
/// without capturing state; anything stateful belongs behind the engine's
/// host surface instead.
pub type Handler = fn(&mut DispatchCtx<'_>, &Operands<'_>) -> Result<(), SimError>;

/// The mnemonic-keyed handler table consulted by the engine's dispatcher.
#[derive(Clone, Debug, Default)]
pub struct HandlerTable {
    map: HashMap<String, Handler>,
}

impl HandlerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the built-in reference table.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        alu::register(&mut table);
        branch::register(&mut table);
        fp::register(&mut table);
        memops::register(&mut table);
        moves::register(&mut table);
        table
    }

    /// Registers `handler` under `mnemonic`, replacing any previous entry.
    pub fn register(&mut self, mnemonic: &str, handler: Handler) {
        let _ = self.map.insert(mnemonic.to_string(), handler);
    }

    /// Looks up the handler for a (normalized) mnemonic.
    pub fn lookup(&self, mnemonic: &str) -> Option<Handler> {
        self.map.get(mnemonic).copied()
    }

    /// Number of registered mnemonics.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
