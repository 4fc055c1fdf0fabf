//! Change log: the undo record behind reverse-stepping.
//!
//! This module implements the reversible-debugger state capture. It provides:
//! 1. **Change Variants:** One tagged record per kind of architectural side effect.
//! 2. **Pre-execution Capture:** Inspection of the instruction about to run to
//!    snapshot the one location it will write.
//! 3. **Restoration:** Applying a popped record back onto the machine.
//!
//! One record is pushed per executed instruction (holding the *pre*-execution
//! values) and popped by a reverse-step, which restores the values and resets
//! `pc` to the recorded address.

use crate::common::error::SimError;
use crate::common::reg::RegisterFile;
use crate::core::engine::ExecutionEngine;
use crate::isa::handlers::effective_address;
use crate::isa::instruction::{
    is_float_mem, is_float_op, is_store, mem_width, writes_hi_lo, Instruction, MemWidth, Operand,
};
use crate::mem::Memory;

/// The register a change record targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegTarget {
    /// A general-purpose register.
    Gpr(usize),
    /// A floating-point register (single word).
    Fpr(usize),
    /// An even/odd floating-point pair (double).
    FprDouble(usize),
}

/// One recorded side effect, holding pre-execution state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A register write.
    Reg {
        /// Which register was overwritten.
        target: RegTarget,
        /// Its value before execution.
        prev: u64,
        /// `pc` of the instruction that made the change.
        prev_pc: u32,
    },
    /// A memory write.
    Mem {
        /// Address of the overwritten span.
        addr: u32,
        /// The span's value before execution; `None` if it was unmapped.
        prev: Option<u64>,
        /// Width of the span.
        width: MemWidth,
        /// `pc` of the instruction that made the change.
        prev_pc: u32,
    },
    /// A `hi`/`lo` pair write.
    HiLo {
        /// `hi` before execution.
        prev_hi: u32,
        /// `lo` before execution.
        prev_lo: u32,
        /// `pc` of the instruction that made the change.
        prev_pc: u32,
    },
    /// A condition-flag write.
    Flag {
        /// Which flag was written.
        flag: usize,
        /// Its value before execution.
        prev: bool,
        /// `pc` of the instruction that made the change.
        prev_pc: u32,
    },
    /// No side effect beyond `pc` (branches, jumps without link, syscalls).
    Pc {
        /// `pc` of the executed instruction.
        prev_pc: u32,
    },
}

impl StateChange {
    /// The `pc` a reverse-step resets to.
    pub fn prev_pc(&self) -> u32 {
        match self {
            Self::Reg { prev_pc, .. }
            | Self::Mem { prev_pc, .. }
            | Self::HiLo { prev_pc, .. }
            | Self::Flag { prev_pc, .. }
            | Self::Pc { prev_pc } => *prev_pc,
        }
    }

    /// Restores the captured value to its register/memory/flag location.
    ///
    /// The caller resets `pc` separately via [`prev_pc`](Self::prev_pc).
    pub fn restore(&self, regs: &mut RegisterFile, mem: &mut Memory) -> Result<(), SimError> {
        match self {
            Self::Reg { target, prev, .. } => match target {
                RegTarget::Gpr(r) => {
                    regs.write(*r, *prev as u32);
                    Ok(())
                }
                RegTarget::Fpr(r) => {
                    regs.write_f(*r, *prev as u32);
                    Ok(())
                }
                RegTarget::FprDouble(r) => regs.write_d(*r, *prev),
            },
            Self::Mem {
                addr, prev, width, ..
            } => mem.restore(*addr, *width, *prev),
            Self::HiLo {
                prev_hi, prev_lo, ..
            } => {
                regs.set_hi_lo(*prev_hi, *prev_lo);
                Ok(())
            }
            Self::Flag { flag, prev, .. } => {
                regs.set_flag(*flag, *prev);
                Ok(())
            }
            Self::Pc { .. } => Ok(()),
        }
    }
}

/// Inspects the instruction the engine is about to execute and snapshots the
/// location it will write.
///
/// Returns `None` when nothing will execute (no instruction at `pc`, or the
/// terminate sentinel). Mirrors the destination rules of the dispatch layer:
/// the multiply/divide family changes `hi`/`lo`, stores change memory, loads
/// and ALU operations change their destination register, compares flip one
/// flag, and control transfers change only `pc`.
pub fn capture(engine: &ExecutionEngine) -> Result<Option<StateChange>, SimError> {
    let regs = engine.regs();
    let prev_pc = regs.pc();
    let Some(instr) = engine.peek() else {
        return Ok(None);
    };

    let change = match instr {
        Instruction::Terminate => return Ok(None),

        Instruction::RType { op, rd, .. } => {
            if writes_hi_lo(op) {
                hi_lo_change(regs, prev_pc)
            } else if is_float_op(op) {
                if op.ends_with(".d") {
                    fpr_double_change(regs, *rd as usize, prev_pc)?
                } else {
                    fpr_change(regs, *rd as usize, prev_pc)
                }
            } else {
                gpr_change(regs, *rd as usize, prev_pc)
            }
        }
        Instruction::IType { rt, .. } => gpr_change(regs, *rt as usize, prev_pc),
        Instruction::JType { op, rd, .. } => {
            if let Some(rd) = rd {
                gpr_change(regs, *rd as usize, prev_pc)
            } else if op == "jal" {
                gpr_change(regs, crate::common::constants::REG_RA as usize, prev_pc)
            } else {
                StateChange::Pc { prev_pc }
            }
        }
        Instruction::Branch { .. } | Instruction::BranchFloat { .. } => {
            StateChange::Pc { prev_pc }
        }
        Instruction::Compare { flag, .. } => {
            let idx = *flag as usize;
            if idx >= crate::common::constants::NUM_FLAGS {
                return Err(SimError::InvalidRegister(format!("$fcc{flag}")));
            }
            StateChange::Flag {
                flag: idx,
                prev: regs.flag(idx),
                prev_pc,
            }
        }
        Instruction::Convert { op, fd, .. } => {
            if op.starts_with("cvt.d") {
                fpr_double_change(regs, *fd as usize, prev_pc)?
            } else {
                fpr_change(regs, *fd as usize, prev_pc)
            }
        }
        Instruction::Move { op, dst, .. } => {
            if writes_hi_lo(op) {
                hi_lo_change(regs, prev_pc)
            } else {
                match dst {
                    Operand::Reg(r) => gpr_change(regs, *r as usize, prev_pc),
                    Operand::FReg(r) => fpr_change(regs, *r as usize, prev_pc),
                    _ => StateChange::Pc { prev_pc },
                }
            }
        }
        Instruction::MoveFloat { op, fd, .. } => {
            if op.ends_with(".d") {
                fpr_double_change(regs, *fd as usize, prev_pc)?
            } else {
                fpr_change(regs, *fd as usize, prev_pc)
            }
        }
        Instruction::MoveCond { rd, .. } => gpr_change(regs, *rd as usize, prev_pc),

        Instruction::LoadMem { op, reg, addr, .. } => {
            let width = mem_width(op);
            if is_store(op) {
                let addr = effective_address(regs, addr, op)?;
                StateChange::Mem {
                    addr,
                    prev: engine.mem().probe(addr, width),
                    width,
                    prev_pc,
                }
            } else if is_float_mem(op) {
                if width == MemWidth::Double {
                    fpr_double_change(regs, *reg as usize, prev_pc)?
                } else {
                    fpr_change(regs, *reg as usize, prev_pc)
                }
            } else {
                gpr_change(regs, *reg as usize, prev_pc)
            }
        }

        Instruction::Syscall { .. }
        | Instruction::Breakpoint { .. }
        | Instruction::Pseudo { .. }
        | Instruction::Label { .. }
        | Instruction::Declaration { .. } => StateChange::Pc { prev_pc },
    };
    Ok(Some(change))
}

fn gpr_change(regs: &RegisterFile, reg: usize, prev_pc: u32) -> StateChange {
    StateChange::Reg {
        target: RegTarget::Gpr(reg),
        prev: u64::from(regs.read(reg)),
        prev_pc,
    }
}

fn fpr_change(regs: &RegisterFile, reg: usize, prev_pc: u32) -> StateChange {
    StateChange::Reg {
        target: RegTarget::Fpr(reg),
        prev: u64::from(regs.read_f(reg)),
        prev_pc,
    }
}

fn fpr_double_change(
    regs: &RegisterFile,
    reg: usize,
    prev_pc: u32,
) -> Result<StateChange, SimError> {
    Ok(StateChange::Reg {
        target: RegTarget::FprDouble(reg),
        prev: regs.read_d(reg)?,
        prev_pc,
    })
}

fn hi_lo_change(regs: &RegisterFile, prev_pc: u32) -> StateChange {
    let (prev_hi, prev_lo) = regs.hi_lo();
    StateChange::HiLo {
        prev_hi,
        prev_lo,
        prev_pc,
    }
}

/// The change stack: a LIFO of per-instruction undo records.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    stack: Vec<StateChange>,
}

impl ChangeLog {
    /// Creates an empty change stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes one record.
    pub fn push(&mut self, change: StateChange) {
        self.stack.push(change);
    }

    /// Pops the most recent record, if any.
    pub fn pop(&mut self) -> Option<StateChange> {
        self.stack.pop()
    }

    /// Current stack depth.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Discards all records.
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
