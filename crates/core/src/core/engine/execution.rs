//! Main execution loop.
//!
//! This module implements the engine's step algorithm. One step is one
//! instruction:
//! 1. Fetch the instruction at `pc`; an unmapped address is a fault.
//! 2. Enforce the instruction ceiling (runaway-program guard).
//! 3. Halt at the terminate sentinel.
//! 4. Advance `pc` by one word *before* dispatch, so handlers observe the
//!    next instruction's address, which is exactly the link value jumps record and
//!    the base branches override.
//! 5. Dispatch by instruction variant to the handler table, with `u`/`.d`
//!    suffixes normalized into `signed`/`double` flags.
//!
//! Errors from dispatch propagate out uncaught; the caller decides whether
//! to present them. The engine performs no retries.

use tracing::{debug, trace};

use crate::common::constants::REG_V0;
use crate::common::error::SimError;
use crate::isa::handlers::{DispatchCtx, Operands};
use crate::isa::instruction::{is_float_mem, is_float_op, is_store, normalize, Instruction, Operand};

use super::{EngineState, ExecutionEngine, StepOutcome};

impl ExecutionEngine {
    /// Executes one instruction.
    ///
    /// # Errors
    ///
    /// Any run-time fault (`MemoryOutOfBounds`, `InstrCountExceeded`,
    /// `InvalidSyscall`, handler errors) moves the engine to `Faulted` and
    /// propagates.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        match self.step_inner() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.set_faulted();
                Err(e)
            }
        }
    }

    /// Runs until the sentinel, a fault, or cancellation.
    ///
    /// The cancellation token is checked only between instructions, so a
    /// cancelled run always stops with consistent machine state.
    pub fn run(&mut self) -> Result<(), SimError> {
        while self.state() == EngineState::Running {
            if self.cancel_token().is_cancelled() {
                debug!("run cancelled at instruction boundary");
                break;
            }
            if self.step()? == StepOutcome::Halted {
                break;
            }
        }
        Ok(())
    }

    fn set_faulted(&mut self) {
        self.force_state(EngineState::Faulted);
    }

    fn step_inner(&mut self) -> Result<StepOutcome, SimError> {
        let pc = self.regs().pc();
        let Some(instr) = self.mem().text_at(pc) else {
            return Err(SimError::MemoryOutOfBounds(pc));
        };
        let instr = instr.clone();

        if self.executed() >= self.max_instructions() {
            return Err(SimError::InstrCountExceeded(self.executed()));
        }

        if matches!(instr, Instruction::Terminate) {
            debug!(
                pc = format_args!("{pc:#010x}"),
                executed = self.executed(),
                "terminate sentinel reached"
            );
            self.halt();
            self.host_mut().finished();
            return Ok(StepOutcome::Halted);
        }

        self.regs_mut().set_pc(pc.wrapping_add(4));
        self.bump_executed();

        if self.trace_enabled() {
            trace!(pc = format_args!("{pc:#010x}"), instr = %instr, "step");
        }

        if let Some(op) = instr.op() {
            if let Some(hook) = self.hooks_mut().pre(op) {
                hook(self, &instr);
            }
        }
        let outcome = self.execute(&instr)?;
        if let Some(op) = instr.op() {
            if let Some(hook) = self.hooks_mut().post(op) {
                hook(self, &instr);
            }
        }
        Ok(outcome)
    }

    fn execute(&mut self, instr: &Instruction) -> Result<StepOutcome, SimError> {
        match instr {
            // Register indices name the file the mnemonic implies, so
            // float arithmetic shares this arm with the integer ALU.
            Instruction::RType { op, rd, rs, rt, .. } => {
                let (dst, src) = if is_float_op(op) {
                    (
                        [Operand::FReg(*rd)],
                        [Operand::FReg(*rs), Operand::FReg(*rt)],
                    )
                } else {
                    (
                        [Operand::Reg(*rd)],
                        [Operand::Reg(*rs), Operand::Reg(*rt)],
                    )
                };
                self.dispatch(op, &dst, &src, true)?;
            }
            Instruction::IType { op, rt, rs, imm, .. } => {
                let dst = [Operand::Reg(*rt)];
                let src = [Operand::Reg(*rs), imm.clone()];
                self.dispatch(op, &dst, &src, true)?;
            }
            Instruction::JType { op, target, rd, .. } => {
                self.stats_mut().branches += 1;
                let link = rd.map(Operand::Reg);
                let dst = match &link {
                    Some(operand) => std::slice::from_ref(operand),
                    None => &[],
                };
                let src = [target.clone()];
                self.dispatch(op, dst, &src, true)?;
            }
            Instruction::Branch { op, rs, rt, target, .. } => {
                self.stats_mut().branches += 1;
                let src = [Operand::Reg(*rs), Operand::Reg(*rt), target.clone()];
                self.dispatch(op, &[], &src, true)?;
            }
            Instruction::BranchFloat { op, flag, target, .. } => {
                self.stats_mut().branches += 1;
                let src = [Operand::Flag(*flag), target.clone()];
                self.dispatch(op, &[], &src, true)?;
            }
            Instruction::Compare { op, flag, fs, ft, .. } => {
                let dst = [Operand::Flag(*flag)];
                let src = [Operand::FReg(*fs), Operand::FReg(*ft)];
                self.dispatch(op, &dst, &src, true)?;
            }
            // Converts name both formats in the mnemonic; dispatch unnormalized.
            Instruction::Convert { op, fd, fs, .. } => {
                let dst = [Operand::FReg(*fd)];
                let src = [Operand::FReg(*fs)];
                self.dispatch(op, &dst, &src, false)?;
            }
            Instruction::Move { op, dst, src, .. } => {
                let dst = [dst.clone()];
                let src = [src.clone()];
                self.dispatch(op, &dst, &src, true)?;
            }
            Instruction::MoveFloat { op, fd, fs, .. } => {
                let dst = [Operand::FReg(*fd)];
                let src = [Operand::FReg(*fs)];
                self.dispatch(op, &dst, &src, true)?;
            }
            Instruction::MoveCond { op, rd, rs, cond, .. } => {
                let dst = [Operand::Reg(*rd)];
                let src = [Operand::Reg(*rs), cond.clone()];
                self.dispatch(op, &dst, &src, true)?;
            }
            Instruction::LoadMem { op, reg, addr, .. } => {
                let reg_op = if is_float_mem(op) {
                    Operand::FReg(*reg)
                } else {
                    Operand::Reg(*reg)
                };
                if is_store(op) {
                    self.stats_mut().stores += 1;
                    let dst = [addr.clone()];
                    let src = [reg_op];
                    self.dispatch(op, &dst, &src, true)?;
                } else {
                    self.stats_mut().loads += 1;
                    let dst = [reg_op];
                    let src = [addr.clone()];
                    self.dispatch(op, &dst, &src, true)?;
                }
            }
            Instruction::Syscall { .. } => {
                self.stats_mut().syscalls += 1;
                self.do_syscall()?;
                if self.state() == EngineState::Halted {
                    return Ok(StepOutcome::Halted);
                }
            }
            Instruction::Breakpoint { .. } => return Ok(StepOutcome::Breakpoint),
            Instruction::Terminate => {
                self.halt();
                return Ok(StepOutcome::Halted);
            }
            Instruction::Pseudo { .. } | Instruction::Label { .. } | Instruction::Declaration { .. } => {
                return Err(SimError::MalformedProgram(
                    "non-executable node in text segment".to_string(),
                ));
            }
        }
        Ok(StepOutcome::Continued)
    }

    fn dispatch(
        &mut self,
        op: &str,
        dst: &[Operand],
        src: &[Operand],
        normalize_op: bool,
    ) -> Result<(), SimError> {
        let (base, signed, double) = if normalize_op {
            normalize(op)
        } else {
            (op.to_string(), true, false)
        };
        let handler = self
            .lookup_handler(&base)
            .ok_or_else(|| SimError::UnknownInstruction(op.to_string()))?;
        let (regs, mem) = self.machine_mut();
        let mut ctx = DispatchCtx {
            regs,
            mem,
            op,
            signed,
            double,
        };
        handler(&mut ctx, &Operands { dst, src })
    }

    fn do_syscall(&mut self) -> Result<(), SimError> {
        let code = self.regs().read(REG_V0 as usize);
        trace!(code, "syscall");
        let handler = self
            .lookup_syscall(code)
            .ok_or(SimError::InvalidSyscall(code))?;
        handler(self)
    }
}
