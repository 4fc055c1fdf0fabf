//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct, which acts as a unified
//! interface for accessing every piece of register state in the machine. It
//! provides:
//! 1. **Unified Storage:** General-purpose, floating-point, and condition-flag files.
//! 2. **Special Registers:** The program counter and the `hi`/`lo` multiply/divide pair.
//! 3. **Observability:** Debugging utilities for dumping register state during simulation.

use crate::common::error::SimError;
use crate::core::arch::flags::CondFlags;
use crate::core::arch::fpr::Fpr;
use crate::core::arch::gpr::Gpr;

/// Unified register file containing all processor register state.
///
/// Word reads and writes are exact 32-bit two's-complement; whether a value is
/// interpreted as signed or unsigned is a per-operation choice made by the
/// instruction handlers, never a property of the register itself.
#[derive(Clone, Debug, Default)]
pub struct RegisterFile {
    gpr: Gpr,
    fpr: Fpr,
    flags: CondFlags,
    pc: u32,
    hi: u32,
    lo: u32,
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a value from a general-purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Register `$0` always returns 0.
    pub fn read(&self, idx: usize) -> u32 {
        self.gpr.read(idx)
    }

    /// Writes a value to a general-purpose register.
    ///
    /// Writes to `$0` are silently ignored.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        self.gpr.write(idx, val);
    }

    /// Reads a floating-point register as raw single-precision bits.
    pub fn read_f(&self, idx: usize) -> u32 {
        self.fpr.read(idx)
    }

    /// Writes raw single-precision bits to a floating-point register.
    pub fn write_f(&mut self, idx: usize, val: u32) {
        self.fpr.write(idx, val);
    }

    /// Reads an even/odd floating-point register pair as one double-precision
    /// bit pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRegister`] if `idx` is odd.
    pub fn read_d(&self, idx: usize) -> Result<u64, SimError> {
        self.fpr.read_double(idx)
    }

    /// Writes one double-precision bit pattern across an even/odd register pair.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRegister`] if `idx` is odd.
    pub fn write_d(&mut self, idx: usize, val: u64) -> Result<(), SimError> {
        self.fpr.write_double(idx, val)
    }

    /// Returns the current program counter.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Sets the program counter.
    ///
    /// `pc` is a plain word register with no aliasing or alignment side effects.
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// Returns the `(hi, lo)` multiply/divide result pair.
    pub fn hi_lo(&self) -> (u32, u32) {
        (self.hi, self.lo)
    }

    /// Sets the `(hi, lo)` multiply/divide result pair.
    pub fn set_hi_lo(&mut self, hi: u32, lo: u32) {
        self.hi = hi;
        self.lo = lo;
    }

    /// Reads condition flag `idx`.
    pub fn flag(&self, idx: usize) -> bool {
        self.flags.get(idx)
    }

    /// Sets condition flag `idx` to `val`.
    pub fn set_flag(&mut self, idx: usize, val: bool) {
        self.flags.set(idx, val);
    }

    /// Dumps the register state to stdout.
    ///
    /// Useful for debugging and for the CLI's fatal-error state dump.
    pub fn dump(&self) {
        println!("pc   ={:#010x}  hi   ={:#010x}  lo   ={:#010x}", self.pc, self.hi, self.lo);
        self.gpr.dump();
    }
}
