//! General-Purpose Register File.
//!
//! This module implements the general-purpose register file of the simulated
//! machine. It performs the following:
//! 1. **Storage:** Maintains 32 word registers (`$0`-`$31`).
//! 2. **Invariant Enforcement:** Ensures that register `$0` is hardwired to zero.
//! 3. **Debugging:** Provides utilities for dumping the complete register state.

use crate::common::constants::{GPR_NAMES, NUM_GPRS};

/// General-Purpose Register file.
///
/// Contains 32 word registers used for integer operations. Register `$0`
/// is hardwired to zero and cannot be modified.
#[derive(Clone, Debug)]
pub struct Gpr {
    regs: [u32; NUM_GPRS],
}

impl Default for Gpr {
    fn default() -> Self {
        Self::new()
    }
}

impl Gpr {
    /// Creates a new general-purpose register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_GPRS],
        }
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The 32-bit value stored in the specified register. Register `$0` always returns 0.
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a value to a general-purpose register.
    ///
    /// Writes to `$0` are silently ignored, mirroring the hardware convention.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Dumps the contents of all general-purpose registers to stdout.
    ///
    /// Displays registers in pairs with hexadecimal formatting for debugging purposes.
    pub fn dump(&self) {
        for i in (0..NUM_GPRS).step_by(2) {
            println!(
                "${:<4}={:#010x}  ${:<4}={:#010x}",
                GPR_NAMES[i],
                self.regs[i],
                GPR_NAMES[i + 1],
                self.regs[i + 1]
            );
        }
    }
}
