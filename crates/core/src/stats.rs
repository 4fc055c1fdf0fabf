//! Simulation statistics collection and reporting.
//!
//! This module tracks run metrics for the simulator. It provides:
//! 1. **Instruction counts:** Total executed, and the load/store/branch/syscall mix.
//! 2. **Debugger activity:** Reverse-step count and peak change-stack depth.
//! 3. **Timing:** Wall-clock duration and derived instructions-per-second.

use std::time::Instant;

/// Run statistics collected by one execution engine.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total instructions executed.
    pub instructions: u64,
    /// Memory loads executed.
    pub loads: u64,
    /// Memory stores executed.
    pub stores: u64,
    /// Branch and jump instructions executed.
    pub branches: u64,
    /// Syscalls dispatched.
    pub syscalls: u64,
    /// Reverse-steps taken by the debugger.
    pub reversed: u64,
    /// Deepest the change stack has grown.
    pub max_undo_depth: usize,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            instructions: 0,
            loads: 0,
            stores: 0,
            branches: 0,
            syscalls: 0,
            reversed: 0,
            max_undo_depth: 0,
        }
    }
}

impl SimStats {
    /// Creates zeroed statistics with the clock started now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints the run report to stdout.
    pub fn print(&self) {
        let elapsed = self.start_time.elapsed();
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            self.instructions as f64 / secs
        } else {
            0.0
        };
        println!("--- Run statistics ---");
        println!("Instructions : {:>12}", self.instructions);
        println!("  loads      : {:>12}", self.loads);
        println!("  stores     : {:>12}", self.stores);
        println!("  branches   : {:>12}", self.branches);
        println!("  syscalls   : {:>12}", self.syscalls);
        if self.reversed > 0 {
            println!("Reverse steps: {:>12}", self.reversed);
            println!("Undo depth   : {:>12}", self.max_undo_depth);
        }
        println!("Elapsed      : {:>9.3} s  ({rate:.0} instr/s)", secs);
    }
}
