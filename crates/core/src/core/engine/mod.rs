//! Execution engine definition and construction.
//!
//! This module defines the `ExecutionEngine`, the owner of one simulated
//! machine. It coordinates the following:
//! 1. **State Ownership:** Exclusive ownership of the memory and register file.
//! 2. **Dispatch Tables:** The pluggable instruction handler and syscall tables.
//! 3. **Host Integration:** The output/input callback surface and the cancellation token.
//! 4. **Run State:** The `Running -> Halted | Faulted` state machine and the
//!    instruction counter backing the runaway guard.

/// The fetch/dispatch step loop.
pub mod execution;

/// Syscall table and the built-in console/file syscalls.
pub mod syscall;

use std::collections::HashMap;

use crate::common::reg::RegisterFile;
use crate::config::Config;
use crate::host::{CancelToken, ConsoleHost, Host};
use crate::isa::handlers::HandlerTable;
use crate::isa::instruction::Instruction;
use crate::mem::Memory;
use crate::stats::SimStats;
use syscall::SyscallTable;

/// Run state of one engine.
///
/// Both `Halted` and `Faulted` are terminal; there is no paused state inside
/// the engine; pausing is a debugger-layer concept built on single steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Instructions are being executed.
    Running,
    /// The terminate sentinel was reached.
    Halted,
    /// An unrecovered error ended the run.
    Faulted,
}

/// Result of one engine step.
///
/// Breakpoints are expected, frequent control flow, so they travel here
/// rather than as errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction executed; the engine is still running.
    Continued,
    /// A breakpoint instruction executed; the debugger should prompt.
    Breakpoint,
    /// The terminate sentinel was reached.
    Halted,
}

/// An instruction hook, run immediately before or after dispatch.
///
/// An extension point for tracing; the engine core never installs any.
pub type Hook = fn(&mut ExecutionEngine, &Instruction);

/// Pre/post instruction hooks keyed by mnemonic.
#[derive(Clone, Debug, Default)]
pub struct HookTable {
    pre: HashMap<String, Hook>,
    post: HashMap<String, Hook>,
}

impl HookTable {
    /// Installs a hook to run before every dispatch of `mnemonic`.
    pub fn add_pre(&mut self, mnemonic: &str, hook: Hook) {
        let _ = self.pre.insert(mnemonic.to_string(), hook);
    }

    /// Installs a hook to run after every dispatch of `mnemonic`.
    pub fn add_post(&mut self, mnemonic: &str, hook: Hook) {
        let _ = self.post.insert(mnemonic.to_string(), hook);
    }

    /// Looks up the pre-dispatch hook for a mnemonic.
    pub fn pre(&self, mnemonic: &str) -> Option<Hook> {
        self.pre.get(mnemonic).copied()
    }

    /// Looks up the post-dispatch hook for a mnemonic.
    pub fn post(&self, mnemonic: &str) -> Option<Hook> {
        self.post.get(mnemonic).copied()
    }
}

/// The execution engine: one simulated machine mid-run.
///
/// The engine exclusively owns its memory and registers; the only concurrency
/// surface is the host callback interface and the cancellation token, both
/// consulted at instruction boundaries only.
pub struct ExecutionEngine {
    mem: Memory,
    regs: RegisterFile,
    handlers: HandlerTable,
    syscalls: SyscallTable,
    hooks: HookTable,
    host: Box<dyn Host>,
    cancel: CancelToken,
    state: EngineState,
    executed: u64,
    max_instructions: u64,
    trace: bool,
    exit_code: Option<u32>,
    stats: SimStats,
}

impl ExecutionEngine {
    /// Creates an engine over freshly loaded memory and registers.
    ///
    /// The built-in handler and syscall tables are installed; replace or
    /// extend them through [`handlers_mut`](Self::handlers_mut) and
    /// [`syscalls_mut`](Self::syscalls_mut) before running.
    pub fn new(mem: Memory, regs: RegisterFile, config: &Config) -> Self {
        Self {
            mem,
            regs,
            handlers: HandlerTable::builtin(),
            syscalls: SyscallTable::builtin(),
            hooks: HookTable::default(),
            host: Box::new(ConsoleHost),
            cancel: CancelToken::new(),
            state: EngineState::Running,
            executed: 0,
            max_instructions: config.execution.max_instructions,
            trace: config.execution.trace_instructions,
            exit_code: None,
            stats: SimStats::new(),
        }
    }

    /// Replaces the host callback surface.
    pub fn set_host(&mut self, host: Box<dyn Host>) {
        self.host = host;
    }

    /// The machine memory.
    pub fn mem(&self) -> &Memory {
        &self.mem
    }

    /// The machine memory, mutably.
    pub fn mem_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    /// The register file.
    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// The register file, mutably.
    pub fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// The instruction handler table, for replacement or extension.
    pub fn handlers_mut(&mut self) -> &mut HandlerTable {
        &mut self.handlers
    }

    /// The syscall table, for replacement or extension.
    pub fn syscalls_mut(&mut self) -> &mut SyscallTable {
        &mut self.syscalls
    }

    /// The instruction hook table.
    pub fn hooks_mut(&mut self) -> &mut HookTable {
        &mut self.hooks
    }

    /// The host surface, for output and input requests.
    pub fn host_mut(&mut self) -> &mut dyn Host {
        self.host.as_mut()
    }

    /// A clone of the engine's cancellation token, for the embedding host.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current run state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Total instructions executed so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Run statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Run statistics, mutably (the debugger records reverse-steps here).
    pub fn stats_mut(&mut self) -> &mut SimStats {
        &mut self.stats
    }

    /// The instruction the next step will execute, if `pc` maps to one.
    pub fn peek(&self) -> Option<&Instruction> {
        self.mem.text_at(self.regs.pc())
    }

    /// Halts the engine; used by the exit syscalls.
    pub fn halt(&mut self) {
        self.state = EngineState::Halted;
    }

    /// Returns a halted engine to the running state.
    ///
    /// Debugger support: reversing out of the final instruction resumes a
    /// finished run. A faulted engine stays faulted.
    pub fn resume(&mut self) {
        if self.state == EngineState::Halted {
            self.state = EngineState::Running;
        }
    }

    /// Records the exit code supplied by an exit syscall.
    pub fn set_exit_code(&mut self, code: u32) {
        self.exit_code = Some(code);
    }

    /// Retrieves the exit code if the program supplied one.
    pub fn take_exit(&mut self) -> Option<u32> {
        self.exit_code.take()
    }

    /// Dumps the current machine state (registers) to stdout.
    pub fn dump_state(&self) {
        self.regs.dump();
    }

    pub(crate) fn trace_enabled(&self) -> bool {
        self.trace
    }

    pub(crate) fn max_instructions(&self) -> u64 {
        self.max_instructions
    }

    pub(crate) fn bump_executed(&mut self) {
        self.executed += 1;
        self.stats.instructions += 1;
    }

    pub(crate) fn force_state(&mut self, state: EngineState) {
        self.state = state;
    }

    /// Splits the machine state for a dispatch context without borrowing the
    /// tables alongside it.
    pub(crate) fn machine_mut(&mut self) -> (&mut RegisterFile, &mut Memory) {
        (&mut self.regs, &mut self.mem)
    }

    pub(crate) fn lookup_handler(&self, base: &str) -> Option<crate::isa::handlers::Handler> {
        self.handlers.lookup(base)
    }

    pub(crate) fn lookup_syscall(&self, code: u32) -> Option<syscall::SyscallHandler> {
        self.syscalls.lookup(code)
    }
}
