//! Interactive time-travel debugger.
//!
//! This module drives an execution engine under user control. It provides:
//! 1. **Breakpoints:** A set of `(file, line)` pairs checked before each step.
//! 2. **Stepping:** Single-step with change capture, continue, and reverse-step.
//! 3. **Inspection:** Register and labeled-memory printing in several bases.
//! 4. **REPL:** A one-letter-verb command loop over the engine's host surface.
//!
//! The debugger is the only layer that handles breakpoints; engine errors
//! propagate to the caller untouched.

use std::collections::HashSet;

use tracing::debug;

use crate::common::constants::{fpr_index, gpr_index};
use crate::common::error::SimError;
use crate::config::Config;
use crate::core::engine::{EngineState, ExecutionEngine, StepOutcome};
use crate::debug::changelog::{self, ChangeLog};
use crate::isa::instruction::Instruction;

const USAGE: &str = "commands:
  n              execute the next instruction
  c              continue to the next breakpoint
  r              reverse one instruction
  p <what> ...   print a register or labeled memory
                   p $t0 [i|u|x|b]      register in a base
                   p $f2 [f|x]          float register
                   p pc | hi | lo       special registers
                   p <label> <byte|half|word|float|double> [n]
                   p <label> str        NUL-terminated string
  b [file] line  add a breakpoint
  i              list breakpoints
  d              clear all breakpoints
  q              quit";

/// The interactive debugger wrapping one execution engine.
pub struct Debugger {
    engine: ExecutionEngine,
    breakpoints: HashSet<(String, u32)>,
    continue_flag: bool,
    enabled: bool,
    force_prompt: bool,
    log: ChangeLog,
}

impl Debugger {
    /// Wraps an engine, taking debug-mode enablement from the configuration.
    pub fn new(engine: ExecutionEngine, config: &Config) -> Self {
        Self {
            engine,
            breakpoints: HashSet::new(),
            continue_flag: false,
            enabled: config.debug.enabled,
            force_prompt: false,
            log: ChangeLog::new(),
        }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    /// The wrapped engine, mutably.
    pub fn engine_mut(&mut self) -> &mut ExecutionEngine {
        &mut self.engine
    }

    /// Consumes the debugger, returning the engine.
    pub fn into_engine(self) -> ExecutionEngine {
        self.engine
    }

    /// Current change-stack depth.
    pub fn undo_depth(&self) -> usize {
        self.log.len()
    }

    /// Returns true if execution should pause and prompt before `instr`.
    ///
    /// True iff the instruction's `(file, line)` is a breakpoint, or debug
    /// mode is enabled and the user has not asked to continue.
    pub fn debug(&self, instr: &Instruction) -> bool {
        if let Some(loc) = instr.loc() {
            if self
                .breakpoints
                .iter()
                .any(|(file, line)| *file == loc.file && *line == loc.line)
            {
                return true;
            }
        }
        self.enabled && !self.continue_flag
    }

    /// Adds a breakpoint at `(file, line)`.
    pub fn add_breakpoint(&mut self, file: &str, line: u32) {
        debug!(file, line, "breakpoint added");
        let _ = self.breakpoints.insert((file.to_string(), line));
    }

    /// Removes every breakpoint.
    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    /// Lists the breakpoints on the host surface.
    pub fn print_breakpoints(&mut self) {
        if self.breakpoints.is_empty() {
            self.engine.host_mut().write_line("no breakpoints");
            return;
        }
        let mut sorted: Vec<_> = self.breakpoints.iter().cloned().collect();
        sorted.sort();
        for (file, line) in sorted {
            let text = format!("  {file}:{line}");
            self.engine.host_mut().write_line(&text);
        }
    }

    /// Executes one instruction, recording its undo entry.
    ///
    /// # Errors
    ///
    /// Engine faults propagate; nothing is pushed for a failed step.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        let pending = changelog::capture(&self.engine)?;
        let outcome = self.engine.step()?;
        if let Some(change) = pending {
            self.log.push(change);
            if self.log.len() > self.engine.stats().max_undo_depth {
                self.engine.stats_mut().max_undo_depth = self.log.len();
            }
        }
        Ok(outcome)
    }

    /// Undoes the most recent instruction: restores the captured values and
    /// resets `pc`. A no-op on an empty change stack.
    ///
    /// # Returns
    ///
    /// True if a change was reversed.
    pub fn reverse(&mut self) -> Result<bool, SimError> {
        let Some(change) = self.log.pop() else {
            return Ok(false);
        };
        let prev_pc = change.prev_pc();
        {
            let (regs, mem) = self.engine.machine_mut();
            change.restore(regs, mem)?;
        }
        self.engine.regs_mut().set_pc(prev_pc);
        self.engine.resume();
        self.engine.stats_mut().reversed += 1;
        Ok(true)
    }

    /// Drives the engine to completion under debugger control.
    ///
    /// Before each step the breakpoint set (and debug mode) decide whether to
    /// prompt; a breakpoint *instruction* re-arms prompting rather than
    /// terminating the run.
    pub fn run(&mut self) -> Result<(), SimError> {
        loop {
            if self.engine.state() != EngineState::Running
                || self.engine.cancel_token().is_cancelled()
            {
                break;
            }
            let prompt = self.force_prompt
                || self.engine.peek().is_some_and(|instr| self.debug(instr));
            if prompt {
                self.force_prompt = false;
                self.continue_flag = false;
                self.listen()?;
                if self.engine.state() != EngineState::Running {
                    break;
                }
            }
            match self.step()? {
                StepOutcome::Halted => break,
                StepOutcome::Breakpoint => {
                    self.force_prompt = true;
                    self.continue_flag = false;
                }
                StepOutcome::Continued => {}
            }
        }
        Ok(())
    }

    /// The REPL: prints the current instruction, reads one command, and
    /// dispatches by verb. Returns when the user resumes (`n`, `c`) or quits.
    pub fn listen(&mut self) -> Result<(), SimError> {
        loop {
            let heading = match self.engine.peek() {
                Some(instr) => match instr.loc() {
                    Some(loc) => format!("{loc}: {instr}"),
                    None => instr.to_string(),
                },
                None => format!("{:#010x}: <no instruction>", self.engine.regs().pc()),
            };
            self.engine.host_mut().write_line(&heading);
            self.engine.host_mut().write("(dbg) ");

            let Some(line) = self.engine.host_mut().read_line() else {
                // Input closed: treat as quit.
                self.engine.halt();
                return Ok(());
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                [] | ["n"] => return Ok(()),
                ["c"] => {
                    self.continue_flag = true;
                    return Ok(());
                }
                ["r"] => {
                    if !self.reverse()? {
                        self.engine.host_mut().write_line("nothing to reverse");
                    }
                }
                ["q"] => {
                    self.engine.halt();
                    return Ok(());
                }
                ["i"] => self.print_breakpoints(),
                ["d"] => {
                    self.clear_breakpoints();
                    self.engine.host_mut().write_line("breakpoints cleared");
                }
                ["b", rest @ ..] => self.cmd_breakpoint(rest),
                ["p", rest @ ..] => self.cmd_print(rest),
                _ => self.engine.host_mut().write_line(USAGE),
            }
        }
    }

    fn cmd_breakpoint(&mut self, args: &[&str]) {
        match args {
            [file, line] => match line.parse() {
                Ok(line) => self.add_breakpoint(file, line),
                Err(_) => self.engine.host_mut().write_line(USAGE),
            },
            [line] => {
                let current = self
                    .engine
                    .peek()
                    .and_then(Instruction::loc)
                    .map(|loc| loc.file.clone());
                match (current, line.parse()) {
                    (Some(file), Ok(line)) => self.add_breakpoint(&file, line),
                    _ => self.engine.host_mut().write_line(USAGE),
                }
            }
            _ => self.engine.host_mut().write_line(USAGE),
        }
    }

    fn cmd_print(&mut self, args: &[&str]) {
        let text = match args {
            [name] if name.starts_with('$') => self.format_register(name, "i"),
            [name, base] if name.starts_with('$') => self.format_register(name, base),
            ["pc"] => Ok(format!("pc = {:#010x}", self.engine.regs().pc())),
            ["hi"] => Ok(format!("hi = {:#010x}", self.engine.regs().hi_lo().0)),
            ["lo"] => Ok(format!("lo = {:#010x}", self.engine.regs().hi_lo().1)),
            [label, "str"] => self.format_memory_string(label),
            [label] => self.format_memory(label, "word", 1),
            [label, kind] => self.format_memory(label, kind, 1),
            [label, kind, count] => match count.parse() {
                Ok(count) => self.format_memory(label, kind, count),
                Err(_) => {
                    self.engine.host_mut().write_line(USAGE);
                    return;
                }
            },
            _ => {
                self.engine.host_mut().write_line(USAGE);
                return;
            }
        };
        match text {
            Ok(text) => self.engine.host_mut().write_line(&text),
            Err(e) => {
                let msg = format!("error: {e}");
                self.engine.host_mut().write_line(&msg);
            }
        }
    }

    fn format_register(&self, name: &str, base: &str) -> Result<String, SimError> {
        if let Some(idx) = gpr_index(name) {
            let val = self.engine.regs().read(idx);
            return Ok(format!("{name} = {}", format_word(val, base)?));
        }
        if let Some(idx) = fpr_index(name) {
            let bits = self.engine.regs().read_f(idx);
            return match base {
                "f" => Ok(format!("{name} = {}", f32::from_bits(bits))),
                "d" => {
                    let pair = self.engine.regs().read_d(idx)?;
                    Ok(format!("{name} = {}", f64::from_bits(pair)))
                }
                _ => Ok(format!("{name} = {}", format_word(bits, base)?)),
            };
        }
        Err(SimError::InvalidRegister(name.to_string()))
    }

    fn format_memory(&self, label: &str, kind: &str, count: u32) -> Result<String, SimError> {
        let base = self.engine.mem().label(label)?;
        let mut lines = Vec::new();
        let mut addr = base;
        for _ in 0..count {
            let (text, width) = match kind {
                "byte" => (format!("{:#04x}", self.engine.mem().byte(addr)?), 1),
                "half" => (format!("{:#06x}", self.engine.mem().half(addr)?), 2),
                "word" => (format!("{:#010x}", self.engine.mem().word(addr)?), 4),
                "float" => (self.engine.mem().float(addr)?.to_string(), 4),
                "double" => (self.engine.mem().double(addr)?.to_string(), 8),
                _ => return Err(SimError::MalformedProgram(format!("unknown width `{kind}`"))),
            };
            lines.push(format!("{addr:#010x}: {text}"));
            addr = addr.wrapping_add(width);
        }
        Ok(lines.join("\n"))
    }

    fn format_memory_string(&self, label: &str) -> Result<String, SimError> {
        let addr = self.engine.mem().label(label)?;
        let text = self.engine.mem().read_asciiz(addr)?;
        Ok(format!("{addr:#010x}: {text:?}"))
    }
}

/// Formats a register word in one of the print bases: `i` signed decimal,
/// `u` unsigned decimal, `x` hex, `b` binary; the latter two zero-padded to
/// the register's four-byte width.
pub fn format_word(val: u32, base: &str) -> Result<String, SimError> {
    match base {
        "i" => Ok((val as i32).to_string()),
        "u" => Ok(val.to_string()),
        "x" => Ok(format!("{val:#010x}")),
        "b" => Ok(format!("{val:#034b}")),
        other => Err(SimError::MalformedProgram(format!("unknown base `{other}`"))),
    }
}
