//! Syscall dispatch and the built-in syscall set.
//!
//! This module defines the pluggable syscall table consulted when a `syscall`
//! instruction executes, plus the built-in console and file services:
//! 1. **Console:** Print/read integers, floats, doubles, characters, and strings,
//!    all routed through the engine's host surface.
//! 2. **Files:** Open/read/write/close against the memory's descriptor table,
//!    with descriptors 0-2 bound to the standard streams.
//! 3. **Termination:** Plain exit and exit-with-code.
//!
//! Host-level failures of the file services follow the conventional contract
//! of returning -1 in `$v0`; only an *unknown* code is an engine fault
//! (`InvalidSyscall`).

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::common::constants::{FREG_F0, FREG_F12, REG_A0, REG_A1, REG_A2, REG_V0};
use crate::common::error::SimError;
use crate::mem::files::{FileHandle, FileMode};

use super::ExecutionEngine;

/// Syscall codes understood by the built-in table.
pub mod codes {
    /// Print the signed integer in `$a0`.
    pub const PRINT_INT: u32 = 1;
    /// Print the single in `$f12`.
    pub const PRINT_FLOAT: u32 = 2;
    /// Print the double in `$f12`/`$f13`.
    pub const PRINT_DOUBLE: u32 = 3;
    /// Print the NUL-terminated string at `$a0`.
    pub const PRINT_STRING: u32 = 4;
    /// Read a signed integer into `$v0`.
    pub const READ_INT: u32 = 5;
    /// Read a single into `$f0`.
    pub const READ_FLOAT: u32 = 6;
    /// Read a double into `$f0`/`$f1`.
    pub const READ_DOUBLE: u32 = 7;
    /// Read a line into the buffer at `$a0`, at most `$a1` - 1 bytes plus NUL.
    pub const READ_STRING: u32 = 8;
    /// End the run.
    pub const EXIT: u32 = 10;
    /// Print the character in `$a0`.
    pub const PRINT_CHAR: u32 = 11;
    /// Read one character into `$v0`.
    pub const READ_CHAR: u32 = 12;
    /// Open the file named by the string at `$a0` with the flags in `$a1`.
    pub const OPEN: u32 = 13;
    /// Read `$a2` bytes from descriptor `$a0` into the buffer at `$a1`.
    pub const READ: u32 = 14;
    /// Write `$a2` bytes from the buffer at `$a1` to descriptor `$a0`.
    pub const WRITE: u32 = 15;
    /// Close descriptor `$a0`.
    pub const CLOSE: u32 = 16;
    /// End the run with the exit code in `$a0`.
    pub const EXIT2: u32 = 17;
}

/// The conventional error return of the file services.
const NEG_ONE: u32 = u32::MAX;

/// One syscall handler.
///
/// Handlers read and write registers and memory directly, and may use the
/// memory's open-file table and the engine's host surface.
pub type SyscallHandler = fn(&mut ExecutionEngine) -> Result<(), SimError>;

/// The code-keyed syscall table consulted by the engine.
#[derive(Clone, Debug, Default)]
pub struct SyscallTable {
    map: HashMap<u32, SyscallHandler>,
}

impl SyscallTable {
    /// Creates an empty table; every syscall then faults with `InvalidSyscall`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the built-in console/file table.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.register(codes::PRINT_INT, print_int);
        table.register(codes::PRINT_FLOAT, print_float);
        table.register(codes::PRINT_DOUBLE, print_double);
        table.register(codes::PRINT_STRING, print_string);
        table.register(codes::READ_INT, read_int);
        table.register(codes::READ_FLOAT, read_float);
        table.register(codes::READ_DOUBLE, read_double);
        table.register(codes::READ_STRING, read_string);
        table.register(codes::EXIT, exit);
        table.register(codes::PRINT_CHAR, print_char);
        table.register(codes::READ_CHAR, read_char);
        table.register(codes::OPEN, open_file);
        table.register(codes::READ, read_file);
        table.register(codes::WRITE, write_file);
        table.register(codes::CLOSE, close_file);
        table.register(codes::EXIT2, exit_with_code);
        table
    }

    /// Registers `handler` under `code`, replacing any previous entry.
    pub fn register(&mut self, code: u32, handler: SyscallHandler) {
        let _ = self.map.insert(code, handler);
    }

    /// Removes the handler for `code`; the code then faults with `InvalidSyscall`.
    pub fn disable(&mut self, code: u32) {
        let _ = self.map.remove(&code);
    }

    /// Looks up the handler for a code.
    pub fn lookup(&self, code: u32) -> Option<SyscallHandler> {
        self.map.get(&code).copied()
    }
}

fn input_line(engine: &mut ExecutionEngine) -> Result<String, SimError> {
    engine
        .host_mut()
        .read_line()
        .ok_or_else(|| SimError::Io("input closed".to_string()))
}

fn print_int(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let val = engine.regs().read(REG_A0 as usize) as i32;
    engine.host_mut().write(&val.to_string());
    Ok(())
}

fn print_float(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let val = f32::from_bits(engine.regs().read_f(FREG_F12 as usize));
    engine.host_mut().write(&val.to_string());
    Ok(())
}

fn print_double(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let val = f64::from_bits(engine.regs().read_d(FREG_F12 as usize)?);
    engine.host_mut().write(&val.to_string());
    Ok(())
}

fn print_string(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let addr = engine.regs().read(REG_A0 as usize);
    let text = engine.mem().read_asciiz(addr)?;
    engine.host_mut().write(&text);
    Ok(())
}

fn print_char(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let val = engine.regs().read(REG_A0 as usize);
    let ch = char::from(val as u8);
    engine.host_mut().write(&ch.to_string());
    Ok(())
}

fn read_int(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let line = input_line(engine)?;
    let val: i32 = line
        .trim()
        .parse()
        .map_err(|_| SimError::Io(format!("invalid integer input `{}`", line.trim())))?;
    engine.regs_mut().write(REG_V0 as usize, val as u32);
    Ok(())
}

fn read_float(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let line = input_line(engine)?;
    let val: f32 = line
        .trim()
        .parse()
        .map_err(|_| SimError::Io(format!("invalid float input `{}`", line.trim())))?;
    engine.regs_mut().write_f(FREG_F0 as usize, val.to_bits());
    Ok(())
}

fn read_double(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let line = input_line(engine)?;
    let val: f64 = line
        .trim()
        .parse()
        .map_err(|_| SimError::Io(format!("invalid double input `{}`", line.trim())))?;
    engine.regs_mut().write_d(FREG_F0 as usize, val.to_bits())
}

fn read_string(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let buf = engine.regs().read(REG_A0 as usize);
    let max = engine.regs().read(REG_A1 as usize);
    if max == 0 {
        return Ok(());
    }
    let line = input_line(engine)?;
    let take = line.len().min(max as usize - 1);
    let _ = engine.mem_mut().add_ascii(buf, &line[..take], true)?;
    Ok(())
}

fn read_char(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let line = input_line(engine)?;
    let val = line.bytes().next().unwrap_or(0);
    engine.regs_mut().write(REG_V0 as usize, u32::from(val));
    Ok(())
}

fn exit(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    engine.halt();
    engine.host_mut().finished();
    Ok(())
}

fn exit_with_code(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let code = engine.regs().read(REG_A0 as usize);
    engine.set_exit_code(code);
    engine.halt();
    engine.host_mut().finished();
    Ok(())
}

fn open_file(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let path_addr = engine.regs().read(REG_A0 as usize);
    let flags = engine.regs().read(REG_A1 as usize);
    let path = engine.mem().read_asciiz(path_addr)?;

    let result = FileMode::from_flags(flags)
        .ok_or_else(|| SimError::Io(format!("unsupported open flags {flags}")))
        .and_then(|mode| engine.mem_mut().files().open(&path, mode));
    let ret = result.unwrap_or(NEG_ONE);
    engine.regs_mut().write(REG_V0 as usize, ret);
    Ok(())
}

fn read_file(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let fd = engine.regs().read(REG_A0 as usize);
    let buf = engine.regs().read(REG_A1 as usize);
    let len = engine.regs().read(REG_A2 as usize) as usize;

    let mut chunk = vec![0u8; len];
    // Console reads go through the host surface, so the descriptor kind is
    // checked before any handle borrow is taken alongside it.
    let is_stdin = matches!(engine.mem_mut().files().handle(fd), Ok(FileHandle::Stdin));
    let count = if is_stdin {
        let line = engine.host_mut().read_line().unwrap_or_default();
        let take = line.len().min(len);
        chunk[..take].copy_from_slice(&line.as_bytes()[..take]);
        Some(take)
    } else {
        match engine.mem_mut().files().handle(fd) {
            Ok(FileHandle::File(file)) => file.read(&mut chunk).ok(),
            _ => None,
        }
    };

    let ret = match count {
        Some(n) => {
            for (i, byte) in chunk[..n].iter().enumerate() {
                engine.mem_mut().add_byte(buf.wrapping_add(i as u32), *byte)?;
            }
            n as u32
        }
        None => NEG_ONE,
    };
    engine.regs_mut().write(REG_V0 as usize, ret);
    Ok(())
}

fn write_file(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let fd = engine.regs().read(REG_A0 as usize);
    let buf = engine.regs().read(REG_A1 as usize);
    let len = engine.regs().read(REG_A2 as usize);

    let mut chunk = Vec::with_capacity(len as usize);
    for i in 0..len {
        chunk.push(engine.mem().byte(buf.wrapping_add(i))?);
    }

    let is_console = matches!(
        engine.mem_mut().files().handle(fd),
        Ok(FileHandle::Stdout | FileHandle::Stderr)
    );
    let count = if is_console {
        let text = String::from_utf8_lossy(&chunk).into_owned();
        engine.host_mut().write(&text);
        Some(chunk.len())
    } else {
        match engine.mem_mut().files().handle(fd) {
            Ok(FileHandle::File(file)) => file.write(&chunk).ok(),
            _ => None,
        }
    };

    let ret = count.map_or(NEG_ONE, |n| n as u32);
    engine.regs_mut().write(REG_V0 as usize, ret);
    Ok(())
}

fn close_file(engine: &mut ExecutionEngine) -> Result<(), SimError> {
    let fd = engine.regs().read(REG_A0 as usize);
    let ret = match engine.mem_mut().files().close(fd) {
        Ok(()) => 0,
        Err(_) => NEG_ONE,
    };
    engine.regs_mut().write(REG_V0 as usize, ret);
    Ok(())
}
