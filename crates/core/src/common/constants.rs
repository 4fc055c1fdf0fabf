//! Architectural constants and register naming.
//!
//! Defines the MIPS register-file dimensions, the conventional register
//! indices used by the loader and the built-in syscalls, and the name table
//! consumed by the debugger's register printer.

/// Number of general-purpose registers.
pub const NUM_GPRS: usize = 32;
/// Number of floating-point registers.
pub const NUM_FPRS: usize = 32;
/// Number of condition flags set by compare instructions.
pub const NUM_FLAGS: usize = 8;
/// Width of one machine word in bytes.
pub const WORD_BYTES: u32 = 4;

/// Register $0 (zero register, always zero).
pub const REG_ZERO: u8 = 0;
/// Register $1 (assembler temporary, at).
pub const REG_AT: u8 = 1;
/// Register $2 (first result / syscall code, v0).
pub const REG_V0: u8 = 2;
/// Register $3 (second result, v1).
pub const REG_V1: u8 = 3;
/// Register $4 (first argument, a0).
pub const REG_A0: u8 = 4;
/// Register $5 (second argument, a1).
pub const REG_A1: u8 = 5;
/// Register $6 (third argument, a2).
pub const REG_A2: u8 = 6;
/// Register $29 (stack pointer, sp).
pub const REG_SP: u8 = 29;
/// Register $31 (return address, ra).
pub const REG_RA: u8 = 31;

/// Floating-point register $f0 (float result register).
pub const FREG_F0: u8 = 0;
/// Floating-point register $f12 (first float argument to syscalls).
pub const FREG_F12: u8 = 12;

/// Conventional names of the 32 general-purpose registers, indexed by number.
pub const GPR_NAMES: [&str; NUM_GPRS] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

/// Resolves a register name to its index.
///
/// Accepts the conventional name with or without the `$` sigil (`$t0`, `t0`)
/// and plain numeric forms (`$8`, `8`). Floating-point names (`$f0`..`$f31`)
/// are *not* resolved here; see [`fpr_index`].
///
/// # Returns
///
/// The register index, or `None` if the name is not a general-purpose register.
pub fn gpr_index(name: &str) -> Option<usize> {
    let name = name.strip_prefix('$').unwrap_or(name);
    if let Ok(n) = name.parse::<usize>() {
        return (n < NUM_GPRS).then_some(n);
    }
    GPR_NAMES.iter().position(|&candidate| candidate == name)
}

/// Resolves a floating-point register name (`$f0`..`$f31`, sigil optional)
/// to its index.
pub fn fpr_index(name: &str) -> Option<usize> {
    let name = name.strip_prefix('$').unwrap_or(name);
    let number = name.strip_prefix('f')?;
    let n = number.parse::<usize>().ok()?;
    (n < NUM_FPRS).then_some(n)
}
