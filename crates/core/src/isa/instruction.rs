//! Instruction data model.
//!
//! This module defines the closed instruction representation consumed by the
//! loader and the execution engine. It provides:
//! 1. **Instruction Variants:** One tagged variant per instruction class, with payload.
//! 2. **Operand Descriptors:** Register, immediate, label, and memory operand forms.
//! 3. **Mnemonic Classification:** Suffix normalization and the helper predicates
//!    used by dispatch and by the change-log inspector.
//!
//! Programs arrive as a serialized node sequence produced by an external
//! assembler; every type here derives `Deserialize` for that wire format.

use std::fmt;

use serde::Deserialize;

use crate::common::constants::GPR_NAMES;

/// Source-file tag carried by every program node for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct SourceLoc {
    /// Source file the node was assembled from.
    #[serde(default)]
    pub file: String,
    /// One-based source line number.
    #[serde(default)]
    pub line: u32,
}

impl SourceLoc {
    /// Creates a source tag from a file name and line number.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An operand descriptor.
///
/// After loading completes, no `Label` operand survives inside the text
/// segment: the loader rewrites every label reference to a numeric operand,
/// and an unresolved reference is a load-time fatal error.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A general-purpose register index.
    Reg(u8),
    /// A floating-point register index.
    FReg(u8),
    /// An immediate value (sign information is the operation's concern).
    Imm(i64),
    /// A symbolic label reference, resolved at load time.
    Label(String),
    /// A base-register-plus-offset memory reference.
    Mem {
        /// Base register index.
        base: u8,
        /// Signed byte offset added to the base register.
        offset: i32,
    },
    /// A condition-flag index.
    Flag(u8),
}

impl Default for Operand {
    fn default() -> Self {
        Self::Reg(0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(r) => write!(f, "${}", GPR_NAMES[*r as usize % GPR_NAMES.len()]),
            Self::FReg(r) => write!(f, "$f{r}"),
            Self::Imm(v) => write!(f, "{v}"),
            Self::Label(name) => write!(f, "{name}"),
            Self::Mem { base, offset } => {
                write!(f, "{offset}(${})", GPR_NAMES[*base as usize % GPR_NAMES.len()])
            }
            Self::Flag(c) => write!(f, "{c}"),
        }
    }
}

/// A data-segment directive carried by a `Declaration` node.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataDirective {
    /// `.word`: one or more 32-bit values.
    Word(Vec<i32>),
    /// `.half`: one or more 16-bit values.
    Half(Vec<i16>),
    /// `.byte`: one or more 8-bit values.
    Byte(Vec<i8>),
    /// `.float`: one or more single-precision values.
    Float(Vec<f32>),
    /// `.double`: one or more double-precision values.
    Double(Vec<f64>),
    /// `.ascii`: a string without a terminating NUL.
    Ascii(String),
    /// `.asciiz`: a NUL-terminated string.
    Asciiz(String),
    /// `.space`: a zero-filled region of the given byte length.
    Space(u32),
    /// `.align`: round the data cursor up to a multiple of 2^n.
    Align(u32),
}

impl DataDirective {
    /// Returns the natural alignment in bytes of the directive's element type.
    ///
    /// `Align` reports 1 here; its explicit boundary is applied by the writer.
    pub fn alignment(&self) -> u32 {
        match self {
            Self::Word(_) | Self::Float(_) => 4,
            Self::Half(_) => 2,
            Self::Double(_) => 8,
            Self::Byte(_) | Self::Ascii(_) | Self::Asciiz(_) | Self::Space(_) | Self::Align(_) => 1,
        }
    }
}

impl fmt::Display for DataDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(vs) => write!(f, ".word {}", join(vs)),
            Self::Half(vs) => write!(f, ".half {}", join(vs)),
            Self::Byte(vs) => write!(f, ".byte {}", join(vs)),
            Self::Float(vs) => write!(f, ".float {}", join(vs)),
            Self::Double(vs) => write!(f, ".double {}", join(vs)),
            Self::Ascii(s) => write!(f, ".ascii {s:?}"),
            Self::Asciiz(s) => write!(f, ".asciiz {s:?}"),
            Self::Space(n) => write!(f, ".space {n}"),
            Self::Align(n) => write!(f, ".align {n}"),
        }
    }
}

fn join<T: fmt::Display>(vs: &[T]) -> String {
    vs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One program node: an executable instruction, an assembler-level construct
/// (label, declaration, pseudo-instruction), or the terminate sentinel.
///
/// The variants mirror the instruction classes of the source architecture;
/// per-mnemonic arithmetic lives in the pluggable handler table, not here.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    /// Three-register arithmetic operation (`add $rd, $rs, $rt`,
    /// `mul.s $f2, $f4, $f6`).
    ///
    /// The register indices name the file the mnemonic implies: the general
    /// file for plain mnemonics, the floating-point file for `.s`/`.d` forms
    /// (see [`is_float_op`]).
    RType {
        /// Operation mnemonic.
        op: String,
        /// Destination register.
        rd: u8,
        /// First source register.
        rs: u8,
        /// Second source register.
        rt: u8,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Register-immediate operation (`addi $rt, $rs, imm`).
    IType {
        /// Operation mnemonic.
        op: String,
        /// Destination register.
        rt: u8,
        /// Source register.
        rs: u8,
        /// Immediate operand (may be a label before loading).
        imm: Operand,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Unconditional jump (`j target`, `jal target`, `jr $rs`,
    /// `jalr $rd, $rs`).
    JType {
        /// Operation mnemonic.
        op: String,
        /// Jump target: a label before loading, an address or register after.
        target: Operand,
        /// Link register written with the return address (`jalr` only).
        #[serde(default)]
        rd: Option<u8>,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Conditional branch on integer registers (`beq $rs, $rt, target`).
    Branch {
        /// Operation mnemonic.
        op: String,
        /// First compared register.
        rs: u8,
        /// Second compared register (zero for the single-register forms).
        #[serde(default)]
        rt: u8,
        /// Branch target.
        target: Operand,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Conditional branch on a condition flag (`bc1t cc, target`).
    BranchFloat {
        /// Operation mnemonic (`bc1t` or `bc1f`).
        op: String,
        /// Condition-flag index consulted by the branch.
        #[serde(default)]
        flag: u8,
        /// Branch target.
        target: Operand,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Floating-point compare setting one condition flag (`c.lt.s cc, $fs, $ft`).
    Compare {
        /// Operation mnemonic.
        op: String,
        /// Condition-flag index written by the compare.
        #[serde(default)]
        flag: u8,
        /// First compared float register.
        fs: u8,
        /// Second compared float register.
        ft: u8,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Format conversion between integer and float representations
    /// (`cvt.s.w $fd, $fs`).
    Convert {
        /// Full operation mnemonic; converts are dispatched without suffix
        /// normalization because the suffix pair names both formats.
        op: String,
        /// Destination float register.
        fd: u8,
        /// Source float register.
        fs: u8,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Special-register and cross-file move
    /// (`mfhi $rd`, `mtlo $rs`, `mfc1 $rt, $fs`, `mtc1 $rt, $fs`).
    Move {
        /// Operation mnemonic.
        op: String,
        /// Destination operand (unused by the `mt*` forms).
        #[serde(default)]
        dst: Operand,
        /// Source operand (unused by the `mf*` special-register forms).
        #[serde(default)]
        src: Operand,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Floating-point register move (`mov.s $fd, $fs`).
    MoveFloat {
        /// Operation mnemonic.
        op: String,
        /// Destination float register.
        fd: u8,
        /// Source float register.
        fs: u8,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Conditional move (`movz $rd, $rs, $rt`; `movt $rd, $rs, cc`).
    MoveCond {
        /// Operation mnemonic.
        op: String,
        /// Destination register.
        rd: u8,
        /// Source register.
        rs: u8,
        /// Condition operand: a register for `movz`/`movn`, a flag for
        /// `movt`/`movf`.
        cond: Operand,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Memory load or store (`lw $rt, 4($sp)`, `s.s $f2, 0($a0)`).
    ///
    /// Whether the operation is a load or a store, and whether `reg` names a
    /// general or floating-point register, follows from the mnemonic (see
    /// [`is_store`] and [`is_float_mem`]).
    LoadMem {
        /// Operation mnemonic.
        op: String,
        /// The register loaded into or stored from.
        reg: u8,
        /// The memory reference: base+offset, or a label before loading.
        addr: Operand,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// System call; the code is read from `$v0` at execution time.
    Syscall {
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// Breakpoint instruction, intercepted by the debugger.
    Breakpoint {
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// A pseudo-instruction: one source line that expands into a fixed
    /// sequence of machine instructions at load time.
    Pseudo {
        /// Source-level mnemonic (`la`, `li`, label-addressed `lw`, ...).
        op: String,
        /// The concrete expansion appended to the text segment.
        expansion: Vec<Instruction>,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// A text-segment label binding.
    Label {
        /// Label name; `main` fixes the program entry point.
        name: String,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// A data-segment declaration.
    Declaration {
        /// Optional symbol bound at the (aligned) data cursor.
        #[serde(default)]
        label: Option<String>,
        /// The directive to lay out.
        directive: DataDirective,
        /// Source tag for diagnostics.
        #[serde(default)]
        loc: SourceLoc,
    },
    /// The synthetic sentinel appended after the program so the fetch loop
    /// has a definite halt condition.
    Terminate,
}

impl Instruction {
    /// Returns the node's source tag, if it carries one.
    pub fn loc(&self) -> Option<&SourceLoc> {
        match self {
            Self::RType { loc, .. }
            | Self::IType { loc, .. }
            | Self::JType { loc, .. }
            | Self::Branch { loc, .. }
            | Self::BranchFloat { loc, .. }
            | Self::Compare { loc, .. }
            | Self::Convert { loc, .. }
            | Self::Move { loc, .. }
            | Self::MoveFloat { loc, .. }
            | Self::MoveCond { loc, .. }
            | Self::LoadMem { loc, .. }
            | Self::Syscall { loc }
            | Self::Breakpoint { loc }
            | Self::Pseudo { loc, .. }
            | Self::Label { loc, .. }
            | Self::Declaration { loc, .. } => Some(loc),
            Self::Terminate => None,
        }
    }

    /// Returns the node's mnemonic, if it carries one.
    pub fn op(&self) -> Option<&str> {
        match self {
            Self::RType { op, .. }
            | Self::IType { op, .. }
            | Self::JType { op, .. }
            | Self::Branch { op, .. }
            | Self::BranchFloat { op, .. }
            | Self::Compare { op, .. }
            | Self::Convert { op, .. }
            | Self::Move { op, .. }
            | Self::MoveFloat { op, .. }
            | Self::MoveCond { op, .. }
            | Self::LoadMem { op, .. }
            | Self::Pseudo { op, .. } => Some(op),
            Self::Syscall { .. }
            | Self::Breakpoint { .. }
            | Self::Label { .. }
            | Self::Declaration { .. }
            | Self::Terminate => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gpr = |r: &u8| format!("${}", GPR_NAMES[*r as usize % GPR_NAMES.len()]);
        match self {
            Self::RType { op, rd, rs, rt, .. } => {
                if is_float_op(op) {
                    write!(f, "{op} $f{rd}, $f{rs}, $f{rt}")
                } else {
                    write!(f, "{op} {}, {}, {}", gpr(rd), gpr(rs), gpr(rt))
                }
            }
            Self::IType { op, rt, rs, imm, .. } => {
                write!(f, "{op} {}, {}, {imm}", gpr(rt), gpr(rs))
            }
            Self::JType { op, target, rd, .. } => match rd {
                Some(rd) => write!(f, "{op} {}, {target}", gpr(rd)),
                None => write!(f, "{op} {target}"),
            },
            Self::Branch { op, rs, rt, target, .. } => {
                write!(f, "{op} {}, {}, {target}", gpr(rs), gpr(rt))
            }
            Self::BranchFloat { op, flag, target, .. } => write!(f, "{op} {flag}, {target}"),
            Self::Compare { op, flag, fs, ft, .. } => {
                write!(f, "{op} {flag}, $f{fs}, $f{ft}")
            }
            Self::Convert { op, fd, fs, .. } | Self::MoveFloat { op, fd, fs, .. } => {
                write!(f, "{op} $f{fd}, $f{fs}")
            }
            Self::Move { op, dst, src, .. } => match op.as_str() {
                "mfhi" | "mflo" => write!(f, "{op} {dst}"),
                "mthi" | "mtlo" => write!(f, "{op} {src}"),
                _ => write!(f, "{op} {dst}, {src}"),
            },
            Self::MoveCond { op, rd, rs, cond, .. } => {
                write!(f, "{op} {}, {}, {cond}", gpr(rd), gpr(rs))
            }
            Self::LoadMem { op, reg, addr, .. } => {
                if is_float_mem(op) {
                    write!(f, "{op} $f{reg}, {addr}")
                } else {
                    write!(f, "{op} {}, {addr}", gpr(reg))
                }
            }
            Self::Syscall { .. } => write!(f, "syscall"),
            Self::Breakpoint { .. } => write!(f, "break"),
            Self::Pseudo { op, .. } => write!(f, "{op}"),
            Self::Label { name, .. } => write!(f, "{name}:"),
            Self::Declaration { label, directive, .. } => match label {
                Some(name) => write!(f, "{name}: {directive}"),
                None => write!(f, "{directive}"),
            },
            Self::Terminate => write!(f, "<terminate>"),
        }
    }
}

/// Width of one memory transfer, derived from a load/store mnemonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemWidth {
    /// One byte.
    Byte,
    /// Two bytes.
    Half,
    /// Four bytes (also single-precision floats).
    Word,
    /// Eight bytes (double-precision floats).
    Double,
}

impl MemWidth {
    /// Returns the transfer width in bytes.
    pub fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
            Self::Double => 8,
        }
    }
}

/// Normalizes a mnemonic for handler-table lookup.
///
/// Unsigned variants (trailing `u`) and double-precision variants (trailing
/// `.d`) fold onto their base mnemonic so the table needs one entry per base
/// operation:
///
/// * `addu` → (`add`, signed = false, double = false)
/// * `div.d` → (`div.s`, signed = true, double = true)
/// * `lbu` → (`lb`, signed = false, double = false)
///
/// Convert mnemonics (`cvt.*.*`) name both formats explicitly and must be
/// dispatched without normalization.
pub fn normalize(op: &str) -> (String, bool, bool) {
    if let Some(base) = op.strip_suffix(".d") {
        return (format!("{base}.s"), true, true);
    }
    if op.len() > 1 {
        if let Some(base) = op.strip_suffix('u') {
            return (base.to_string(), false, false);
        }
    }
    (op.to_string(), true, false)
}

/// Returns true if the mnemonic operates on the floating-point file
/// (`add.s`, `div.d`); plain mnemonics operate on the general file.
pub fn is_float_op(op: &str) -> bool {
    op.contains('.')
}

/// Returns true if the load/store mnemonic writes memory (a store).
pub fn is_store(op: &str) -> bool {
    op.starts_with('s')
}

/// Returns true if the load/store mnemonic moves a floating-point register.
pub fn is_float_mem(op: &str) -> bool {
    op.contains('.') || op.ends_with("c1")
}

/// Returns the transfer width of a load/store mnemonic.
pub fn mem_width(op: &str) -> MemWidth {
    match op {
        "lb" | "lbu" | "sb" => MemWidth::Byte,
        "lh" | "lhu" | "sh" => MemWidth::Half,
        "l.d" | "s.d" | "ldc1" | "sdc1" => MemWidth::Double,
        _ => MemWidth::Word,
    }
}

/// Returns true if the mnemonic belongs to the multiply/divide family that
/// writes `hi`/`lo` instead of a destination register.
pub fn writes_hi_lo(op: &str) -> bool {
    matches!(
        op,
        "mult" | "multu" | "div" | "divu" | "madd" | "maddu" | "msub" | "msubu" | "mthi" | "mtlo"
    )
}
