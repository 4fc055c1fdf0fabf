//! Program loader and initial machine setup.
//!
//! This module turns an assembled program into populated memory and seeded
//! registers. It performs:
//! 1. **Data layout:** Writes declarations at the (aligned) data cursor.
//! 2. **Label binding:** Binds text labels, fixing `main` as the entry point.
//! 3. **Pseudo expansion:** Appends each pseudo-instruction's expansion and
//!    patches address-splitting immediates (`addr >> 16` / `addr & 0xFFFF`).
//! 4. **Label resolution:** Rewrites every remaining label operand to its
//!    numeric address; an unresolved reference aborts the load.
//! 5. **Sentinel:** Appends the terminate instruction after the program.
//! 6. **Arguments:** Lays out `argc`/`argv` below the stack top and seeds
//!    `$sp`, `$a0`, and `$a1`.

use std::collections::HashMap;

use tracing::debug;

use crate::common::constants::{REG_A0, REG_A1, REG_SP};
use crate::common::error::SimError;
use crate::common::reg::RegisterFile;
use crate::config::Config;
use crate::isa::instruction::{Instruction, Operand};
use crate::mem::Memory;
use crate::sim::program::Program;

/// Which half of a split address a patch writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Half {
    /// The upper sixteen bits (`addr >> 16`).
    Hi,
    /// The lower sixteen bits (`addr & 0xFFFF`).
    Lo,
}

/// One deferred immediate patch recorded while expanding a pseudo-instruction.
#[derive(Clone, Debug)]
struct Patch {
    slot: usize,
    label: String,
    half: Half,
}

/// The program loader.
///
/// One loader produces one freshly populated `(Memory, RegisterFile)` pair
/// per call; it keeps no state between loads.
#[derive(Clone, Debug)]
pub struct Loader {
    config: Config,
}

impl Loader {
    /// Creates a loader for the given machine configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Loads a program and its process arguments into a fresh machine.
    ///
    /// # Errors
    ///
    /// Any load-time failure (`NoMainLabel`, `UndefinedLabel`,
    /// `DuplicateLabel`, `BadAlignment`, out-of-bounds data) aborts the load.
    pub fn load(
        &self,
        program: &Program,
        args: &[String],
    ) -> Result<(Memory, RegisterFile), SimError> {
        let mut mem = Memory::new(&self.config.memory);
        let mut regs = RegisterFile::new();
        let mut patches = Vec::new();

        for node in &program.nodes {
            match node {
                Instruction::Declaration {
                    label, directive, ..
                } => {
                    let _ = mem.write_directive(label.as_deref(), directive)?;
                }
                Instruction::Label { name, .. } => {
                    mem.add_label(name, mem.text_ptr())?;
                }
                Instruction::Pseudo { op, expansion, .. } => {
                    expand_pseudo(&mut mem, op, expansion, &mut patches);
                }
                // The sentinel is loader-owned; a stray one in the input is
                // dropped rather than trusted.
                Instruction::Terminate => {}
                other => {
                    let _ = mem.add_text(other.clone());
                }
            }
        }

        let entry = mem.label("main").map_err(|_| SimError::NoMainLabel)?;

        apply_patches(&mut mem, &patches)?;
        resolve_labels(&mut mem)?;

        let _ = mem.add_text(Instruction::Terminate);

        self.layout_args(&mut mem, &mut regs, args)?;
        regs.set_pc(entry);

        debug!(
            entry = format_args!("{entry:#010x}"),
            text_words = mem.text_len(),
            data_top = format_args!("{:#010x}", mem.data_ptr()),
            args = args.len(),
            "program loaded"
        );
        Ok((mem, regs))
    }

    /// Lays out process arguments below the stack top.
    ///
    /// Strings are written downward in argument order, then the word-aligned
    /// `argv` pointer array; `$sp` lands one word below the array, `$a0`
    /// carries `argc` and `$a1` the array address.
    fn layout_args(
        &self,
        mem: &mut Memory,
        regs: &mut RegisterFile,
        args: &[String],
    ) -> Result<(), SimError> {
        let mut cursor = self.config.memory.stack_base;
        let mut pointers = Vec::with_capacity(args.len());

        for arg in args {
            cursor = cursor.wrapping_sub(arg.len() as u32 + 1);
            let _ = mem.add_ascii(cursor, arg, true)?;
            pointers.push(cursor);
        }

        cursor &= !3;
        cursor = cursor.wrapping_sub(4 * args.len() as u32);
        let argv = cursor;
        for (i, ptr) in pointers.iter().enumerate() {
            mem.add_word(argv + 4 * i as u32, *ptr)?;
        }

        regs.write(REG_SP as usize, argv.wrapping_sub(4));
        regs.write(REG_A0 as usize, args.len() as u32);
        regs.write(REG_A1 as usize, argv);
        Ok(())
    }
}

/// Returns true if the pseudo-instruction's expansion splits a label address
/// into high/low halfwords.
fn is_split_pseudo(op: &str) -> bool {
    matches!(
        op,
        "la" | "lw"
            | "lh"
            | "lhu"
            | "lb"
            | "lbu"
            | "sw"
            | "sh"
            | "sb"
            | "l.s"
            | "l.d"
            | "s.s"
            | "s.d"
            | "lwc1"
            | "ldc1"
            | "swc1"
            | "sdc1"
    )
}

/// Appends one pseudo-instruction's expansion to the text segment.
///
/// For address-splitting pseudos, the first expansion instruction carrying a
/// label reference (the `lui`) is recorded for a high-half patch and its
/// immediate successor for the low-half patch.
fn expand_pseudo(mem: &mut Memory, op: &str, expansion: &[Instruction], patches: &mut Vec<Patch>) {
    let first_slot = mem.text_len();
    for instr in expansion {
        let _ = mem.add_text(instr.clone());
    }

    if !is_split_pseudo(op) {
        return;
    }
    let Some((offset, label)) = expansion
        .iter()
        .enumerate()
        .find_map(|(i, instr)| label_ref(instr).map(|name| (i, name)))
    else {
        return;
    };
    if offset + 1 >= expansion.len() {
        return;
    }
    patches.push(Patch {
        slot: first_slot + offset,
        label: label.clone(),
        half: Half::Hi,
    });
    patches.push(Patch {
        slot: first_slot + offset + 1,
        label,
        half: Half::Lo,
    });
}

/// Returns the label referenced by an instruction's immediate field, if any.
fn label_ref(instr: &Instruction) -> Option<String> {
    match instr {
        Instruction::IType {
            imm: Operand::Label(name),
            ..
        }
        | Instruction::LoadMem {
            addr: Operand::Label(name),
            ..
        } => Some(name.clone()),
        _ => None,
    }
}

/// Writes one resolved half-address into an instruction's immediate field.
fn apply_half(instr: &mut Instruction, val: u32) {
    match instr {
        Instruction::IType { imm, .. } => *imm = Operand::Imm(i64::from(val)),
        Instruction::LoadMem { addr, .. } => match addr {
            Operand::Mem { offset, .. } => *offset = val as i32,
            other => *other = Operand::Imm(i64::from(val)),
        },
        _ => {}
    }
}

/// Second pass: resolves each recorded patch and writes the half values.
fn apply_patches(mem: &mut Memory, patches: &[Patch]) -> Result<(), SimError> {
    for patch in patches {
        let addr = mem.label(&patch.label)?;
        let val = match patch.half {
            Half::Hi => addr >> 16,
            Half::Lo => addr & 0xFFFF,
        };
        if let Some(instr) = mem.text_slots_mut().get_mut(patch.slot) {
            apply_half(instr, val);
        }
    }
    Ok(())
}

/// Rewrites every remaining label operand in the text segment to its bound
/// address; failure here is a load-time fatal error.
fn resolve_labels(mem: &mut Memory) -> Result<(), SimError> {
    let labels: HashMap<String, u32> = mem
        .labels()
        .map(|(name, addr)| (name.to_string(), addr))
        .collect();

    let resolve = |operand: &mut Operand| -> Result<(), SimError> {
        if let Operand::Label(name) = operand {
            let addr = labels
                .get(name.as_str())
                .copied()
                .ok_or_else(|| SimError::UndefinedLabel(name.clone()))?;
            *operand = Operand::Imm(i64::from(addr));
        }
        Ok(())
    };

    for instr in mem.text_slots_mut() {
        match instr {
            Instruction::IType { imm: operand, .. }
            | Instruction::JType {
                target: operand, ..
            }
            | Instruction::Branch {
                target: operand, ..
            }
            | Instruction::BranchFloat {
                target: operand, ..
            }
            | Instruction::LoadMem { addr: operand, .. }
            | Instruction::MoveCond { cond: operand, .. } => resolve(operand)?,
            Instruction::Move { dst, src, .. } => {
                resolve(dst)?;
                resolve(src)?;
            }
            _ => {}
        }
    }
    Ok(())
}
