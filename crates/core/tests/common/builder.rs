//! Program-node builders.
//!
//! Free functions that keep test programs close to the assembly they model.

use mipsim_core::common::constants::REG_AT;
use mipsim_core::isa::instruction::{DataDirective, Instruction, Operand, SourceLoc};

/// A text label.
pub fn label(name: &str) -> Instruction {
    Instruction::Label {
        name: name.to_string(),
        loc: SourceLoc::default(),
    }
}

/// A three-register operation.
pub fn rtype(op: &str, rd: u8, rs: u8, rt: u8) -> Instruction {
    Instruction::RType {
        op: op.to_string(),
        rd,
        rs,
        rt,
        loc: SourceLoc::default(),
    }
}

/// A register-immediate operation.
pub fn itype(op: &str, rt: u8, rs: u8, imm: i64) -> Instruction {
    Instruction::IType {
        op: op.to_string(),
        rt,
        rs,
        imm: Operand::Imm(imm),
        loc: SourceLoc::default(),
    }
}

/// A register-immediate operation carrying a source tag.
pub fn itype_at(op: &str, rt: u8, rs: u8, imm: i64, file: &str, line: u32) -> Instruction {
    Instruction::IType {
        op: op.to_string(),
        rt,
        rs,
        imm: Operand::Imm(imm),
        loc: SourceLoc::new(file, line),
    }
}

/// A jump to a label.
pub fn jtype(op: &str, target: &str) -> Instruction {
    Instruction::JType {
        op: op.to_string(),
        target: Operand::Label(target.to_string()),
        rd: None,
        loc: SourceLoc::default(),
    }
}

/// A register jump-and-link (`jalr $rd, $rs`).
pub fn jalr(rd: u8, rs: u8) -> Instruction {
    Instruction::JType {
        op: "jalr".to_string(),
        target: Operand::Reg(rs),
        rd: Some(rd),
        loc: SourceLoc::default(),
    }
}

/// A conditional branch to a label.
pub fn branch(op: &str, rs: u8, rt: u8, target: &str) -> Instruction {
    Instruction::Branch {
        op: op.to_string(),
        rs,
        rt,
        target: Operand::Label(target.to_string()),
        loc: SourceLoc::default(),
    }
}

/// A base+offset load or store.
pub fn loadmem(op: &str, reg: u8, base: u8, offset: i32) -> Instruction {
    Instruction::LoadMem {
        op: op.to_string(),
        reg,
        addr: Operand::Mem { base, offset },
        loc: SourceLoc::default(),
    }
}

/// A bare syscall.
pub fn syscall() -> Instruction {
    Instruction::Syscall {
        loc: SourceLoc::default(),
    }
}

/// A breakpoint instruction carrying a source tag.
pub fn breakpoint_at(file: &str, line: u32) -> Instruction {
    Instruction::Breakpoint {
        loc: SourceLoc::new(file, line),
    }
}

/// A labeled data declaration.
pub fn decl(label: &str, directive: DataDirective) -> Instruction {
    Instruction::Declaration {
        label: Some(label.to_string()),
        directive,
        loc: SourceLoc::default(),
    }
}

/// An unlabeled data declaration.
pub fn decl_anon(directive: DataDirective) -> Instruction {
    Instruction::Declaration {
        label: None,
        directive,
        loc: SourceLoc::default(),
    }
}

/// The `la rd, label` pseudo-instruction with its two-word expansion.
pub fn la(rd: u8, target: &str) -> Instruction {
    Instruction::Pseudo {
        op: "la".to_string(),
        expansion: vec![
            Instruction::IType {
                op: "lui".to_string(),
                rt: REG_AT,
                rs: 0,
                imm: Operand::Label(target.to_string()),
                loc: SourceLoc::default(),
            },
            Instruction::IType {
                op: "ori".to_string(),
                rt: rd,
                rs: REG_AT,
                imm: Operand::Label(target.to_string()),
                loc: SourceLoc::default(),
            },
        ],
        loc: SourceLoc::default(),
    }
}

/// A label-addressed `lw`/`sw`-family pseudo-instruction: `lui $at` plus the
/// actual transfer through `$at`.
pub fn mem_pseudo(op: &str, reg: u8, target: &str) -> Instruction {
    Instruction::Pseudo {
        op: op.to_string(),
        expansion: vec![
            Instruction::IType {
                op: "lui".to_string(),
                rt: REG_AT,
                rs: 0,
                imm: Operand::Label(target.to_string()),
                loc: SourceLoc::default(),
            },
            Instruction::LoadMem {
                op: op.to_string(),
                reg,
                addr: Operand::Mem {
                    base: REG_AT,
                    offset: 0,
                },
                loc: SourceLoc::default(),
            },
        ],
        loc: SourceLoc::default(),
    }
}

/// The exit-syscall tail: `$v0 <- 10; syscall`.
pub fn exit_seq() -> Vec<Instruction> {
    vec![itype("addi", 2, 0, 10), syscall()]
}
