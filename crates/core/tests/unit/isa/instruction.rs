//! # Instruction Model Tests
//!
//! Tests for mnemonic normalization, load/store classification, and the
//! assembly-style display used by the debugger.

use mipsim_core::isa::instruction::{
    is_float_mem, is_float_op, is_store, mem_width, normalize, writes_hi_lo, MemWidth,
};
use rstest::rstest;

use crate::common::builder::*;

#[rstest]
#[case("add", "add", true, false)]
#[case("addu", "add", false, false)]
#[case("sltu", "slt", false, false)]
#[case("lbu", "lb", false, false)]
#[case("lhu", "lh", false, false)]
#[case("divu", "div", false, false)]
#[case("add.s", "add.s", true, false)]
#[case("add.d", "add.s", true, true)]
#[case("c.eq.d", "c.eq.s", true, true)]
#[case("mov.d", "mov.s", true, true)]
#[case("l.d", "l.s", true, true)]
#[case("lui", "lui", true, false)]
#[case("jalr", "jalr", true, false)]
fn test_normalize(
    #[case] op: &str,
    #[case] base: &str,
    #[case] signed: bool,
    #[case] double: bool,
) {
    assert_eq!(normalize(op), (base.to_string(), signed, double));
}

#[test]
fn test_store_classification() {
    for op in ["sw", "sh", "sb", "s.s", "s.d", "swc1", "sdc1"] {
        assert!(is_store(op), "{op} is a store");
    }
    for op in ["lw", "lh", "lb", "l.s", "l.d", "lwc1", "ldc1"] {
        assert!(!is_store(op), "{op} is a load");
    }
}

#[test]
fn test_float_mem_classification() {
    for op in ["l.s", "s.d", "lwc1", "sdc1"] {
        assert!(is_float_mem(op), "{op} targets the float file");
    }
    for op in ["lw", "sb", "lhu"] {
        assert!(!is_float_mem(op), "{op} targets the integer file");
    }
}

#[rstest]
#[case("lb", MemWidth::Byte)]
#[case("lbu", MemWidth::Byte)]
#[case("sh", MemWidth::Half)]
#[case("lw", MemWidth::Word)]
#[case("swc1", MemWidth::Word)]
#[case("l.d", MemWidth::Double)]
#[case("sdc1", MemWidth::Double)]
fn test_mem_width(#[case] op: &str, #[case] width: MemWidth) {
    assert_eq!(mem_width(op), width);
}

#[test]
fn test_float_op_classification() {
    for op in ["add.s", "div.d", "c.lt.s", "mov.d"] {
        assert!(is_float_op(op), "{op} targets the float file");
    }
    for op in ["add", "divu", "jalr", "syscall"] {
        assert!(!is_float_op(op), "{op} targets the general file");
    }
}

#[test]
fn test_hi_lo_family() {
    for op in ["mult", "multu", "div", "divu", "madd", "msub", "mthi", "mtlo"] {
        assert!(writes_hi_lo(op), "{op} writes hi/lo");
    }
    for op in ["add", "mfhi", "mflo", "jal"] {
        assert!(!writes_hi_lo(op), "{op} does not write hi/lo");
    }
}

#[test]
fn test_display_uses_register_names() {
    assert_eq!(rtype("add", 8, 9, 10).to_string(), "add $t0, $t1, $t2");
    assert_eq!(itype("addi", 2, 0, 5).to_string(), "addi $v0, $zero, 5");
    assert_eq!(loadmem("lw", 8, 29, -4).to_string(), "lw $t0, -4($sp)");
    assert_eq!(syscall().to_string(), "syscall");
    assert_eq!(label("main").to_string(), "main:");
}

#[test]
fn test_display_of_branch_with_label_target() {
    assert_eq!(branch("bne", 8, 0, "loop").to_string(), "bne $t0, $zero, loop");
}

#[test]
fn test_display_of_float_arithmetic_uses_float_names() {
    assert_eq!(rtype("add.s", 2, 4, 6).to_string(), "add.s $f2, $f4, $f6");
}

#[test]
fn test_display_of_jalr_includes_link_register() {
    assert_eq!(jalr(10, 8).to_string(), "jalr $t2, $t0");
}
