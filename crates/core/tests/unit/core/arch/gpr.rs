//! # General-Purpose Register Tests
//!
//! Tests for the general-purpose register file implementation.

use mipsim_core::core::arch::gpr::Gpr;

#[test]
fn test_gpr_new_initializes_to_zero() {
    let gpr = Gpr::new();
    for i in 0..32 {
        assert_eq!(gpr.read(i), 0);
    }
}

#[test]
fn test_gpr_zero_register_ignores_writes() {
    let mut gpr = Gpr::new();
    for value in [1u32, 0xFFFF_FFFF, 0x8000_0000] {
        gpr.write(0, value);
        assert_eq!(gpr.read(0), 0);
    }
}

#[test]
fn test_gpr_read_write_roundtrip() {
    let mut gpr = Gpr::new();
    for i in 1..32 {
        let value = (i as u32) << 16 | (i as u32);
        gpr.write(i, value);
        assert_eq!(gpr.read(i), value);
    }
}

#[test]
fn test_gpr_register_independence() {
    let mut gpr = Gpr::new();
    gpr.write(1, 111);
    gpr.write(2, 222);
    gpr.write(3, 333);

    assert_eq!(gpr.read(1), 111);
    assert_eq!(gpr.read(2), 222);
    assert_eq!(gpr.read(3), 333);
}

#[test]
fn test_gpr_overwrite_same_register() {
    let mut gpr = Gpr::new();
    gpr.write(5, 100);
    gpr.write(5, 200);
    assert_eq!(gpr.read(5), 200);
}

#[test]
fn test_gpr_zero_after_other_writes() {
    let mut gpr = Gpr::new();
    for i in 1..32 {
        gpr.write(i, 0x1111_1111);
    }
    assert_eq!(gpr.read(0), 0);
}

#[test]
fn test_gpr_dump_does_not_panic() {
    let mut gpr = Gpr::new();
    gpr.write(1, 0x1234_5678);
    gpr.write(31, 0xFFFF_FFFF);
    gpr.dump();
}
