//! # Error Display Tests
//!
//! Unit tests for the error taxonomy's display strings, which surface
//! directly in the debugger REPL and CLI output.

use mipsim_core::common::SimError;

#[test]
fn test_memory_out_of_bounds_display() {
    let e = SimError::MemoryOutOfBounds(0x1001_0040);
    assert_eq!(e.to_string(), "memory access out of bounds at 0x10010040");
}

#[test]
fn test_undefined_label_display() {
    let e = SimError::UndefinedLabel("loop".to_string());
    assert_eq!(e.to_string(), "undefined label `loop`");
}

#[test]
fn test_duplicate_label_display() {
    let e = SimError::DuplicateLabel("main".to_string());
    assert_eq!(e.to_string(), "duplicate label `main`");
}

#[test]
fn test_no_main_label_display() {
    assert_eq!(SimError::NoMainLabel.to_string(), "program has no `main` label");
}

#[test]
fn test_invalid_register_display() {
    let e = SimError::InvalidRegister("$f31".to_string());
    assert_eq!(e.to_string(), "invalid register `$f31`");
}

#[test]
fn test_bad_alignment_display() {
    assert_eq!(
        SimError::BadAlignment(3).to_string(),
        "invalid alignment boundary 3"
    );
}

#[test]
fn test_invalid_syscall_display() {
    assert_eq!(
        SimError::InvalidSyscall(99).to_string(),
        "invalid or disabled syscall code 99"
    );
}

#[test]
fn test_instr_count_exceeded_display() {
    let e = SimError::InstrCountExceeded(10_000_000);
    assert!(e.to_string().contains("10000000"));
}

#[test]
fn test_unknown_instruction_display() {
    let e = SimError::UnknownInstruction("frobnicate".to_string());
    assert_eq!(e.to_string(), "unknown instruction `frobnicate`");
}

#[test]
fn test_divide_by_zero_display() {
    assert_eq!(SimError::DivideByZero.to_string(), "division by zero");
}

#[test]
fn test_errors_are_comparable() {
    assert_eq!(
        SimError::MemoryOutOfBounds(4),
        SimError::MemoryOutOfBounds(4)
    );
    assert_ne!(SimError::NoMainLabel, SimError::DivideByZero);
}
