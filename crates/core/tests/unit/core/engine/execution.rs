//! # Execution Loop Tests
//!
//! Tests for the step algorithm: sentinel halting, the instruction ceiling,
//! pc-advance semantics, dispatch, hooks, and cancellation.

use mipsim_core::common::SimError;
use mipsim_core::config::Config;
use mipsim_core::core::{EngineState, ExecutionEngine, StepOutcome};
use mipsim_core::isa::instruction::{Instruction, Operand, SourceLoc};

use crate::common::builder::*;
use crate::common::harness::TestContext;

const TEXT_BASE: u32 = 0x0040_0000;

#[test]
fn test_end_to_end_addi_then_exit() {
    let mut nodes = vec![label("main"), itype("addi", 1, 0, 5)];
    nodes.extend(exit_seq());
    let mut ctx = TestContext::with_nodes(nodes);

    ctx.engine.run().unwrap();

    assert_eq!(ctx.engine.state(), EngineState::Halted);
    assert_eq!(ctx.get_reg(1), 5);
    assert_eq!(ctx.engine.stats().syscalls, 1);
}

#[test]
fn test_fallthrough_halts_via_sentinel() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), itype("addi", 1, 0, 5)]);

    assert_eq!(ctx.engine.step().unwrap(), StepOutcome::Continued);
    assert_eq!(ctx.engine.step().unwrap(), StepOutcome::Halted);
    assert_eq!(ctx.engine.state(), EngineState::Halted);
    assert!(matches!(ctx.engine.peek(), Some(Instruction::Terminate)));
}

#[test]
fn test_jump_to_self_hits_instruction_ceiling() {
    let mut config = Config::default();
    config.execution.max_instructions = 50;
    let mut ctx = TestContext::with_config(vec![label("main"), jtype("j", "main")], &config);

    let err = ctx.engine.run().unwrap_err();
    assert_eq!(err, SimError::InstrCountExceeded(50));
    assert_eq!(ctx.engine.state(), EngineState::Faulted);
    assert_eq!(ctx.engine.executed(), 50);
}

#[test]
fn test_unknown_mnemonic_faults() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), rtype("frobnicate", 1, 2, 3)]);
    let err = ctx.engine.step().unwrap_err();
    assert_eq!(err, SimError::UnknownInstruction("frobnicate".to_string()));
    assert_eq!(ctx.engine.state(), EngineState::Faulted);
}

#[test]
fn test_pc_out_of_text_faults() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), itype("addi", 1, 0, 1)]);
    ctx.engine.regs_mut().set_pc(0x0060_0000);
    let err = ctx.engine.step().unwrap_err();
    assert_eq!(err, SimError::MemoryOutOfBounds(0x0060_0000));
}

#[test]
fn test_pc_advances_before_dispatch_jal_links_next() {
    let nodes = vec![
        label("main"),
        jtype("jal", "func"),
        itype("addi", 8, 0, 1),
        label("func"),
        itype("addi", 9, 0, 2),
    ];
    let mut ctx = TestContext::with_nodes(nodes);

    assert_eq!(ctx.engine.step().unwrap(), StepOutcome::Continued);
    // The link register holds the address of the instruction after the jal.
    assert_eq!(ctx.get_reg(31), TEXT_BASE + 4);
    assert_eq!(ctx.engine.regs().pc(), TEXT_BASE + 8);
}

#[test]
fn test_branch_taken_and_not_taken() {
    let nodes = vec![
        label("main"),
        branch("beq", 8, 9, "skip"),
        itype("addi", 10, 0, 1),
        label("skip"),
        itype("addi", 11, 0, 2),
    ];

    // Not taken: $t0 != $t1.
    let mut ctx = TestContext::with_nodes(nodes.clone());
    ctx.set_reg(8, 1);
    ctx.engine.run().unwrap();
    assert_eq!(ctx.get_reg(10), 1);
    assert_eq!(ctx.get_reg(11), 2);

    // Taken: both zero, so the addi to $t2 is skipped.
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.engine.run().unwrap();
    assert_eq!(ctx.get_reg(10), 0);
    assert_eq!(ctx.get_reg(11), 2);
}

#[test]
fn test_immediate_wraps_to_32_bits() {
    let mut ctx = TestContext::with_nodes(vec![
        label("main"),
        itype("addi", 1, 0, 0x1_0000_0007),
    ]);
    ctx.run_steps(1);
    assert_eq!(ctx.get_reg(1), 7);
}

#[test]
fn test_unsigned_suffix_is_normalized() {
    // sltu: 1 < 0xFFFF_FFFF unsigned, but not signed (-1).
    let mut ctx = TestContext::with_nodes(vec![
        label("main"),
        rtype("slt", 10, 8, 9),
        rtype("sltu", 11, 8, 9),
    ]);
    ctx.set_reg(8, 1);
    ctx.set_reg(9, 0xFFFF_FFFF);
    ctx.run_steps(2);
    assert_eq!(ctx.get_reg(10), 0);
    assert_eq!(ctx.get_reg(11), 1);
}

#[test]
fn test_float_arithmetic_single_precision() {
    let nodes = vec![
        label("main"),
        rtype("add.s", 2, 4, 6),
        rtype("mul.s", 8, 4, 6),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.engine.regs_mut().write_f(4, 1.5f32.to_bits());
    ctx.engine.regs_mut().write_f(6, 2.25f32.to_bits());
    ctx.run_steps(2);
    assert_eq!(f32::from_bits(ctx.engine.regs().read_f(2)), 3.75);
    assert_eq!(f32::from_bits(ctx.engine.regs().read_f(8)), 3.375);
}

#[test]
fn test_float_arithmetic_double_precision() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), rtype("add.d", 2, 4, 6)]);
    ctx.engine.regs_mut().write_d(4, 1.5f64.to_bits()).unwrap();
    ctx.engine.regs_mut().write_d(6, 2.25f64.to_bits()).unwrap();
    ctx.run_steps(1);
    assert_eq!(
        f64::from_bits(ctx.engine.regs().read_d(2).unwrap()),
        3.75
    );
}

#[test]
fn test_float_arithmetic_at_odd_double_register_faults() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), rtype("add.d", 3, 4, 6)]);
    let err = ctx.engine.step().unwrap_err();
    assert_eq!(err, SimError::InvalidRegister("$f3".to_string()));
}

#[test]
fn test_jalr_links_and_jumps_through_register() {
    let nodes = vec![
        label("main"),
        jalr(10, 8),
        itype("addi", 9, 0, 1),
        itype("addi", 11, 0, 2),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.set_reg(8, TEXT_BASE + 8);

    assert_eq!(ctx.engine.step().unwrap(), StepOutcome::Continued);
    assert_eq!(ctx.get_reg(10), TEXT_BASE + 4);
    assert_eq!(ctx.engine.regs().pc(), TEXT_BASE + 8);

    ctx.run_steps(1);
    assert_eq!(ctx.get_reg(11), 2);
    assert_eq!(ctx.get_reg(9), 0);
}

#[test]
fn test_mult_writes_hi_lo_and_moves_read_them() {
    let nodes = vec![
        label("main"),
        rtype("mult", 0, 8, 9),
        Instruction::Move {
            op: "mfhi".to_string(),
            dst: Operand::Reg(10),
            src: Operand::default(),
            loc: SourceLoc::default(),
        },
        Instruction::Move {
            op: "mflo".to_string(),
            dst: Operand::Reg(11),
            src: Operand::default(),
            loc: SourceLoc::default(),
        },
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.set_reg(8, 0x1_0000);
    ctx.set_reg(9, 0x1_0000);
    ctx.run_steps(3);
    assert_eq!(ctx.get_reg(10), 1);
    assert_eq!(ctx.get_reg(11), 0);
}

#[test]
fn test_divide_by_zero_faults() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), rtype("div", 0, 8, 9)]);
    ctx.set_reg(8, 10);
    let err = ctx.engine.step().unwrap_err();
    assert_eq!(err, SimError::DivideByZero);
}

#[test]
fn test_store_then_load_through_stack_pointer() {
    let nodes = vec![
        label("main"),
        loadmem("sw", 8, 29, 0),
        loadmem("lw", 9, 29, 0),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.set_reg(8, 0xCAFE_F00D);
    ctx.run_steps(2);
    assert_eq!(ctx.get_reg(9), 0xCAFE_F00D);
    assert_eq!(ctx.engine.stats().stores, 1);
    assert_eq!(ctx.engine.stats().loads, 1);
}

#[test]
fn test_breakpoint_instruction_yields_breakpoint_outcome() {
    let nodes = vec![
        label("main"),
        breakpoint_at("demo.s", 1),
        itype("addi", 1, 0, 9),
    ];
    let mut ctx = TestContext::with_nodes(nodes);

    assert_eq!(ctx.engine.step().unwrap(), StepOutcome::Breakpoint);
    // pc already advanced past the breakpoint; execution resumes normally.
    assert_eq!(ctx.engine.step().unwrap(), StepOutcome::Continued);
    assert_eq!(ctx.get_reg(1), 9);
}

#[test]
fn test_cancellation_checked_at_step_boundary() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), jtype("j", "main")]);
    let token = ctx.engine.cancel_token();
    token.cancel();

    ctx.engine.run().unwrap();
    assert_eq!(ctx.engine.executed(), 0);
    assert_eq!(ctx.engine.state(), EngineState::Running);
}

fn poke_hook(engine: &mut ExecutionEngine, _instr: &Instruction) {
    engine.regs_mut().write(20, 7);
}

#[test]
fn test_pre_hook_runs_before_dispatch() {
    let mut ctx = TestContext::with_nodes(vec![label("main"), itype("addi", 1, 0, 5)]);
    ctx.engine.hooks_mut().add_pre("addi", poke_hook);
    ctx.run_steps(1);
    assert_eq!(ctx.get_reg(20), 7);
    assert_eq!(ctx.get_reg(1), 5);
}

#[test]
fn test_handler_table_is_pluggable() {
    fn forty_two(
        ctx: &mut mipsim_core::isa::DispatchCtx<'_>,
        ops: &mipsim_core::isa::Operands<'_>,
    ) -> Result<(), SimError> {
        let rd = ops.dst_reg(ctx, 0)?;
        ctx.regs.write(rd, 42);
        Ok(())
    }

    let mut ctx = TestContext::with_nodes(vec![label("main"), rtype("answer", 13, 0, 0)]);
    ctx.engine.handlers_mut().register("answer", forty_two);
    ctx.run_steps(1);
    assert_eq!(ctx.get_reg(13), 42);
}
