//! Move handlers.
//!
//! Special-register moves (`hi`/`lo`), cross-file moves between the general
//! and floating-point files, and the conditional move family.

use crate::common::error::SimError;
use crate::isa::instruction::Operand;

use super::{DispatchCtx, HandlerTable, Operands};

pub(super) fn register(table: &mut HandlerTable) {
    table.register("mfhi", mfhi);
    table.register("mflo", mflo);
    table.register("mthi", mthi);
    table.register("mtlo", mtlo);
    table.register("mfc1", mfc1);
    table.register("mtc1", mtc1);
    table.register("movz", movz);
    table.register("movn", movn);
    table.register("movt", movt);
    table.register("movf", movf);
}

fn mfhi(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let (hi, _) = ctx.regs.hi_lo();
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, hi);
    Ok(())
}

fn mflo(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let (_, lo) = ctx.regs.hi_lo();
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, lo);
    Ok(())
}

fn mthi(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let val = ops.src_value(ctx, 0)?;
    let (_, lo) = ctx.regs.hi_lo();
    ctx.regs.set_hi_lo(val, lo);
    Ok(())
}

fn mtlo(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let val = ops.src_value(ctx, 0)?;
    let (hi, _) = ctx.regs.hi_lo();
    ctx.regs.set_hi_lo(hi, val);
    Ok(())
}

fn mfc1(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let bits = ctx.regs.read_f(ops.src_freg(ctx, 0)?);
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, bits);
    Ok(())
}

fn mtc1(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let bits = ops.src_value(ctx, 0)?;
    let fd = ops.dst_freg(ctx, 0)?;
    ctx.regs.write_f(fd, bits);
    Ok(())
}

fn move_if(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    condition: bool,
) -> Result<(), SimError> {
    if condition {
        let val = ops.src_value(ctx, 0)?;
        let rd = ops.dst_reg(ctx, 0)?;
        ctx.regs.write(rd, val);
    }
    Ok(())
}

fn movz(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let cond = ops.src_value(ctx, 1)? == 0;
    move_if(ctx, ops, cond)
}

fn movn(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let cond = ops.src_value(ctx, 1)? != 0;
    move_if(ctx, ops, cond)
}

fn cond_flag(ctx: &DispatchCtx<'_>, ops: &Operands<'_>) -> Result<bool, SimError> {
    match ops.src(ctx, 1)? {
        Operand::Flag(_) => Ok(ctx.regs.flag(ops.src_flag(ctx, 1)?)),
        _ => Err(SimError::MalformedOperands(ctx.op.to_string())),
    }
}

fn movt(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let cond = cond_flag(ctx, ops)?;
    move_if(ctx, ops, cond)
}

fn movf(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let cond = !cond_flag(ctx, ops)?;
    move_if(ctx, ops, cond)
}
