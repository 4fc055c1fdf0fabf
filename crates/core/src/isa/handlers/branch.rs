//! Control-transfer handlers.
//!
//! Branch and jump semantics for the built-in table. Targets arrive as
//! absolute addresses (labels are resolved at load time), so taking a branch
//! is a plain `pc` write. The engine has already advanced `pc` past the
//! instruction, which is exactly the link value `jal`/`jalr` must record.

use crate::common::constants::REG_RA;
use crate::common::error::SimError;

use super::{DispatchCtx, HandlerTable, Operands};

pub(super) fn register(table: &mut HandlerTable) {
    table.register("beq", beq);
    table.register("bne", bne);
    table.register("bgez", bgez);
    table.register("bgtz", bgtz);
    table.register("blez", blez);
    table.register("bltz", bltz);
    table.register("j", jump);
    table.register("jr", jump);
    table.register("jal", jal);
    table.register("jalr", jalr);
    table.register("bc1t", bc1);
    table.register("bc1f", bc1);
}

fn take_if(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    target_idx: usize,
    taken: bool,
) -> Result<(), SimError> {
    if taken {
        let target = ops.src_value(ctx, target_idx)?;
        ctx.regs.set_pc(target);
    }
    Ok(())
}

fn beq(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let taken = ops.src_value(ctx, 0)? == ops.src_value(ctx, 1)?;
    take_if(ctx, ops, 2, taken)
}

fn bne(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let taken = ops.src_value(ctx, 0)? != ops.src_value(ctx, 1)?;
    take_if(ctx, ops, 2, taken)
}

fn bgez(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let taken = (ops.src_value(ctx, 0)? as i32) >= 0;
    take_if(ctx, ops, 2, taken)
}

fn bgtz(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let taken = (ops.src_value(ctx, 0)? as i32) > 0;
    take_if(ctx, ops, 2, taken)
}

fn blez(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let taken = (ops.src_value(ctx, 0)? as i32) <= 0;
    take_if(ctx, ops, 2, taken)
}

fn bltz(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let taken = (ops.src_value(ctx, 0)? as i32) < 0;
    take_if(ctx, ops, 2, taken)
}

fn jump(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let target = ops.src_value(ctx, 0)?;
    ctx.regs.set_pc(target);
    Ok(())
}

fn jal(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let target = ops.src_value(ctx, 0)?;
    let link = ctx.regs.pc();
    ctx.regs.write(REG_RA as usize, link);
    ctx.regs.set_pc(target);
    Ok(())
}

fn jalr(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let target = ops.src_value(ctx, 0)?;
    let link = ctx.regs.pc();
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, link);
    ctx.regs.set_pc(target);
    Ok(())
}

fn bc1(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let flag = ops.src_flag(ctx, 0)?;
    let want = ctx.op.ends_with('t');
    let taken = ctx.regs.flag(flag) == want;
    take_if(ctx, ops, 1, taken)
}
