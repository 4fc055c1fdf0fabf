//! Integer ALU handlers.
//!
//! Arithmetic, logic, shift, and multiply/divide semantics for the built-in
//! table. All word arithmetic wraps; overflow trapping is not modeled.

use crate::common::error::SimError;

use super::{DispatchCtx, HandlerTable, Operands};

pub(super) fn register(table: &mut HandlerTable) {
    table.register("add", add);
    table.register("addi", add);
    table.register("sub", sub);
    table.register("and", and);
    table.register("andi", and);
    table.register("or", or);
    table.register("ori", or);
    table.register("xor", xor);
    table.register("xori", xor);
    table.register("nor", nor);
    table.register("slt", slt);
    table.register("slti", slt);
    table.register("sll", sll);
    table.register("sllv", sll);
    table.register("srl", srl);
    table.register("srlv", srl);
    table.register("sra", sra);
    table.register("srav", sra);
    table.register("lui", lui);
    table.register("mult", mult);
    table.register("div", div);
    table.register("madd", madd);
    table.register("msub", msub);
}

fn binary(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    f: impl Fn(u32, u32) -> u32,
) -> Result<(), SimError> {
    let a = ops.src_value(ctx, 0)?;
    let b = ops.src_value(ctx, 1)?;
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, f(a, b));
    Ok(())
}

fn add(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, u32::wrapping_add)
}

fn sub(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, u32::wrapping_sub)
}

fn and(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a & b)
}

fn or(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a | b)
}

fn xor(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a ^ b)
}

fn nor(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| !(a | b))
}

fn slt(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let signed = ctx.signed;
    binary(ctx, ops, |a, b| {
        let lt = if signed { (a as i32) < (b as i32) } else { a < b };
        u32::from(lt)
    })
}

fn sll(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a << (b & 31))
}

fn srl(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a >> (b & 31))
}

fn sra(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| ((a as i32) >> (b & 31)) as u32)
}

fn lui(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let imm = ops.src_value(ctx, 1)?;
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, imm << 16);
    Ok(())
}

fn product(ctx: &DispatchCtx<'_>, a: u32, b: u32) -> u64 {
    if ctx.signed {
        (i64::from(a as i32)).wrapping_mul(i64::from(b as i32)) as u64
    } else {
        u64::from(a).wrapping_mul(u64::from(b))
    }
}

fn mult(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let a = ops.src_value(ctx, 0)?;
    let b = ops.src_value(ctx, 1)?;
    let p = product(ctx, a, b);
    ctx.regs.set_hi_lo((p >> 32) as u32, p as u32);
    Ok(())
}

fn div(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let a = ops.src_value(ctx, 0)?;
    let b = ops.src_value(ctx, 1)?;
    if b == 0 {
        return Err(SimError::DivideByZero);
    }
    let (quotient, remainder) = if ctx.signed {
        (
            (a as i32).wrapping_div(b as i32) as u32,
            (a as i32).wrapping_rem(b as i32) as u32,
        )
    } else {
        (a / b, a % b)
    };
    ctx.regs.set_hi_lo(remainder, quotient);
    Ok(())
}

fn accumulate(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>, subtract: bool) -> Result<(), SimError> {
    let a = ops.src_value(ctx, 0)?;
    let b = ops.src_value(ctx, 1)?;
    let (hi, lo) = ctx.regs.hi_lo();
    let acc = u64::from(hi) << 32 | u64::from(lo);
    let p = product(ctx, a, b);
    let result = if subtract {
        acc.wrapping_sub(p)
    } else {
        acc.wrapping_add(p)
    };
    ctx.regs.set_hi_lo((result >> 32) as u32, result as u32);
    Ok(())
}

fn madd(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    accumulate(ctx, ops, false)
}

fn msub(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    accumulate(ctx, ops, true)
}
