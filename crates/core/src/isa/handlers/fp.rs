//! Floating-point handlers.
//!
//! Arithmetic, compare, and convert semantics for coprocessor-1 mnemonics.
//! Three-register arithmetic arrives through the same instruction variant as
//! the integer ALU, with the dispatcher building float-file operands for
//! `.s`/`.d` mnemonics. Single- and double-precision variants share one
//! entry: the dispatcher normalizes a trailing `.d` onto the `.s` mnemonic
//! and sets the `double` flag, so each handler branches once on precision.
//! Convert mnemonics name both formats explicitly and are registered (and
//! dispatched) unnormalized.

use crate::common::error::SimError;

use super::{DispatchCtx, HandlerTable, Operands};

pub(super) fn register(table: &mut HandlerTable) {
    table.register("add.s", add);
    table.register("sub.s", sub);
    table.register("mul.s", mul);
    table.register("div.s", div);
    table.register("abs.s", abs);
    table.register("neg.s", neg);
    table.register("sqrt.s", sqrt);
    table.register("mov.s", mov);
    table.register("c.eq.s", c_eq);
    table.register("c.lt.s", c_lt);
    table.register("c.le.s", c_le);
    table.register("cvt.s.w", cvt_s_w);
    table.register("cvt.w.s", cvt_w_s);
    table.register("cvt.d.w", cvt_d_w);
    table.register("cvt.w.d", cvt_w_d);
    table.register("cvt.d.s", cvt_d_s);
    table.register("cvt.s.d", cvt_s_d);
}

fn src_single(ctx: &DispatchCtx<'_>, ops: &Operands<'_>, i: usize) -> Result<f32, SimError> {
    Ok(f32::from_bits(ctx.regs.read_f(ops.src_freg(ctx, i)?)))
}

fn src_double(ctx: &DispatchCtx<'_>, ops: &Operands<'_>, i: usize) -> Result<f64, SimError> {
    Ok(f64::from_bits(ctx.regs.read_d(ops.src_freg(ctx, i)?)?))
}

fn write_single(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    val: f32,
) -> Result<(), SimError> {
    let fd = ops.dst_freg(ctx, 0)?;
    ctx.regs.write_f(fd, val.to_bits());
    Ok(())
}

fn write_double(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    val: f64,
) -> Result<(), SimError> {
    let fd = ops.dst_freg(ctx, 0)?;
    ctx.regs.write_d(fd, val.to_bits())
}

fn binary(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    single: impl Fn(f32, f32) -> f32,
    double: impl Fn(f64, f64) -> f64,
) -> Result<(), SimError> {
    if ctx.double {
        let result = double(src_double(ctx, ops, 0)?, src_double(ctx, ops, 1)?);
        write_double(ctx, ops, result)
    } else {
        let result = single(src_single(ctx, ops, 0)?, src_single(ctx, ops, 1)?);
        write_single(ctx, ops, result)
    }
}

fn unary(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    single: impl Fn(f32) -> f32,
    double: impl Fn(f64) -> f64,
) -> Result<(), SimError> {
    if ctx.double {
        let result = double(src_double(ctx, ops, 0)?);
        write_double(ctx, ops, result)
    } else {
        let result = single(src_single(ctx, ops, 0)?);
        write_single(ctx, ops, result)
    }
}

fn compare(
    ctx: &mut DispatchCtx<'_>,
    ops: &Operands<'_>,
    single: impl Fn(f32, f32) -> bool,
    double: impl Fn(f64, f64) -> bool,
) -> Result<(), SimError> {
    let result = if ctx.double {
        double(src_double(ctx, ops, 0)?, src_double(ctx, ops, 1)?)
    } else {
        single(src_single(ctx, ops, 0)?, src_single(ctx, ops, 1)?)
    };
    let flag = ops.dst_flag(ctx, 0)?;
    ctx.regs.set_flag(flag, result);
    Ok(())
}

fn add(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a + b, |a, b| a + b)
}

fn sub(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a - b, |a, b| a - b)
}

fn mul(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    binary(ctx, ops, |a, b| a * b, |a, b| a * b)
}

fn div(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    // IEEE semantics: dividing by zero yields an infinity, not a fault.
    binary(ctx, ops, |a, b| a / b, |a, b| a / b)
}

fn abs(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    unary(ctx, ops, f32::abs, f64::abs)
}

fn neg(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    unary(ctx, ops, |a| -a, |a| -a)
}

fn sqrt(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    unary(ctx, ops, f32::sqrt, f64::sqrt)
}

fn mov(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    unary(ctx, ops, |a| a, |a| a)
}

fn c_eq(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    compare(ctx, ops, |a, b| a == b, |a, b| a == b)
}

fn c_lt(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    compare(ctx, ops, |a, b| a < b, |a, b| a < b)
}

fn c_le(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    compare(ctx, ops, |a, b| a <= b, |a, b| a <= b)
}

fn cvt_s_w(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let raw = ctx.regs.read_f(ops.src_freg(ctx, 0)?) as i32;
    write_single(ctx, ops, raw as f32)
}

fn cvt_w_s(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let val = src_single(ctx, ops, 0)?;
    let fd = ops.dst_freg(ctx, 0)?;
    ctx.regs.write_f(fd, (val as i32) as u32);
    Ok(())
}

fn cvt_d_w(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let raw = ctx.regs.read_f(ops.src_freg(ctx, 0)?) as i32;
    write_double(ctx, ops, f64::from(raw))
}

fn cvt_w_d(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let val = src_double(ctx, ops, 0)?;
    let fd = ops.dst_freg(ctx, 0)?;
    ctx.regs.write_f(fd, (val as i32) as u32);
    Ok(())
}

fn cvt_d_s(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let val = src_single(ctx, ops, 0)?;
    write_double(ctx, ops, f64::from(val))
}

fn cvt_s_d(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let val = src_double(ctx, ops, 0)?;
    write_single(ctx, ops, val as f32)
}
