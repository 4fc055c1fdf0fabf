//! Load/store handlers.
//!
//! Memory transfer semantics for the built-in table. The transfer width and
//! the register file involved (general vs. floating-point) follow from the
//! original mnemonic; integer sub-word loads honor the dispatcher's `signed`
//! flag for extension.

use crate::common::error::SimError;
use crate::isa::instruction::{mem_width, MemWidth};

use super::{effective_address, DispatchCtx, HandlerTable, Operands};

pub(super) fn register(table: &mut HandlerTable) {
    table.register("lw", lw);
    table.register("lh", lh);
    table.register("lb", lb);
    table.register("sw", sw);
    table.register("sh", sh);
    table.register("sb", sb);
    table.register("l.s", load_float);
    table.register("s.s", store_float);
    table.register("lwc1", load_float);
    table.register("swc1", store_float);
    table.register("ldc1", load_float);
    table.register("sdc1", store_float);
}

fn load_addr(ctx: &DispatchCtx<'_>, ops: &Operands<'_>) -> Result<u32, SimError> {
    effective_address(ctx.regs, ops.src(ctx, 0)?, ctx.op)
}

fn store_addr(ctx: &DispatchCtx<'_>, ops: &Operands<'_>) -> Result<u32, SimError> {
    effective_address(ctx.regs, ops.dst(ctx, 0)?, ctx.op)
}

fn lw(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = load_addr(ctx, ops)?;
    let val = ctx.mem.word(addr)?;
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, val);
    Ok(())
}

fn lh(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = load_addr(ctx, ops)?;
    let raw = ctx.mem.half(addr)?;
    let val = if ctx.signed {
        (raw as i16) as i32 as u32
    } else {
        u32::from(raw)
    };
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, val);
    Ok(())
}

fn lb(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = load_addr(ctx, ops)?;
    let raw = ctx.mem.byte(addr)?;
    let val = if ctx.signed {
        (raw as i8) as i32 as u32
    } else {
        u32::from(raw)
    };
    let rd = ops.dst_reg(ctx, 0)?;
    ctx.regs.write(rd, val);
    Ok(())
}

fn sw(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = store_addr(ctx, ops)?;
    let val = ops.src_value(ctx, 0)?;
    ctx.mem.add_word(addr, val)
}

fn sh(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = store_addr(ctx, ops)?;
    let val = ops.src_value(ctx, 0)?;
    ctx.mem.add_half(addr, val as u16)
}

fn sb(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = store_addr(ctx, ops)?;
    let val = ops.src_value(ctx, 0)?;
    ctx.mem.add_byte(addr, val as u8)
}

fn load_float(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = load_addr(ctx, ops)?;
    let fd = ops.dst_freg(ctx, 0)?;
    if mem_width(ctx.op) == MemWidth::Double {
        let val = ctx.mem.double(addr)?;
        ctx.regs.write_d(fd, val.to_bits())
    } else {
        let bits = ctx.mem.word(addr)?;
        ctx.regs.write_f(fd, bits);
        Ok(())
    }
}

fn store_float(ctx: &mut DispatchCtx<'_>, ops: &Operands<'_>) -> Result<(), SimError> {
    let addr = store_addr(ctx, ops)?;
    let fs = ops.src_freg(ctx, 0)?;
    if mem_width(ctx.op) == MemWidth::Double {
        let bits = ctx.regs.read_d(fs)?;
        ctx.mem.add_double(addr, f64::from_bits(bits))
    } else {
        let bits = ctx.regs.read_f(fs);
        ctx.mem.add_word(addr, bits)
    }
}
