//! Instruction handlers
//!
//! Every handler has the [`Handler`](crate::dispatch::Handler) signature. The
//! dispatcher has already moved `pc` past the opcode byte when a handler runs.

use devchain_primitives::{Address, U256};
use primitive_types::U512;
use sha3::{Digest, Keccak256};

use crate::context::{ExecutionContext, HaltReason};
use crate::error::{EvmError, EvmResult};
use crate::opcode::Opcode;

// ==================== Helpers ====================

fn to_usize(value: U256) -> Option<usize> {
    if value.bits() > 64 {
        None
    } else {
        usize::try_from(value.low_u64()).ok()
    }
}

/// Decode a memory range; a zero size never touches memory, whatever the offset
fn memory_range(offset: U256, size: U256) -> EvmResult<(usize, usize)> {
    if size.is_zero() {
        return Ok((0, 0));
    }
    let offset = to_usize(offset).ok_or(EvmError::InvalidMemoryAccess)?;
    let size = to_usize(size).ok_or(EvmError::InvalidMemoryAccess)?;
    Ok((offset, size))
}

/// Read `size` bytes of `source` from `offset`, zero-padding past its end
fn padded_slice(source: &[u8], offset: U256, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    if let Some(start) = to_usize(offset).filter(|start| *start < source.len()) {
        let end = start.saturating_add(size).min(source.len());
        out[..end - start].copy_from_slice(&source[start..end]);
    }
    out
}

fn bool_word(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

fn address_word(address: &Address) -> U256 {
    U256::from_big_endian(address.as_bytes())
}

fn narrow(value: U512) -> U256 {
    let U512(limbs) = value;
    U256([limbs[0], limbs[1], limbs[2], limbs[3]])
}

fn is_negative(value: U256) -> bool {
    value.bit(255)
}

fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

fn binary(ctx: &mut ExecutionContext, op: impl FnOnce(U256, U256) -> U256) -> EvmResult<()> {
    let [a, b] = ctx.stack.pop_n::<2>()?;
    ctx.stack.push(op(a, b))
}

fn unary(ctx: &mut ExecutionContext, op: impl FnOnce(U256) -> U256) -> EvmResult<()> {
    let a = ctx.stack.pop()?;
    ctx.stack.push(op(a))
}

// ==================== Faults ====================

pub(crate) fn invalid_opcode(_ctx: &mut ExecutionContext, opcode: u8) -> EvmResult<()> {
    Err(EvmError::InvalidOpcode { opcode })
}

pub(crate) fn abort(_ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    Err(EvmError::UnreachableInstruction)
}

pub(crate) fn host_required(_ctx: &mut ExecutionContext, opcode: u8) -> EvmResult<()> {
    Err(EvmError::UnsupportedInstruction { opcode })
}

// ==================== Stop and arithmetic ====================

pub(crate) fn stop(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    ctx.halt(HaltReason::Stop);
    Ok(())
}

pub(crate) fn add(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| a.overflowing_add(b).0)
}

pub(crate) fn mul(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| a.overflowing_mul(b).0)
}

pub(crate) fn sub(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| a.overflowing_sub(b).0)
}

pub(crate) fn div(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| if b.is_zero() { U256::zero() } else { a / b })
}

pub(crate) fn sdiv(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| {
        if b.is_zero() {
            return U256::zero();
        }
        let quotient = abs(a) / abs(b);
        if is_negative(a) != is_negative(b) {
            negate(quotient)
        } else {
            quotient
        }
    })
}

pub(crate) fn rem(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| if b.is_zero() { U256::zero() } else { a % b })
}

pub(crate) fn smod(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| {
        if b.is_zero() {
            return U256::zero();
        }
        // sign follows the dividend
        let remainder = abs(a) % abs(b);
        if is_negative(a) {
            negate(remainder)
        } else {
            remainder
        }
    })
}

pub(crate) fn addmod(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [a, b, n] = ctx.stack.pop_n::<3>()?;
    let result = if n.is_zero() {
        U256::zero()
    } else {
        narrow((U512::from(a) + U512::from(b)) % U512::from(n))
    };
    ctx.stack.push(result)
}

pub(crate) fn mulmod(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [a, b, n] = ctx.stack.pop_n::<3>()?;
    let result = if n.is_zero() {
        U256::zero()
    } else {
        narrow(a.full_mul(b) % U512::from(n))
    };
    ctx.stack.push(result)
}

pub(crate) fn exp(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |base, exponent| base.overflowing_pow(exponent).0)
}

pub(crate) fn signextend(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |byte, value| {
        if byte >= U256::from(31u64) {
            return value;
        }
        let bit = byte.low_u64() as usize * 8 + 7;
        let mask = (U256::one() << (bit + 1)) - U256::one();
        if value.bit(bit) {
            value | !mask
        } else {
            value & mask
        }
    })
}

// ==================== Comparison and bitwise ====================

pub(crate) fn lt(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| bool_word(a < b))
}

pub(crate) fn gt(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| bool_word(a > b))
}

pub(crate) fn slt(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| bool_word(signed_less(a, b)))
}

pub(crate) fn sgt(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| bool_word(signed_less(b, a)))
}

fn signed_less(a: U256, b: U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

pub(crate) fn eq(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| bool_word(a == b))
}

pub(crate) fn iszero(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    unary(ctx, |a| bool_word(a.is_zero()))
}

pub(crate) fn and(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| a & b)
}

pub(crate) fn or(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| a | b)
}

pub(crate) fn xor(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |a, b| a ^ b)
}

pub(crate) fn not(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    unary(ctx, |a| !a)
}

pub(crate) fn byte(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |index, value| match to_usize(index) {
        Some(i) if i < 32 => U256::from(value.byte(31 - i)),
        _ => U256::zero(),
    })
}

pub(crate) fn shl(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |shift, value| match to_usize(shift) {
        Some(s) if s < 256 => value << s,
        _ => U256::zero(),
    })
}

pub(crate) fn shr(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |shift, value| match to_usize(shift) {
        Some(s) if s < 256 => value >> s,
        _ => U256::zero(),
    })
}

pub(crate) fn sar(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    binary(ctx, |shift, value| {
        let negative = is_negative(value);
        match to_usize(shift) {
            Some(s) if s < 256 => {
                if negative {
                    !((!value) >> s)
                } else {
                    value >> s
                }
            }
            _ if negative => U256::MAX,
            _ => U256::zero(),
        }
    })
}

// ==================== Hashing ====================

pub(crate) fn keccak256(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [offset, size] = ctx.stack.pop_n::<2>()?;
    let (offset, size) = memory_range(offset, size)?;
    let data = ctx.memory.load_slice(offset, size)?;
    let hash = Keccak256::digest(&data);
    ctx.stack.push(U256::from_big_endian(&hash))
}

// ==================== Environment ====================

pub(crate) fn address(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let word = address_word(&ctx.env().call.address);
    ctx.stack.push(word)
}

pub(crate) fn origin(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let word = address_word(&ctx.env().tx.origin);
    ctx.stack.push(word)
}

pub(crate) fn caller(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let word = address_word(&ctx.env().call.caller);
    ctx.stack.push(word)
}

pub(crate) fn callvalue(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let value = ctx.env().call.value;
    ctx.stack.push(value)
}

pub(crate) fn calldataload(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let offset = ctx.stack.pop()?;
    let word = padded_slice(&ctx.env().call.data, offset, 32);
    ctx.stack.push(U256::from_big_endian(&word))
}

pub(crate) fn calldatasize(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let size = ctx.env().call.data.len();
    ctx.stack.push(U256::from(size))
}

pub(crate) fn calldatacopy(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [dest, offset, size] = ctx.stack.pop_n::<3>()?;
    let (dest, size) = memory_range(dest, size)?;
    ctx.memory.expand(dest, size)?;
    let data = padded_slice(&ctx.env().call.data, offset, size);
    ctx.memory.store_slice(dest, &data)
}

pub(crate) fn codesize(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let size = ctx.code().len();
    ctx.stack.push(U256::from(size))
}

pub(crate) fn codecopy(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [dest, offset, size] = ctx.stack.pop_n::<3>()?;
    let (dest, size) = memory_range(dest, size)?;
    ctx.memory.expand(dest, size)?;
    let data = padded_slice(ctx.code(), offset, size);
    ctx.memory.store_slice(dest, &data)
}

pub(crate) fn gasprice(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let price = ctx.env().tx.gas_price;
    ctx.stack.push(price)
}

pub(crate) fn returndatasize(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let size = ctx.return_data.len();
    ctx.stack.push(U256::from(size))
}

pub(crate) fn returndatacopy(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [dest, offset, size] = ctx.stack.pop_n::<3>()?;
    let offset = to_usize(offset).ok_or(EvmError::ReturnDataOutOfBounds)?;
    let len = to_usize(size).ok_or(EvmError::ReturnDataOutOfBounds)?;
    match offset.checked_add(len) {
        Some(end) if end <= ctx.return_data.len() => {}
        _ => return Err(EvmError::ReturnDataOutOfBounds),
    }
    let (dest, size) = memory_range(dest, size)?;
    let data = ctx.return_data[offset..offset + size].to_vec();
    ctx.memory.store_slice(dest, &data)
}

pub(crate) fn coinbase(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let word = address_word(&ctx.env().block.coinbase);
    ctx.stack.push(word)
}

pub(crate) fn timestamp(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let timestamp = ctx.env().block.timestamp;
    ctx.stack.push(U256::from(timestamp))
}

pub(crate) fn number(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let number = ctx.env().block.number;
    ctx.stack.push(U256::from(number))
}

pub(crate) fn prevrandao(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let word = U256::from_big_endian(ctx.env().block.prevrandao.as_bytes());
    ctx.stack.push(word)
}

pub(crate) fn gaslimit(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let limit = ctx.env().block.gas_limit;
    ctx.stack.push(U256::from(limit))
}

pub(crate) fn chainid(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let chain_id = ctx.env().block.chain_id;
    ctx.stack.push(U256::from(chain_id))
}

pub(crate) fn basefee(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let base_fee = ctx.env().block.base_fee;
    ctx.stack.push(base_fee)
}

// ==================== Stack, memory and flow ====================

pub(crate) fn pop(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    ctx.stack.pop().map(|_| ())
}

pub(crate) fn mload(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let offset = ctx.stack.pop()?;
    let offset = to_usize(offset).ok_or(EvmError::InvalidMemoryAccess)?;
    let value = ctx.memory.load(offset)?;
    ctx.stack.push(value)
}

pub(crate) fn mstore(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [offset, value] = ctx.stack.pop_n::<2>()?;
    let offset = to_usize(offset).ok_or(EvmError::InvalidMemoryAccess)?;
    ctx.memory.store(offset, value)
}

pub(crate) fn mstore8(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [offset, value] = ctx.stack.pop_n::<2>()?;
    let offset = to_usize(offset).ok_or(EvmError::InvalidMemoryAccess)?;
    ctx.memory.store8(offset, value.byte(0))
}

pub(crate) fn jump(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let dest = ctx.stack.pop()?;
    jump_to(ctx, dest)
}

pub(crate) fn jumpi(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [dest, condition] = ctx.stack.pop_n::<2>()?;
    if condition.is_zero() {
        Ok(())
    } else {
        jump_to(ctx, dest)
    }
}

fn jump_to(ctx: &mut ExecutionContext, dest: U256) -> EvmResult<()> {
    let dest = to_usize(dest).ok_or(EvmError::InvalidJump(usize::MAX))?;
    if !ctx.is_jump_dest(dest) {
        return Err(EvmError::InvalidJump(dest));
    }
    ctx.pc = dest;
    Ok(())
}

pub(crate) fn pc(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let pc = ctx.pc.saturating_sub(1);
    ctx.stack.push(U256::from(pc))
}

pub(crate) fn msize(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let size = ctx.memory.size();
    ctx.stack.push(U256::from(size))
}

pub(crate) fn jumpdest(_ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    Ok(())
}

pub(crate) fn mcopy(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [dest, src, size] = ctx.stack.pop_n::<3>()?;
    let (dest, len) = memory_range(dest, size)?;
    let (src, _) = memory_range(src, size)?;
    ctx.memory.copy(dest, src, len)
}

// ==================== Push, dup and swap ====================

pub(crate) fn push0(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    ctx.stack.push(U256::zero())
}

/// Size or depth encoded in a PUSHn/DUPn/SWAPn opcode, rejecting any other byte
fn operand(opcode: u8, select: fn(Opcode) -> usize) -> EvmResult<usize> {
    match Opcode::from_byte(opcode).map(select) {
        Some(n) if n > 0 => Ok(n),
        _ => Err(EvmError::InvalidOpcode { opcode }),
    }
}

/// PUSH1..PUSH32; immediates past the end of code read as zero
pub(crate) fn push(ctx: &mut ExecutionContext, opcode: u8) -> EvmResult<()> {
    let size = operand(opcode, Opcode::immediate_size)?;
    let start = ctx.pc.min(ctx.code().len());
    let end = (ctx.pc + size).min(ctx.code().len());

    let mut word = [0u8; 32];
    let available = end - start;
    word[32 - size..32 - size + available].copy_from_slice(&ctx.code()[start..end]);

    ctx.stack.push(U256::from_big_endian(&word))?;
    ctx.pc += size;
    Ok(())
}

pub(crate) fn dup(ctx: &mut ExecutionContext, opcode: u8) -> EvmResult<()> {
    ctx.stack.dup(operand(opcode, Opcode::dup_depth)?)
}

pub(crate) fn swap(ctx: &mut ExecutionContext, opcode: u8) -> EvmResult<()> {
    ctx.stack.swap(operand(opcode, Opcode::swap_depth)?)
}

// ==================== Return ====================

pub(crate) fn ret(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [offset, size] = ctx.stack.pop_n::<2>()?;
    let (offset, size) = memory_range(offset, size)?;
    ctx.output = ctx.memory.load_slice(offset, size)?;
    ctx.halt(HaltReason::Return);
    Ok(())
}

pub(crate) fn revert(ctx: &mut ExecutionContext, _opcode: u8) -> EvmResult<()> {
    let [offset, size] = ctx.stack.pop_n::<2>()?;
    let (offset, size) = memory_range(offset, size)?;
    let data = ctx.memory.load_slice(offset, size)?;
    ctx.output = data.clone();
    Err(EvmError::Revert(data))
}
