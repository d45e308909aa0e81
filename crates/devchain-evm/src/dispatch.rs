//! Instruction dispatch
//!
//! [`INSTRUCTION_TABLE`] maps every byte value to exactly one [`Instruction`].
//! It is built at compile time from an exhaustive match over [`Opcode`], so
//! adding an opcode variant without binding a handler fails to compile.
//!
//! | Byte | Kind | Error |
//! |------|------|-------|
//! | unassigned | [`InstructionKind::Invalid`] | [`EvmError::InvalidOpcode`] |
//! | `0xFE` | [`InstructionKind::Abort`] | [`EvmError::UnreachableInstruction`] |
//! | needs host state | [`InstructionKind::HostRequired`] | [`EvmError::UnsupportedInstruction`] |
//! | everything else | [`InstructionKind::Executable`] | operand faults only |

use tracing::{debug, trace};

use crate::context::{ExecutionContext, HaltReason};
use crate::error::{EvmError, EvmResult};
use crate::instructions as ix;
use crate::opcode::Opcode;

/// Instruction handler; receives the opcode byte it was dispatched for
pub(crate) type Handler = fn(&mut ExecutionContext, u8) -> EvmResult<()>;

/// How an instruction behaves under this interpreter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionKind {
    /// Executed against the context
    Executable,
    /// Assigned, but needs account or storage state from a host
    HostRequired,
    /// The designated abort instruction
    Abort,
    /// Not assigned to any instruction
    Invalid,
}

/// One entry of the dispatch table
///
/// The bound handler is only reachable through [`dispatch`] and
/// [`dispatch_opcode`], which refuse contexts that are no longer running.
#[derive(Clone, Copy, Debug)]
pub struct Instruction {
    /// Decoded opcode, `None` for unassigned values
    pub opcode: Option<Opcode>,
    /// Behavior class
    pub kind: InstructionKind,
    handler: Handler,
}

/// Dispatch table, total over `0..=255`
pub static INSTRUCTION_TABLE: [Instruction; 256] = build_table();

const UNASSIGNED: Instruction = Instruction {
    opcode: None,
    kind: InstructionKind::Invalid,
    handler: ix::invalid_opcode,
};

const fn build_table() -> [Instruction; 256] {
    let mut table = [UNASSIGNED; 256];
    let mut byte = 0;
    while byte < 256 {
        table[byte] = instruction(byte as u8);
        byte += 1;
    }
    table
}

const fn instruction(byte: u8) -> Instruction {
    use Opcode::*;

    let opcode = match Opcode::from_byte(byte) {
        Some(opcode) => opcode,
        None => return UNASSIGNED,
    };

    let (kind, handler): (InstructionKind, Handler) = match opcode {
        STOP => exec(ix::stop),
        ADD => exec(ix::add),
        MUL => exec(ix::mul),
        SUB => exec(ix::sub),
        DIV => exec(ix::div),
        SDIV => exec(ix::sdiv),
        MOD => exec(ix::rem),
        SMOD => exec(ix::smod),
        ADDMOD => exec(ix::addmod),
        MULMOD => exec(ix::mulmod),
        EXP => exec(ix::exp),
        SIGNEXTEND => exec(ix::signextend),

        LT => exec(ix::lt),
        GT => exec(ix::gt),
        SLT => exec(ix::slt),
        SGT => exec(ix::sgt),
        EQ => exec(ix::eq),
        ISZERO => exec(ix::iszero),
        AND => exec(ix::and),
        OR => exec(ix::or),
        XOR => exec(ix::xor),
        NOT => exec(ix::not),
        BYTE => exec(ix::byte),
        SHL => exec(ix::shl),
        SHR => exec(ix::shr),
        SAR => exec(ix::sar),

        KECCAK256 => exec(ix::keccak256),

        ADDRESS => exec(ix::address),
        ORIGIN => exec(ix::origin),
        CALLER => exec(ix::caller),
        CALLVALUE => exec(ix::callvalue),
        CALLDATALOAD => exec(ix::calldataload),
        CALLDATASIZE => exec(ix::calldatasize),
        CALLDATACOPY => exec(ix::calldatacopy),
        CODESIZE => exec(ix::codesize),
        CODECOPY => exec(ix::codecopy),
        GASPRICE => exec(ix::gasprice),
        RETURNDATASIZE => exec(ix::returndatasize),
        RETURNDATACOPY => exec(ix::returndatacopy),
        COINBASE => exec(ix::coinbase),
        TIMESTAMP => exec(ix::timestamp),
        NUMBER => exec(ix::number),
        PREVRANDAO => exec(ix::prevrandao),
        GASLIMIT => exec(ix::gaslimit),
        CHAINID => exec(ix::chainid),
        BASEFEE => exec(ix::basefee),

        POP => exec(ix::pop),
        MLOAD => exec(ix::mload),
        MSTORE => exec(ix::mstore),
        MSTORE8 => exec(ix::mstore8),
        JUMP => exec(ix::jump),
        JUMPI => exec(ix::jumpi),
        PC => exec(ix::pc),
        MSIZE => exec(ix::msize),
        JUMPDEST => exec(ix::jumpdest),
        MCOPY => exec(ix::mcopy),

        PUSH0 => exec(ix::push0),
        PUSH1 | PUSH2 | PUSH3 | PUSH4 | PUSH5 | PUSH6 | PUSH7 | PUSH8 | PUSH9 | PUSH10
        | PUSH11 | PUSH12 | PUSH13 | PUSH14 | PUSH15 | PUSH16 | PUSH17 | PUSH18 | PUSH19
        | PUSH20 | PUSH21 | PUSH22 | PUSH23 | PUSH24 | PUSH25 | PUSH26 | PUSH27 | PUSH28
        | PUSH29 | PUSH30 | PUSH31 | PUSH32 => exec(ix::push),
        DUP1 | DUP2 | DUP3 | DUP4 | DUP5 | DUP6 | DUP7 | DUP8 | DUP9 | DUP10 | DUP11
        | DUP12 | DUP13 | DUP14 | DUP15 | DUP16 => exec(ix::dup),
        SWAP1 | SWAP2 | SWAP3 | SWAP4 | SWAP5 | SWAP6 | SWAP7 | SWAP8 | SWAP9 | SWAP10
        | SWAP11 | SWAP12 | SWAP13 | SWAP14 | SWAP15 | SWAP16 => exec(ix::swap),

        RETURN => exec(ix::ret),
        REVERT => exec(ix::revert),
        INVALID => (InstructionKind::Abort, ix::abort),

        // Account, storage, log and call instructions need a host. GAS needs a
        // gas schedule.
        BALANCE | EXTCODESIZE | EXTCODECOPY | EXTCODEHASH | BLOCKHASH | SELFBALANCE
        | SLOAD | SSTORE | GAS | TLOAD | TSTORE | LOG0 | LOG1 | LOG2 | LOG3 | LOG4
        | CREATE | CALL | CALLCODE | DELEGATECALL | CREATE2 | STATICCALL
        | SELFDESTRUCT => (InstructionKind::HostRequired, ix::host_required),
    };

    Instruction {
        opcode: Some(opcode),
        kind,
        handler,
    }
}

const fn exec(handler: Handler) -> (InstructionKind, Handler) {
    (InstructionKind::Executable, handler)
}

/// Look up the table entry for a byte
pub fn instruction_for(byte: u8) -> &'static Instruction {
    &INSTRUCTION_TABLE[byte as usize]
}

/// Fetch the opcode at the program counter and dispatch it
///
/// Running past the end of code halts the context normally.
pub fn dispatch(ctx: &mut ExecutionContext) -> EvmResult<()> {
    if !ctx.is_running() {
        return Err(EvmError::ContextHalted);
    }
    match ctx.code().get(ctx.pc()).copied() {
        Some(opcode) => dispatch_opcode(opcode, ctx),
        None => {
            ctx.halt(HaltReason::EndOfCode);
            Ok(())
        }
    }
}

/// Execute one instruction against a running context
///
/// Advances `pc` past the opcode byte, then runs the bound handler. Any error
/// moves the context to [`ContextStatus::Failed`](crate::context::ContextStatus::Failed)
/// and is returned. A context that is no longer running is rejected with
/// [`EvmError::ContextHalted`] and left untouched.
pub fn dispatch_opcode(opcode: u8, ctx: &mut ExecutionContext) -> EvmResult<()> {
    if !ctx.is_running() {
        return Err(EvmError::ContextHalted);
    }

    let instruction = instruction_for(opcode);
    let pc = ctx.pc;
    trace!(pc, opcode, kind = ?instruction.kind, "dispatch");

    ctx.pc += 1;
    if let Err(err) = (instruction.handler)(ctx, opcode) {
        debug!(pc, opcode, error = %err, "execution halted with error");
        ctx.fail(err.clone());
        return Err(err);
    }
    Ok(())
}
