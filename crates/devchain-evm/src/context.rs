//! Execution context for a single bytecode run

use std::collections::HashSet;

use bytes::Bytes;
use devchain_primitives::{Address, H256, U256};

use crate::error::EvmError;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::stack::Stack;

/// Call context information
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    /// Contract address being executed
    pub address: Address,
    /// Caller address
    pub caller: Address,
    /// Call value in wei
    pub value: U256,
    /// Call data
    pub data: Bytes,
}

impl CallContext {
    /// Create a new call context
    pub fn new(address: Address, caller: Address, value: U256, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            caller,
            value,
            data: data.into(),
        }
    }
}

/// Block environment information
#[derive(Clone, Debug)]
pub struct BlockContext {
    /// Block number
    pub number: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Block gas limit
    pub gas_limit: u64,
    /// Block coinbase
    pub coinbase: Address,
    /// Block difficulty/prevrandao
    pub prevrandao: H256,
    /// Chain ID
    pub chain_id: u64,
    /// Base fee (EIP-1559)
    pub base_fee: U256,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: 30_000_000,
            coinbase: Address::ZERO,
            prevrandao: H256::ZERO,
            chain_id: 1337,
            base_fee: U256::zero(),
        }
    }
}

/// Transaction environment information
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// Transaction origin (original sender)
    pub origin: Address,
    /// Gas price
    pub gas_price: U256,
}

/// Complete execution environment
#[derive(Clone, Debug, Default)]
pub struct Environment {
    /// Call context
    pub call: CallContext,
    /// Block context
    pub block: BlockContext,
    /// Transaction context
    pub tx: TxContext,
}

impl Environment {
    /// Create new environment
    pub fn new(call: CallContext, block: BlockContext, tx: TxContext) -> Self {
        Self { call, block, tx }
    }
}

/// Why a context halted normally
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// STOP was executed
    Stop,
    /// RETURN was executed
    Return,
    /// The program counter ran past the last byte of code
    EndOfCode,
}

/// Lifecycle of an execution context
///
/// `Running` is the only state from which an instruction may be dispatched.
/// Both other states are terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextStatus {
    /// Instructions may still be dispatched
    Running,
    /// Halted normally
    Halted(HaltReason),
    /// Halted by an error; the error is kept for diagnostics
    Failed(EvmError),
}

impl ContextStatus {
    /// Whether the context can still execute
    pub fn is_running(&self) -> bool {
        matches!(self, ContextStatus::Running)
    }

    /// Whether the context reached either terminal state
    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }
}

/// Mutable state of one in-flight instruction stream
///
/// Owned by the execution that created it. Only dispatch moves it between
/// states.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    code: Bytes,
    pub(crate) pc: usize,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    /// Data returned by the last sub-call (always empty: sub-calls need a host)
    pub(crate) return_data: Vec<u8>,
    pub(crate) output: Vec<u8>,
    jump_dests: HashSet<usize>,
    env: Environment,
    status: ContextStatus,
}

impl ExecutionContext {
    /// Create a running context positioned at the first byte of `code`
    pub fn new(code: impl Into<Bytes>, env: Environment) -> Self {
        let code = code.into();
        let jump_dests = analyze_jump_dests(&code);
        Self {
            code,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            return_data: Vec::new(),
            output: Vec::new(),
            jump_dests,
            env,
            status: ContextStatus::Running,
        }
    }

    /// Bytecode being executed
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Operand stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Output set by RETURN or REVERT
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Call environment
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Current status
    pub fn status(&self) -> &ContextStatus {
        &self.status
    }

    /// Whether the context can still execute
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Consume the context, keeping its status and output
    pub fn into_parts(self) -> (ContextStatus, Vec<u8>) {
        (self.status, self.output)
    }

    pub(crate) fn halt(&mut self, reason: HaltReason) {
        self.status = ContextStatus::Halted(reason);
    }

    pub(crate) fn fail(&mut self, error: EvmError) {
        self.status = ContextStatus::Failed(error);
    }

    pub(crate) fn is_jump_dest(&self, dest: usize) -> bool {
        self.jump_dests.contains(&dest)
    }
}

/// Collect JUMPDEST offsets, skipping PUSH immediates
fn analyze_jump_dests(code: &[u8]) -> HashSet<usize> {
    let mut dests = HashSet::new();
    let mut i = 0;

    while i < code.len() {
        let byte = code[i];
        if byte == Opcode::JUMPDEST.byte() {
            dests.insert(i);
        }
        if let Some(op) = Opcode::from_byte(byte) {
            i += op.immediate_size();
        }
        i += 1;
    }

    dests
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_context_new() {
        let address = Address::from_bytes([0x11; 20]);
        let caller = Address::from_bytes([0x22; 20]);
        let ctx = CallContext::new(address, caller, U256::from(1000u64), vec![1, 2, 3]);

        assert_eq!(ctx.address, address);
        assert_eq!(ctx.caller, caller);
        assert_eq!(ctx.value, U256::from(1000u64));
        assert_eq!(&ctx.data[..], &[1, 2, 3]);
    }

    #[test]
    fn test_block_context_default() {
        let ctx = BlockContext::default();
        assert_eq!(ctx.gas_limit, 30_000_000);
        assert_eq!(ctx.chain_id, 1337);
        assert_eq!(ctx.prevrandao, H256::ZERO);
    }

    #[test]
    fn test_new_context_is_running() {
        let ctx = ExecutionContext::new(vec![0x00], Environment::default());
        assert_eq!(ctx.status(), &ContextStatus::Running);
        assert_eq!(ctx.pc(), 0);
        assert!(ctx.stack().is_empty());
        assert_eq!(ctx.memory().size(), 0);
        assert!(ctx.output().is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let mut ctx = ExecutionContext::new(Vec::new(), Environment::default());
        ctx.halt(HaltReason::Stop);
        assert!(ctx.status().is_terminal());

        let mut ctx = ExecutionContext::new(Vec::new(), Environment::default());
        ctx.fail(EvmError::StackUnderflow);
        assert_eq!(ctx.status(), &ContextStatus::Failed(EvmError::StackUnderflow));
    }

    #[test]
    fn test_jump_dests_skip_push_data() {
        // PUSH1 0x5B, JUMPDEST, PUSH2 0x5B5B, JUMPDEST
        let code = vec![0x60, 0x5B, 0x5B, 0x61, 0x5B, 0x5B, 0x5B];
        let ctx = ExecutionContext::new(code, Environment::default());
        assert!(!ctx.is_jump_dest(1));
        assert!(ctx.is_jump_dest(2));
        assert!(!ctx.is_jump_dest(4));
        assert!(!ctx.is_jump_dest(5));
        assert!(ctx.is_jump_dest(6));
    }

    #[test]
    fn test_jump_dests_truncated_push() {
        // PUSH32 with only two immediate bytes present
        let ctx = ExecutionContext::new(vec![0x7F, 0x5B, 0x5B], Environment::default());
        assert!(!ctx.is_jump_dest(1));
        assert!(!ctx.is_jump_dest(2));
    }
}
