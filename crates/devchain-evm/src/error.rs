//! EVM error types

use thiserror::Error;

use crate::opcode::Opcode;

/// EVM execution errors
///
/// Every variant is terminal for the execution context that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Opcode value not assigned to any instruction
    #[error("invalid opcode: 0x{opcode:02x}")]
    InvalidOpcode {
        /// The offending opcode value
        opcode: u8,
    },

    /// The designated abort instruction (0xFE) was executed
    #[error("unreachable instruction executed")]
    UnreachableInstruction,

    /// Assigned instruction that needs host state this interpreter does not model
    #[error("unsupported instruction: {}", describe(*.opcode))]
    UnsupportedInstruction {
        /// The instruction's opcode value
        opcode: u8,
    },

    /// Dispatch into a context that has already halted
    #[error("execution context already halted")]
    ContextHalted,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Invalid jump destination
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Invalid memory access
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Return data out of bounds
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// Code larger than the configured limit
    #[error("code size {size} exceeds limit {limit}")]
    CodeSizeExceeded {
        /// Actual code size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Execution ran for more steps than allowed
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(u64),

    /// Revert with data
    #[error("execution reverted")]
    Revert(Vec<u8>),
}

fn describe(opcode: u8) -> String {
    match Opcode::from_byte(opcode) {
        Some(op) => format!("{:?} (0x{:02x})", op, opcode),
        None => format!("0x{:02x}", opcode),
    }
}

impl EvmError {
    /// Whether the error comes from the instruction stream itself
    /// (invalid, aborting, or unsupported opcode) rather than from an operand fault
    pub fn is_opcode_fault(&self) -> bool {
        matches!(
            self,
            EvmError::InvalidOpcode { .. }
                | EvmError::UnreachableInstruction
                | EvmError::UnsupportedInstruction { .. }
        )
    }
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;
