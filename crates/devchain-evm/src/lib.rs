//! # devchain-evm
//!
//! Instruction dispatch and bytecode interpreter for devchain.
//!
//! ## Features
//!
//! - **Dispatch table**: a compile-time table mapping every byte to one handler
//! - **Execution context**: program counter, stack, memory and a terminal status
//! - **Interpreter**: drives dispatch to completion under code-size and step limits
//!
//! Instructions that need account or storage state (BALANCE, SLOAD, CALL, ...)
//! fail with [`EvmError::UnsupportedInstruction`]; there is no gas metering.
//!
//! ## Quick Start
//!
//! ```rust
//! use devchain_evm::{Environment, EvmError, Interpreter};
//!
//! let interpreter = Interpreter::default();
//!
//! // PUSH1 3, PUSH1 5, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
//! let code = vec![0x60, 3, 0x60, 5, 0x01, 0x60, 0, 0x52, 0x60, 32, 0x60, 0, 0xF3];
//! let outcome = interpreter.run(code, Environment::default()).unwrap();
//! assert!(outcome.is_success());
//! assert_eq!(outcome.output[31], 8);
//!
//! // 0xFE aborts, 0x0C is unassigned
//! let outcome = interpreter.run(vec![0xFE], Environment::default()).unwrap();
//! assert_eq!(outcome.error(), Some(&EvmError::UnreachableInstruction));
//! let outcome = interpreter.run(vec![0x0C], Environment::default()).unwrap();
//! assert_eq!(outcome.error(), Some(&EvmError::InvalidOpcode { opcode: 0x0C }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod dispatch;
mod error;
mod instructions;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod stack;

pub use context::{
    BlockContext, CallContext, ContextStatus, Environment, ExecutionContext, HaltReason,
    TxContext,
};
pub use dispatch::{
    dispatch, dispatch_opcode, instruction_for, Instruction, InstructionKind, INSTRUCTION_TABLE,
};
pub use error::{EvmError, EvmResult};
pub use interpreter::{ExecutionOutcome, Interpreter, InterpreterConfig};
pub use opcode::Opcode;
