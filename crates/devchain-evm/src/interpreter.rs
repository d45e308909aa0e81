//! EVM bytecode interpreter

use bytes::Bytes;
use tracing::debug;

use crate::context::{ContextStatus, Environment, ExecutionContext, HaltReason};
use crate::dispatch::dispatch;
use crate::error::{EvmError, EvmResult};

/// Maximum contract code size (EIP-170)
pub const MAX_CODE_SIZE: usize = 24576;

/// Default step limit
pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;

/// Interpreter limits
#[derive(Clone, Debug)]
pub struct InterpreterConfig {
    /// Largest accepted bytecode, in bytes
    pub max_code_size: usize,
    /// Instructions executed before the run is failed
    pub max_steps: u64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_code_size: MAX_CODE_SIZE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Result of running bytecode to a terminal state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Terminal status of the context
    pub status: ContextStatus,
    /// RETURN or REVERT data
    pub output: Vec<u8>,
    /// Number of dispatches performed
    pub steps: u64,
}

impl ExecutionOutcome {
    /// Whether execution halted normally
    pub fn is_success(&self) -> bool {
        matches!(self.status, ContextStatus::Halted(_))
    }

    /// Normal halt reason, if any
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.status {
            ContextStatus::Halted(reason) => Some(reason),
            _ => None,
        }
    }

    /// Failure reason, if any
    pub fn error(&self) -> Option<&EvmError> {
        match &self.status {
            ContextStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Drives dispatch over a fresh context until it halts
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    /// Create an interpreter with the given limits
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    /// Limits in effect
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Run `code` in `env` to completion
    ///
    /// Only an oversized program is an `Err`; faults during execution are
    /// reported through [`ExecutionOutcome::status`].
    pub fn run(&self, code: impl Into<Bytes>, env: Environment) -> EvmResult<ExecutionOutcome> {
        let code = code.into();
        if code.len() > self.config.max_code_size {
            return Err(EvmError::CodeSizeExceeded {
                size: code.len(),
                limit: self.config.max_code_size,
            });
        }

        let mut ctx = ExecutionContext::new(code, env);
        let steps = self.execute(&mut ctx);
        let (status, output) = ctx.into_parts();

        debug!(steps, status = ?status, output_len = output.len(), "execution finished");
        Ok(ExecutionOutcome {
            status,
            output,
            steps,
        })
    }

    /// Dispatch into `ctx` until it leaves the running state; returns the step count
    pub fn execute(&self, ctx: &mut ExecutionContext) -> u64 {
        let mut steps = 0;
        while ctx.is_running() {
            if steps >= self.config.max_steps {
                ctx.fail(EvmError::StepLimitExceeded(self.config.max_steps));
                break;
            }
            steps += 1;
            if dispatch(ctx).is_err() {
                break;
            }
        }
        steps
    }
}
