//! RPC error types

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes
pub mod error_code {
    /// Invalid Request: The JSON is not a valid Request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i64 = -32603;

    // Ethereum-specific error codes
    /// Execution error (revert)
    pub const EXECUTION_ERROR: i64 = 3;
    /// Transaction rejected
    pub const TRANSACTION_REJECTED: i64 = -32003;
    /// Resource not found
    pub const RESOURCE_NOT_FOUND: i64 = -32001;
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with additional data
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Invalid request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_REQUEST, message)
    }

}

/// A raw value that does not match a command schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method}: {path} expected {expected}, got {actual}")]
pub struct ValidationError {
    /// Method whose schema was violated
    pub method: String,
    /// Location of the offending value, e.g. `params[0].to`
    pub path: String,
    /// Human-readable description of the expected schema
    pub expected: String,
    /// Short description of the value found
    pub actual: String,
}

/// Failure reported by a chain-state executor
///
/// Passed through the RPC layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Requested block, transaction or receipt does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Transaction refused by the executor
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// Execution failed (revert or VM fault)
    #[error("execution error: {0}")]
    Execution(String),

    /// Any other executor failure
    #[error("internal executor error: {0}")]
    Internal(String),
}

/// Command layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Method name not in the registry
    #[error("method not found: {0}")]
    UnknownMethod(String),

    /// Parameters or result violate the method's schema
    #[error("invalid value: {0}")]
    Validation(#[from] ValidationError),

    /// Parameters passed validation but could not be decoded
    #[error("cannot decode {method} parameters: {message}")]
    Decoding {
        /// Method name
        method: String,
        /// Decoder message
        message: String,
    },

    /// Executor failure, unchanged
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// Typed result could not be encoded
    #[error("cannot encode {method} result: {message}")]
    Encoding {
        /// Method name
        method: String,
        /// Encoder message
        message: String,
    },
}

impl From<&RpcError> for JsonRpcError {
    fn from(err: &RpcError) -> Self {
        let code = match err {
            RpcError::UnknownMethod(_) => error_code::METHOD_NOT_FOUND,
            RpcError::Validation(_) | RpcError::Decoding { .. } => error_code::INVALID_PARAMS,
            RpcError::Executor(ExecutorError::NotFound(_)) => error_code::RESOURCE_NOT_FOUND,
            RpcError::Executor(ExecutorError::Rejected(_)) => error_code::TRANSACTION_REJECTED,
            RpcError::Executor(ExecutorError::Execution(_)) => error_code::EXECUTION_ERROR,
            RpcError::Executor(ExecutorError::Internal(_)) | RpcError::Encoding { .. } => {
                error_code::INTERNAL_ERROR
            }
        };
        match err {
            RpcError::Validation(validation) => JsonRpcError::with_data(
                code,
                err.to_string(),
                serde_json::json!({
                    "path": validation.path,
                    "expected": validation.expected,
                    "actual": validation.actual,
                }),
            ),
            _ => JsonRpcError::new(code, err.to_string()),
        }
    }
}

impl From<RpcError> for JsonRpcError {
    fn from(err: RpcError) -> Self {
        JsonRpcError::from(&err)
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;
