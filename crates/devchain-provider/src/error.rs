//! Provider error types

use devchain_rpc::RpcError;
use thiserror::Error;

/// Provider bridge errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// A required parameter bag field is absent
    #[error("missing field `{0}`")]
    MissingField(String),

    /// A parameter bag field has the wrong shape
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Field path, e.g. `transaction.gasLimit`
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Command validation or execution failed
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The fallback provider failed
    #[error("fallback provider error: {0}")]
    Fallback(String),

    /// No provider handles this method
    #[error("method not implemented: {0}")]
    NotImplemented(String),
}

impl ProviderError {
    /// Invalid field error
    pub fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
