//! # devchain-rpc
//!
//! Typed command registry and JSON-RPC 2.0 handler for devchain.
//!
//! Each method is declared once. That declaration yields its parameter and
//! return [`Schema`]s, a [`Command`] variant and a [`ChainExecutor`] method,
//! so runtime validation and the typed interface cannot drift apart.
//!
//! ## Features
//!
//! - Process-wide [`CommandRegistry`] with runtime validation of raw values
//! - [`Command`] decoding and execution against any [`ChainExecutor`]
//! - Transport-agnostic [`RpcHandler`] producing JSON-RPC 2.0 responses
//! - `testing` feature: in-memory [`testing::MemoryExecutor`]
//!
//! ## Usage
//!
//! ```ignore
//! use devchain_rpc::{Command, CommandRegistry};
//! use serde_json::json;
//!
//! let params = json!(["0x1111111111111111111111111111111111111111", "latest"]);
//! CommandRegistry::global().validate_params("eth_getBalance", &params)?;
//!
//! let command = Command::from_request("eth_getBalance", &params)?;
//! let balance = command.execute(&executor).await?;
//! ```
//!
//! ## Supported Methods
//!
//! | Method | Params | Returns |
//! |--------|--------|---------|
//! | `web3_clientVersion` | none | string |
//! | `net_version` | none | string |
//! | `eth_chainId` | none | quantity |
//! | `eth_gasPrice` | none | quantity |
//! | `eth_blockNumber` | none | quantity |
//! | `eth_getBalance` | address, block | quantity |
//! | `eth_getTransactionCount` | address, block | quantity |
//! | `eth_getCode` | address, block | data |
//! | `eth_getStorageAt` | address, position, block | data |
//! | `eth_sendRawTransaction` | data | hash |
//! | `eth_call` | transaction, block | data |
//! | `eth_estimateGas` | transaction | quantity |
//! | `eth_getBlockByNumber` | block, full | block |
//! | `eth_getBlockByHash` | hash, full | block |
//! | `eth_getTransactionByHash` | hash | transaction |
//! | `eth_getTransactionReceipt` | hash | receipt |
//! | `eth_getLogs` | filter | logs |
//! | `evm_mine` | none | quantity |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;
pub mod error;
pub mod executor;
pub mod handler;
pub mod registry;
pub mod schema;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

// Re-export main types
pub use commands::Command;
pub use error::{
    error_code, ExecutorError, ExecutorResult, JsonRpcError, RpcError, RpcResult,
    ValidationError,
};
pub use executor::ChainExecutor;
pub use handler::{RpcHandler, RpcHandlerConfig};
pub use registry::{CommandDescriptor, CommandRegistry};
pub use schema::{Schema, WireType};
pub use types::{
    BlockInfo, BlockSelector, BlockTag, BlockTransactions, JsonRpcId, JsonRpcRequest,
    JsonRpcResponse, LogFilter, LogInfo, ReceiptInfo, TopicFilter, TransactionInfo,
    TransactionRequest,
};
