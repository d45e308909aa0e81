//! # devchain-provider
//!
//! ethers-style provider bridge for devchain.
//!
//! [`Provider::perform`] accepts the method names and parameter bags an
//! ethers `BaseProvider` produces, normalizes them into typed requests and
//! executes them as registry [`Command`](devchain_rpc::Command)s, the same
//! path a JSON-RPC request takes. Unrecognized methods are forwarded verbatim
//! to a [`FallbackProvider`].
//!
//! ## Usage
//!
//! ```ignore
//! use devchain_provider::Provider;
//! use serde_json::json;
//!
//! let provider = Provider::new(executor);
//! let balance = provider
//!     .perform("getBalance", json!({ "address": "0x1111111111111111111111111111111111111111" }))
//!     .await?;
//! ```
//!
//! ## Recognized Methods
//!
//! | Method | Command |
//! |--------|---------|
//! | `getChainId` | `eth_chainId` |
//! | `getBlockNumber` | `eth_blockNumber` |
//! | `getGasPrice` | `eth_gasPrice` |
//! | `getBalance` | `eth_getBalance` |
//! | `getTransactionCount` | `eth_getTransactionCount` |
//! | `getCode` | `eth_getCode` |
//! | `getStorageAt` | `eth_getStorageAt` |
//! | `sendTransaction` | `eth_sendRawTransaction` |
//! | `call` | `eth_call` |
//! | `estimateGas` | `eth_estimateGas` |
//! | `getBlock` | `eth_getBlockByNumber` / `eth_getBlockByHash` |
//! | `getTransaction` | `eth_getTransactionByHash` |
//! | `getTransactionReceipt` | `eth_getTransactionReceipt` |
//! | `getLogs` | `eth_getLogs` |
//! | `mineBlock` | `evm_mine` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod error;
pub mod provider;
pub mod request;
pub mod transaction;

pub use config::{Network, ProviderConfig};
pub use error::{ProviderError, ProviderResult};
pub use provider::{FallbackProvider, Provider, UnsupportedFallback};
pub use request::{BlockId, ProviderRequest, Route};
pub use transaction::normalize_transaction;
