//! Chain-state executor interface
//!
//! One method per registered command. Parameter and return types are the
//! same wire types the command table declares, so the registry and this
//! trait always agree.

use async_trait::async_trait;
use devchain_primitives::{Address, HexData, Quantity, H256};

use crate::error::ExecutorResult;
use crate::types::{
    BlockInfo, BlockSelector, LogFilter, LogInfo, ReceiptInfo, TransactionInfo,
    TransactionRequest,
};

/// Answers typed commands against some chain state
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    /// `web3_clientVersion`
    async fn client_version(&self) -> ExecutorResult<String>;

    /// `net_version`
    async fn net_version(&self) -> ExecutorResult<String>;

    /// `eth_chainId`
    async fn chain_id(&self) -> ExecutorResult<Quantity>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> ExecutorResult<Quantity>;

    /// `eth_blockNumber`
    async fn block_number(&self) -> ExecutorResult<Quantity>;

    /// `eth_getBalance`
    async fn balance(&self, address: Address, block: BlockSelector) -> ExecutorResult<Quantity>;

    /// `eth_getTransactionCount`
    async fn transaction_count(
        &self,
        address: Address,
        block: BlockSelector,
    ) -> ExecutorResult<Quantity>;

    /// `eth_getCode`
    async fn code(&self, address: Address, block: BlockSelector) -> ExecutorResult<HexData>;

    /// `eth_getStorageAt`
    async fn storage_at(
        &self,
        address: Address,
        position: Quantity,
        block: BlockSelector,
    ) -> ExecutorResult<HexData>;

    /// `eth_sendRawTransaction`; returns the transaction hash
    async fn send_raw_transaction(&self, data: HexData) -> ExecutorResult<H256>;

    /// `eth_call`
    async fn call(
        &self,
        request: TransactionRequest,
        block: BlockSelector,
    ) -> ExecutorResult<HexData>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, request: TransactionRequest) -> ExecutorResult<Quantity>;

    /// `eth_getBlockByNumber`
    async fn block_by_number(&self, block: BlockSelector, full: bool)
        -> ExecutorResult<BlockInfo>;

    /// `eth_getBlockByHash`
    async fn block_by_hash(&self, hash: H256, full: bool) -> ExecutorResult<BlockInfo>;

    /// `eth_getTransactionByHash`
    async fn transaction(&self, hash: H256) -> ExecutorResult<TransactionInfo>;

    /// `eth_getTransactionReceipt`
    async fn transaction_receipt(&self, hash: H256) -> ExecutorResult<ReceiptInfo>;

    /// `eth_getLogs`
    async fn logs(&self, filter: LogFilter) -> ExecutorResult<Vec<LogInfo>>;

    /// `evm_mine`; returns the new block number
    async fn mine_block(&self) -> ExecutorResult<Quantity>;
}
