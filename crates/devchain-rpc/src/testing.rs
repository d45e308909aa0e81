//! In-memory executor for tests
//!
//! Every submitted transaction is mined into its own block immediately.

use std::collections::HashMap;

use async_trait::async_trait;
use devchain_primitives::{Address, HexData, Quantity, H256, U256};
use sha3::{Digest, Keccak256};
use tokio::sync::RwLock;

use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::ChainExecutor;
use crate::types::{
    BlockInfo, BlockSelector, BlockTag, BlockTransactions, LogFilter, LogInfo, ReceiptInfo,
    TransactionInfo, TransactionRequest,
};

/// Default client version string
pub const CLIENT_VERSION: &str = concat!("devchain/v", env!("CARGO_PKG_VERSION"));

/// Default chain id
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Default gas price (1 gwei)
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;

const BLOCK_GAS_LIMIT: u64 = 30_000_000;
const TX_BASE_GAS: u64 = 21_000;
const TX_DATA_GAS: u64 = 16;

#[derive(Default)]
struct ChainState {
    gas_price: U256,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    code: HashMap<Address, HexData>,
    storage: HashMap<(Address, U256), H256>,
    blocks: Vec<BlockInfo>,
    transactions: HashMap<H256, TransactionInfo>,
    receipts: HashMap<H256, ReceiptInfo>,
    call_result: HexData,
    requests: Vec<TransactionRequest>,
}

impl ChainState {
    fn head(&self) -> u64 {
        self.blocks.len().saturating_sub(1) as u64
    }

    fn resolve(&self, block: &BlockSelector) -> ExecutorResult<u64> {
        match block {
            BlockSelector::Tag(BlockTag::Earliest) => Ok(0),
            BlockSelector::Tag(_) => Ok(self.head()),
            BlockSelector::Number(number) => number
                .as_u64()
                .filter(|n| *n <= self.head())
                .ok_or_else(|| ExecutorError::NotFound(format!("block {}", number))),
        }
    }

    fn push_block(&mut self, transactions: Vec<H256>) -> u64 {
        let number = self.blocks.len() as u64;
        let parent_hash = self.blocks.last().map(|b| b.hash).unwrap_or_default();
        let gas_used: u64 = transactions
            .iter()
            .filter_map(|hash| self.receipts.get(hash))
            .filter_map(|receipt| receipt.gas_used.as_u64())
            .sum();
        self.blocks.push(BlockInfo {
            number: number.into(),
            hash: block_hash(number),
            parent_hash,
            nonce: HexData::new(vec![0u8; 8]),
            logs_bloom: HexData::new(vec![0u8; 256]),
            gas_limit: BLOCK_GAS_LIMIT.into(),
            gas_used: gas_used.into(),
            timestamp: number.into(),
            transactions: BlockTransactions::Hashes(transactions),
            ..Default::default()
        });
        number
    }

    fn block(&self, number: u64, full: bool) -> ExecutorResult<BlockInfo> {
        let mut block = self
            .blocks
            .get(number as usize)
            .cloned()
            .ok_or_else(|| ExecutorError::NotFound(format!("block {}", number)))?;
        if full {
            if let BlockTransactions::Hashes(hashes) = &block.transactions {
                let full = hashes
                    .iter()
                    .filter_map(|hash| self.transactions.get(hash).cloned())
                    .collect();
                block.transactions = BlockTransactions::Full(full);
            }
        }
        Ok(block)
    }
}

fn keccak(data: &[u8]) -> H256 {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    H256::from_bytes(out)
}

fn block_hash(number: u64) -> H256 {
    keccak(&number.to_be_bytes())
}

/// [`ChainExecutor`] backed by in-memory maps
pub struct MemoryExecutor {
    chain_id: u64,
    client_version: String,
    state: RwLock<ChainState>,
}

impl Default for MemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryExecutor {
    /// Create an executor holding only the genesis block
    pub fn new() -> Self {
        Self::with_chain_id(DEFAULT_CHAIN_ID)
    }

    /// Create an executor for a specific chain id
    pub fn with_chain_id(chain_id: u64) -> Self {
        let mut state = ChainState {
            gas_price: U256::from(DEFAULT_GAS_PRICE),
            ..Default::default()
        };
        state.push_block(Vec::new());
        Self {
            chain_id,
            client_version: CLIENT_VERSION.to_string(),
            state: RwLock::new(state),
        }
    }

    /// Set an account balance
    pub async fn set_balance(&self, address: Address, balance: U256) {
        self.state.write().await.balances.insert(address, balance);
    }

    /// Set an account nonce
    pub async fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.write().await.nonces.insert(address, nonce);
    }

    /// Set the code at an address
    pub async fn set_code(&self, address: Address, code: HexData) {
        self.state.write().await.code.insert(address, code);
    }

    /// Set a storage slot
    pub async fn set_storage(&self, address: Address, slot: U256, value: H256) {
        self.state.write().await.storage.insert((address, slot), value);
    }

    /// Set the gas price
    pub async fn set_gas_price(&self, price: U256) {
        self.state.write().await.gas_price = price;
    }

    /// Set the data returned by `eth_call`
    pub async fn set_call_result(&self, data: HexData) {
        self.state.write().await.call_result = data;
    }

    /// Attach logs to a stored receipt
    pub async fn add_logs(&self, transaction: H256, logs: Vec<LogInfo>) -> ExecutorResult<()> {
        let mut state = self.state.write().await;
        let receipt = state
            .receipts
            .get_mut(&transaction)
            .ok_or_else(|| ExecutorError::NotFound(format!("receipt {}", transaction)))?;
        receipt.logs.extend(logs);
        Ok(())
    }

    /// Transaction requests received by `eth_call` and `eth_estimateGas`, in order
    pub async fn requests(&self) -> Vec<TransactionRequest> {
        self.state.read().await.requests.clone()
    }
}

#[async_trait]
impl ChainExecutor for MemoryExecutor {
    async fn client_version(&self) -> ExecutorResult<String> {
        Ok(self.client_version.clone())
    }

    async fn net_version(&self) -> ExecutorResult<String> {
        Ok(self.chain_id.to_string())
    }

    async fn chain_id(&self) -> ExecutorResult<Quantity> {
        Ok(self.chain_id.into())
    }

    async fn gas_price(&self) -> ExecutorResult<Quantity> {
        Ok(self.state.read().await.gas_price.into())
    }

    async fn block_number(&self) -> ExecutorResult<Quantity> {
        Ok(self.state.read().await.head().into())
    }

    async fn balance(&self, address: Address, block: BlockSelector) -> ExecutorResult<Quantity> {
        let state = self.state.read().await;
        state.resolve(&block)?;
        Ok(state.balances.get(&address).copied().unwrap_or_default().into())
    }

    async fn transaction_count(
        &self,
        address: Address,
        block: BlockSelector,
    ) -> ExecutorResult<Quantity> {
        let state = self.state.read().await;
        state.resolve(&block)?;
        Ok(state.nonces.get(&address).copied().unwrap_or_default().into())
    }

    async fn code(&self, address: Address, block: BlockSelector) -> ExecutorResult<HexData> {
        let state = self.state.read().await;
        state.resolve(&block)?;
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }

    async fn storage_at(
        &self,
        address: Address,
        position: Quantity,
        block: BlockSelector,
    ) -> ExecutorResult<HexData> {
        let state = self.state.read().await;
        state.resolve(&block)?;
        let word = state
            .storage
            .get(&(address, position.as_u256()))
            .copied()
            .unwrap_or_default();
        Ok(HexData::from(word.as_bytes().as_slice()))
    }

    async fn send_raw_transaction(&self, data: HexData) -> ExecutorResult<H256> {
        if data.is_empty() {
            return Err(ExecutorError::Rejected("empty transaction".to_string()));
        }
        let hash = keccak(&data);
        let mut state = self.state.write().await;
        if state.transactions.contains_key(&hash) {
            return Err(ExecutorError::Rejected(format!("known transaction {}", hash)));
        }

        let number = state.head() + 1;
        let block_hash = block_hash(number);
        let gas = TX_BASE_GAS + TX_DATA_GAS * data.len() as u64;
        let gas_price = state.gas_price;
        state.transactions.insert(
            hash,
            TransactionInfo {
                hash,
                block_hash: Some(block_hash),
                block_number: Some(number.into()),
                transaction_index: Some(Quantity::ZERO),
                gas_price: gas_price.into(),
                gas: gas.into(),
                input: data,
                ..Default::default()
            },
        );
        state.receipts.insert(
            hash,
            ReceiptInfo {
                transaction_hash: hash,
                block_hash,
                block_number: number.into(),
                cumulative_gas_used: gas.into(),
                gas_used: gas.into(),
                logs_bloom: HexData::new(vec![0u8; 256]),
                status: 1u64.into(),
                ..Default::default()
            },
        );
        state.push_block(vec![hash]);
        Ok(hash)
    }

    async fn call(
        &self,
        request: TransactionRequest,
        block: BlockSelector,
    ) -> ExecutorResult<HexData> {
        let mut state = self.state.write().await;
        state.resolve(&block)?;
        state.requests.push(request);
        Ok(state.call_result.clone())
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> ExecutorResult<Quantity> {
        let data_len = request.data.as_ref().map(|d| d.len()).unwrap_or(0) as u64;
        self.state.write().await.requests.push(request);
        Ok((TX_BASE_GAS + TX_DATA_GAS * data_len).into())
    }

    async fn block_by_number(
        &self,
        block: BlockSelector,
        full: bool,
    ) -> ExecutorResult<BlockInfo> {
        let state = self.state.read().await;
        let number = state.resolve(&block)?;
        state.block(number, full)
    }

    async fn block_by_hash(&self, hash: H256, full: bool) -> ExecutorResult<BlockInfo> {
        let state = self.state.read().await;
        let number = state
            .blocks
            .iter()
            .position(|b| b.hash == hash)
            .ok_or_else(|| ExecutorError::NotFound(format!("block {}", hash)))?;
        state.block(number as u64, full)
    }

    async fn transaction(&self, hash: H256) -> ExecutorResult<TransactionInfo> {
        self.state
            .read()
            .await
            .transactions
            .get(&hash)
            .cloned()
            .ok_or_else(|| ExecutorError::NotFound(format!("transaction {}", hash)))
    }

    async fn transaction_receipt(&self, hash: H256) -> ExecutorResult<ReceiptInfo> {
        self.state
            .read()
            .await
            .receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| ExecutorError::NotFound(format!("receipt {}", hash)))
    }

    async fn logs(&self, filter: LogFilter) -> ExecutorResult<Vec<LogInfo>> {
        let state = self.state.read().await;
        let from = match &filter.from_block {
            Some(block) => state.resolve(block)?,
            None => state.head(),
        };
        let to = match &filter.to_block {
            Some(block) => state.resolve(block)?,
            None => state.head(),
        };

        let mut logs: Vec<LogInfo> = state
            .receipts
            .values()
            .flat_map(|receipt| receipt.logs.iter())
            .filter(|log| match filter.block_hash {
                Some(hash) => log.block_hash == hash,
                None => log
                    .block_number
                    .as_u64()
                    .map(|n| (from..=to).contains(&n))
                    .unwrap_or(false),
            })
            .filter(|log| filter.address.map_or(true, |address| log.address == address))
            .filter(|log| match &filter.topics {
                Some(topics) => topics.iter().enumerate().all(|(i, topic)| {
                    topic
                        .as_ref()
                        .map_or(true, |topic| topic.matches(log.topics.get(i)))
                }),
                None => true,
            })
            .cloned()
            .collect();
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    async fn mine_block(&self) -> ExecutorResult<Quantity> {
        Ok(self.state.write().await.push_block(Vec::new()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[tokio::test]
    async fn test_genesis_only() {
        let executor = MemoryExecutor::new();
        assert_eq!(executor.block_number().await.unwrap(), Quantity::ZERO);
        assert_eq!(executor.chain_id().await.unwrap(), Quantity::from(1337u64));
        assert_eq!(executor.net_version().await.unwrap(), "1337");
    }

    #[tokio::test]
    async fn test_future_block_not_found() {
        let executor = MemoryExecutor::new();
        let err = executor
            .balance(address(1), BlockSelector::from(5))
            .await
            .unwrap_err();
        assert_eq!(err, ExecutorError::NotFound("block 0x5".to_string()));
    }

    #[tokio::test]
    async fn test_send_raw_transaction_mines_block() {
        let executor = MemoryExecutor::new();
        let hash = executor
            .send_raw_transaction(HexData::new(vec![0xf8, 0x6b]))
            .await
            .unwrap();
        assert_eq!(executor.block_number().await.unwrap(), Quantity::from(1u64));

        let receipt = executor.transaction_receipt(hash).await.unwrap();
        assert_eq!(receipt.block_number, Quantity::from(1u64));
        assert_eq!(receipt.status, Quantity::from(1u64));

        let block = executor.block_by_hash(receipt.block_hash, false).await.unwrap();
        assert_eq!(block.transactions, BlockTransactions::Hashes(vec![hash]));
    }

    #[tokio::test]
    async fn test_empty_and_duplicate_transactions_rejected() {
        let executor = MemoryExecutor::new();
        assert!(matches!(
            executor.send_raw_transaction(HexData::empty()).await,
            Err(ExecutorError::Rejected(_))
        ));
        let tx = HexData::new(vec![1, 2, 3]);
        executor.send_raw_transaction(tx.clone()).await.unwrap();
        assert!(matches!(
            executor.send_raw_transaction(tx).await,
            Err(ExecutorError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_word() {
        let executor = MemoryExecutor::new();
        let value = H256::from_bytes([7u8; 32]);
        executor.set_storage(address(2), U256::from(3), value).await;
        let word = executor
            .storage_at(address(2), Quantity::from(3u64), BlockSelector::default())
            .await
            .unwrap();
        assert_eq!(word.as_bytes(), value.as_bytes());
    }

    #[tokio::test]
    async fn test_logs_filtered_by_address_and_topic() {
        let executor = MemoryExecutor::new();
        let hash = executor
            .send_raw_transaction(HexData::new(vec![9]))
            .await
            .unwrap();
        let topic = H256::from_bytes([1u8; 32]);
        let log = |addr, log_index: u64| LogInfo {
            address: addr,
            topics: vec![topic],
            block_hash: block_hash(1),
            block_number: 1u64.into(),
            transaction_hash: hash,
            log_index: log_index.into(),
            ..Default::default()
        };
        executor
            .add_logs(hash, vec![log(address(1), 0), log(address(2), 1)])
            .await
            .unwrap();

        let filter = LogFilter {
            address: Some(address(2)),
            topics: Some(vec![Some(topic.into())]),
            ..Default::default()
        };
        let logs = executor.logs(filter).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].address, address(2));

        let filter = LogFilter {
            from_block: Some(BlockTag::Earliest.into()),
            topics: Some(vec![Some(H256::ZERO.into())]),
            ..Default::default()
        };
        assert!(executor.logs(filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logs_topic_array_is_or() {
        let executor = MemoryExecutor::new();
        let hash = executor
            .send_raw_transaction(HexData::new(vec![9]))
            .await
            .unwrap();
        let (a, b, c) = (
            H256::from_bytes([0xa; 32]),
            H256::from_bytes([0xb; 32]),
            H256::from_bytes([0xc; 32]),
        );
        let log = |topic, log_index: u64| LogInfo {
            address: address(1),
            topics: vec![topic],
            block_hash: block_hash(1),
            block_number: 1u64.into(),
            transaction_hash: hash,
            log_index: log_index.into(),
            ..Default::default()
        };
        executor
            .add_logs(hash, vec![log(a, 0), log(b, 1), log(c, 2)])
            .await
            .unwrap();

        let filter = LogFilter {
            topics: Some(vec![Some(vec![a, c].into())]),
            ..Default::default()
        };
        let topics: Vec<H256> = executor
            .logs(filter)
            .await
            .unwrap()
            .into_iter()
            .map(|log| log.topics[0])
            .collect();
        assert_eq!(topics, vec![a, c]);

        let filter = LogFilter {
            topics: Some(vec![Some(Vec::<H256>::new().into()), Some(a.into())]),
            ..Default::default()
        };
        assert!(executor.logs(filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requests_recorded_in_order() {
        let executor = MemoryExecutor::new();
        let first = TransactionRequest {
            value: Some(Quantity::ZERO),
            ..Default::default()
        };
        let second = TransactionRequest {
            data: Some(HexData::new(vec![1, 2])),
            ..Default::default()
        };
        executor.call(first.clone(), BlockSelector::default()).await.unwrap();
        let gas = executor.estimate_gas(second.clone()).await.unwrap();
        assert_eq!(gas, Quantity::from(21_032u64));
        assert_eq!(executor.requests().await, vec![first, second]);
    }
}
