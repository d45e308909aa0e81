//! RPC request and response types

use std::fmt;

use devchain_primitives::{Address, HexData, Quantity, H256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::schema::{Schema, WireType};

/// JSON-RPC request ID (can be number, string, or null)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// Numeric ID
    Number(u64),
    /// String ID
    String(String),
    /// Null ID
    #[default]
    Null,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID
    #[serde(default)]
    pub id: JsonRpcId,
    /// Method name
    pub method: String,
    /// Method parameters, `null` when absent
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a version 2.0 request
    pub fn new(id: JsonRpcId, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Request ID
    pub id: JsonRpcId,
    /// Result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create success response
    pub fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create error response
    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Named block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// Genesis block
    Earliest,
    /// Most recent mined block
    #[default]
    Latest,
    /// Block being assembled
    Pending,
}

impl BlockTag {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Earliest => "earliest",
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WireType for BlockTag {
    fn schema() -> Schema {
        Schema::Tag
    }
}

/// Block number or tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockSelector {
    /// Block by height
    Number(Quantity),
    /// Block by tag
    Tag(BlockTag),
}

impl Default for BlockSelector {
    fn default() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl From<BlockTag> for BlockSelector {
    fn from(tag: BlockTag) -> Self {
        Self::Tag(tag)
    }
}

impl From<u64> for BlockSelector {
    fn from(number: u64) -> Self {
        Self::Number(Quantity::from(number))
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSelector::Number(number) => write!(f, "{}", number),
            BlockSelector::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

impl WireType for BlockSelector {
    fn schema() -> Schema {
        Schema::BlockSelector
    }
}

/// Declares a camelCase wire record and its [`Schema::Record`]
macro_rules! wire_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident: $ty:ty => $wire:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $wire)]
                pub $field: $ty,
            )*
        }

        impl WireType for $name {
            fn schema() -> Schema {
                Schema::Record(vec![$(($wire, <$ty as WireType>::schema())),*])
            }
        }
    };
}

wire_record! {
    /// Transaction fields for `eth_call` and `eth_estimateGas`
    ///
    /// Absent fields are omitted from the wire form.
    pub struct TransactionRequest {
        /// Sender
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub from: Option<Address> => "from",
        /// Recipient, absent for contract creation
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub to: Option<Address> => "to",
        /// Gas limit
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub gas: Option<Quantity> => "gas",
        /// Gas price
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub gas_price: Option<Quantity> => "gasPrice",
        /// Sender nonce
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub nonce: Option<Quantity> => "nonce",
        /// Value in wei
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub value: Option<Quantity> => "value",
        /// Call data
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<HexData> => "data",
    }
}

wire_record! {
    /// Transaction as returned by `eth_getTransactionByHash`
    pub struct TransactionInfo {
        /// Transaction hash
        pub hash: H256 => "hash",
        /// Sender nonce
        pub nonce: Quantity => "nonce",
        /// Containing block, null while pending
        pub block_hash: Option<H256> => "blockHash",
        /// Containing block number, null while pending
        pub block_number: Option<Quantity> => "blockNumber",
        /// Index in the block, null while pending
        pub transaction_index: Option<Quantity> => "transactionIndex",
        /// Sender
        pub from: Address => "from",
        /// Recipient, null for contract creation
        pub to: Option<Address> => "to",
        /// Value in wei
        pub value: Quantity => "value",
        /// Gas price
        pub gas_price: Quantity => "gasPrice",
        /// Gas limit
        pub gas: Quantity => "gas",
        /// Call data
        pub input: HexData => "input",
        /// Signature recovery id
        pub v: Quantity => "v",
        /// Signature r
        pub r: Quantity => "r",
        /// Signature s
        pub s: Quantity => "s",
    }
}

wire_record! {
    /// Log entry emitted by a transaction
    pub struct LogInfo {
        /// Emitting contract
        pub address: Address => "address",
        /// Indexed topics
        pub topics: Vec<H256> => "topics",
        /// Non-indexed data
        pub data: HexData => "data",
        /// Containing block
        pub block_hash: H256 => "blockHash",
        /// Containing block number
        pub block_number: Quantity => "blockNumber",
        /// Emitting transaction
        pub transaction_hash: H256 => "transactionHash",
        /// Index of the transaction in the block
        pub transaction_index: Quantity => "transactionIndex",
        /// Index of the log in the block
        pub log_index: Quantity => "logIndex",
        /// Removed by a reorganization
        pub removed: bool => "removed",
    }
}

wire_record! {
    /// Receipt as returned by `eth_getTransactionReceipt`
    pub struct ReceiptInfo {
        /// Transaction hash
        pub transaction_hash: H256 => "transactionHash",
        /// Index in the block
        pub transaction_index: Quantity => "transactionIndex",
        /// Containing block
        pub block_hash: H256 => "blockHash",
        /// Containing block number
        pub block_number: Quantity => "blockNumber",
        /// Sender
        pub from: Address => "from",
        /// Recipient, null for contract creation
        pub to: Option<Address> => "to",
        /// Gas used by the block up to and including this transaction
        pub cumulative_gas_used: Quantity => "cumulativeGasUsed",
        /// Gas used by this transaction
        pub gas_used: Quantity => "gasUsed",
        /// Created contract, if any
        pub contract_address: Option<Address> => "contractAddress",
        /// Emitted logs
        pub logs: Vec<LogInfo> => "logs",
        /// Bloom filter of the logs
        pub logs_bloom: HexData => "logsBloom",
        /// 1 on success, 0 on failure
        pub status: Quantity => "status",
    }
}

/// One topic position of a log filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicFilter {
    /// Exactly this topic
    Exact(H256),
    /// Any of these topics; an empty list matches anything
    AnyOf(Vec<H256>),
}

impl TopicFilter {
    /// Whether a log topic at this position satisfies the filter
    pub fn matches(&self, topic: Option<&H256>) -> bool {
        match self {
            TopicFilter::Exact(expected) => topic == Some(expected),
            TopicFilter::AnyOf(options) => {
                options.is_empty() || topic.map_or(false, |topic| options.contains(topic))
            }
        }
    }
}

impl From<H256> for TopicFilter {
    fn from(topic: H256) -> Self {
        TopicFilter::Exact(topic)
    }
}

impl From<Vec<H256>> for TopicFilter {
    fn from(topics: Vec<H256>) -> Self {
        TopicFilter::AnyOf(topics)
    }
}

impl WireType for TopicFilter {
    fn schema() -> Schema {
        Schema::OneOf(vec![Schema::Hash, <Vec<H256>>::schema()])
    }
}

wire_record! {
    /// Filter for `eth_getLogs`
    pub struct LogFilter {
        /// First block, inclusive
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub from_block: Option<BlockSelector> => "fromBlock",
        /// Last block, inclusive
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub to_block: Option<BlockSelector> => "toBlock",
        /// Emitting contract
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub address: Option<Address> => "address",
        /// Topic filters by position, null matches anything
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub topics: Option<Vec<Option<TopicFilter>>> => "topics",
        /// Single block by hash
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub block_hash: Option<H256> => "blockHash",
    }
}

/// Block transactions: hashes, or full objects when requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    /// Transaction hashes
    Hashes(Vec<H256>),
    /// Full transaction objects
    Full(Vec<TransactionInfo>),
}

impl Default for BlockTransactions {
    fn default() -> Self {
        Self::Hashes(Vec::new())
    }
}

impl BlockTransactions {
    /// Number of transactions
    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Hashes(hashes) => hashes.len(),
            BlockTransactions::Full(transactions) => transactions.len(),
        }
    }

    /// Whether the block has no transactions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WireType for BlockTransactions {
    fn schema() -> Schema {
        Schema::OneOf(vec![
            <Vec<H256>>::schema(),
            <Vec<TransactionInfo>>::schema(),
        ])
    }
}

wire_record! {
    /// Block as returned by `eth_getBlockByNumber` and `eth_getBlockByHash`
    pub struct BlockInfo {
        /// Block height
        pub number: Quantity => "number",
        /// Block hash
        pub hash: H256 => "hash",
        /// Parent hash
        pub parent_hash: H256 => "parentHash",
        /// Proof-of-work nonce (8 bytes)
        pub nonce: HexData => "nonce",
        /// Hash of the uncle list
        pub sha3_uncles: H256 => "sha3Uncles",
        /// Bloom filter of all logs
        pub logs_bloom: HexData => "logsBloom",
        /// Transaction trie root
        pub transactions_root: H256 => "transactionsRoot",
        /// State trie root
        pub state_root: H256 => "stateRoot",
        /// Receipt trie root
        pub receipts_root: H256 => "receiptsRoot",
        /// Beneficiary
        pub miner: Address => "miner",
        /// Difficulty
        pub difficulty: Quantity => "difficulty",
        /// Total difficulty up to this block
        pub total_difficulty: Quantity => "totalDifficulty",
        /// Extra data
        pub extra_data: HexData => "extraData",
        /// Encoded size in bytes
        pub size: Quantity => "size",
        /// Gas limit
        pub gas_limit: Quantity => "gasLimit",
        /// Gas used
        pub gas_used: Quantity => "gasUsed",
        /// Unix timestamp
        pub timestamp: Quantity => "timestamp",
        /// Transactions
        pub transactions: BlockTransactions => "transactions",
        /// Uncle hashes
        pub uncles: Vec<H256> => "uncles",
    }
}
