//! Provider requests
//!
//! [`ProviderRequest::parse`] turns an ethers-style `(method, params)` pair
//! into a typed request. Every recognized request maps onto exactly one
//! registry [`Command`]; anything else is kept verbatim for the fallback.

use devchain_primitives::{Address, HexData, Quantity, H256};
use devchain_rpc::{BlockSelector, BlockTag, Command, LogFilter, TransactionRequest};
use serde_json::{Map, Value};

use crate::error::{ProviderError, ProviderResult};
use crate::transaction::{
    normalize_transaction, present, to_address, to_hash, to_hex_data, to_quantity,
};

/// Block addressed by `getBlock`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    /// By number or tag
    Selector(BlockSelector),
    /// By hash
    Hash(H256),
}

/// Typed provider request
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRequest {
    /// `getChainId`
    GetChainId,
    /// `getBlockNumber`
    GetBlockNumber,
    /// `getGasPrice`
    GetGasPrice,
    /// `getBalance`
    GetBalance {
        /// Account
        address: Address,
        /// Block to read at
        block: BlockSelector,
    },
    /// `getTransactionCount`
    GetTransactionCount {
        /// Account
        address: Address,
        /// Block to read at
        block: BlockSelector,
    },
    /// `getCode`
    GetCode {
        /// Account
        address: Address,
        /// Block to read at
        block: BlockSelector,
    },
    /// `getStorageAt`
    GetStorageAt {
        /// Account
        address: Address,
        /// Storage slot
        position: Quantity,
        /// Block to read at
        block: BlockSelector,
    },
    /// `sendTransaction`
    SendTransaction {
        /// Signed, encoded transaction
        signed_transaction: HexData,
    },
    /// `call`
    Call {
        /// Normalized transaction
        transaction: TransactionRequest,
        /// Block to call at
        block: BlockSelector,
    },
    /// `estimateGas`
    EstimateGas {
        /// Normalized transaction
        transaction: TransactionRequest,
    },
    /// `getBlock`
    GetBlock {
        /// Requested block
        block: BlockId,
        /// Return full transaction objects
        include_transactions: bool,
    },
    /// `getTransaction`
    GetTransaction {
        /// Transaction hash
        hash: H256,
    },
    /// `getTransactionReceipt`
    GetTransactionReceipt {
        /// Transaction hash
        hash: H256,
    },
    /// `getLogs`
    GetLogs {
        /// Log filter
        filter: LogFilter,
    },
    /// `mineBlock`
    MineBlock,
    /// Any other method, forwarded untouched
    Passthrough {
        /// Method name
        method: String,
        /// Original parameters
        params: Value,
    },
}

/// Where a request is answered
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// By a registry command
    Command(Command),
    /// By the fallback provider
    Fallback {
        /// Method name
        method: String,
        /// Original parameters
        params: Value,
    },
}

impl ProviderRequest {
    /// Parse a method and its parameter bag
    ///
    /// `default_block` is used wherever `blockTag` is absent.
    pub fn parse(method: &str, params: Value, default_block: BlockSelector) -> ProviderResult<Self> {
        let request = match method {
            "getChainId" => Self::GetChainId,
            "getBlockNumber" => Self::GetBlockNumber,
            "getGasPrice" => Self::GetGasPrice,
            "mineBlock" => Self::MineBlock,
            "getBalance" | "getTransactionCount" | "getCode" | "getStorageAt" | "sendTransaction"
            | "call" | "estimateGas" | "getBlock" | "getTransaction" | "getTransactionReceipt"
            | "getLogs" => {
                let empty = Map::new();
                let bag = match &params {
                    Value::Object(bag) => bag,
                    Value::Null => &empty,
                    _ => return Err(ProviderError::invalid("params", "expected an object")),
                };
                Self::parse_bag(method, bag, default_block)?
            }
            _ => Self::Passthrough {
                method: method.to_string(),
                params,
            },
        };
        Ok(request)
    }

    fn parse_bag(
        method: &str,
        bag: &Map<String, Value>,
        default_block: BlockSelector,
    ) -> ProviderResult<Self> {
        let block = || block_tag(bag).map(|tag| tag.unwrap_or(default_block));

        let request = match method {
            "getBalance" => Self::GetBalance {
                address: required(bag, "address", to_address)?,
                block: block()?,
            },
            "getTransactionCount" => Self::GetTransactionCount {
                address: required(bag, "address", to_address)?,
                block: block()?,
            },
            "getCode" => Self::GetCode {
                address: required(bag, "address", to_address)?,
                block: block()?,
            },
            "getStorageAt" => Self::GetStorageAt {
                address: required(bag, "address", to_address)?,
                position: required(bag, "position", to_quantity)?,
                block: block()?,
            },
            "sendTransaction" => Self::SendTransaction {
                signed_transaction: required(bag, "signedTransaction", to_hex_data)?,
            },
            "call" => Self::Call {
                transaction: required(bag, "transaction", normalize_transaction)?,
                block: block()?,
            },
            "estimateGas" => Self::EstimateGas {
                transaction: required(bag, "transaction", normalize_transaction)?,
            },
            "getBlock" => {
                let block = match block_tag(bag)? {
                    Some(selector) => BlockId::Selector(selector),
                    None => match optional(bag, "blockHash", to_hash)? {
                        Some(hash) => BlockId::Hash(hash),
                        None => BlockId::Selector(default_block),
                    },
                };
                let include_transactions = match present(bag, "includeTransactions") {
                    None => false,
                    Some(Value::Bool(include)) => *include,
                    Some(_) => {
                        return Err(ProviderError::invalid("includeTransactions", "expected a boolean"))
                    }
                };
                Self::GetBlock {
                    block,
                    include_transactions,
                }
            }
            "getTransaction" => Self::GetTransaction {
                hash: required(bag, "transactionHash", to_hash)?,
            },
            "getTransactionReceipt" => Self::GetTransactionReceipt {
                hash: required(bag, "transactionHash", to_hash)?,
            },
            "getLogs" => Self::GetLogs {
                filter: match present(bag, "filter") {
                    Some(filter) => serde_json::from_value(filter.clone())
                        .map_err(|e| ProviderError::invalid("filter", e))?,
                    None => LogFilter::default(),
                },
            },
            other => {
                return Ok(Self::Passthrough {
                    method: other.to_string(),
                    params: Value::Object(bag.clone()),
                })
            }
        };
        Ok(request)
    }

    /// Decide how the request is answered
    pub fn route(self) -> Route {
        let command = match self {
            Self::GetChainId => Command::ChainId {},
            Self::GetBlockNumber => Command::BlockNumber {},
            Self::GetGasPrice => Command::GasPrice {},
            Self::GetBalance { address, block } => Command::GetBalance { address, block },
            Self::GetTransactionCount { address, block } => {
                Command::GetTransactionCount { address, block }
            }
            Self::GetCode { address, block } => Command::GetCode { address, block },
            Self::GetStorageAt {
                address,
                position,
                block,
            } => Command::GetStorageAt {
                address,
                position,
                block,
            },
            Self::SendTransaction { signed_transaction } => Command::SendRawTransaction {
                data: signed_transaction,
            },
            Self::Call { transaction, block } => Command::Call {
                request: transaction,
                block,
            },
            Self::EstimateGas { transaction } => Command::EstimateGas {
                request: transaction,
            },
            Self::GetBlock {
                block: BlockId::Selector(block),
                include_transactions,
            } => Command::GetBlockByNumber {
                block,
                full: include_transactions,
            },
            Self::GetBlock {
                block: BlockId::Hash(hash),
                include_transactions,
            } => Command::GetBlockByHash {
                hash,
                full: include_transactions,
            },
            Self::GetTransaction { hash } => Command::GetTransactionByHash { hash },
            Self::GetTransactionReceipt { hash } => Command::GetTransactionReceipt { hash },
            Self::GetLogs { filter } => Command::GetLogs { filter },
            Self::MineBlock => Command::Mine {},
            Self::Passthrough { method, params } => return Route::Fallback { method, params },
        };
        Route::Command(command)
    }
}

fn required<T>(
    bag: &Map<String, Value>,
    name: &str,
    convert: fn(&str, &Value) -> ProviderResult<T>,
) -> ProviderResult<T> {
    optional(bag, name, convert)?.ok_or_else(|| ProviderError::MissingField(name.to_string()))
}

fn optional<T>(
    bag: &Map<String, Value>,
    name: &str,
    convert: fn(&str, &Value) -> ProviderResult<T>,
) -> ProviderResult<Option<T>> {
    present(bag, name).map(|value| convert(name, value)).transpose()
}

/// `blockTag` as a tag name or any quantity form
fn block_tag(bag: &Map<String, Value>) -> ProviderResult<Option<BlockSelector>> {
    match present(bag, "blockTag") {
        None => Ok(None),
        Some(Value::String(tag)) if tag == "earliest" => Ok(Some(BlockTag::Earliest.into())),
        Some(Value::String(tag)) if tag == "latest" => Ok(Some(BlockTag::Latest.into())),
        Some(Value::String(tag)) if tag == "pending" => Ok(Some(BlockTag::Pending.into())),
        Some(value) => to_quantity("blockTag", value).map(|n| Some(BlockSelector::Number(n))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    fn parse(method: &str, params: Value) -> ProviderResult<ProviderRequest> {
        ProviderRequest::parse(method, params, BlockSelector::default())
    }

    #[test]
    fn test_missing_block_tag_defaults() {
        let request = parse("getBalance", json!({"address": ADDRESS})).unwrap();
        assert_eq!(
            request,
            ProviderRequest::GetBalance {
                address: ADDRESS.parse().unwrap(),
                block: BlockSelector::Tag(BlockTag::Latest),
            }
        );

        let request =
            ProviderRequest::parse("getCode", json!({"address": ADDRESS}), BlockTag::Pending.into())
                .unwrap();
        assert!(matches!(
            request,
            ProviderRequest::GetCode { block: BlockSelector::Tag(BlockTag::Pending), .. }
        ));
    }

    #[test]
    fn test_block_tag_number_forms() {
        for tag in [json!("0x0a"), json!(10), json!("0xa")] {
            let request = parse("getBalance", json!({"address": ADDRESS, "blockTag": tag})).unwrap();
            assert!(matches!(
                request,
                ProviderRequest::GetBalance { block, .. } if block == BlockSelector::from(10)
            ));
        }
        assert!(parse("getBalance", json!({"address": ADDRESS, "blockTag": "safe"})).is_err());
    }

    #[test]
    fn test_missing_required_field() {
        assert_eq!(
            parse("getBalance", json!({})).unwrap_err(),
            ProviderError::MissingField("address".into())
        );
        assert_eq!(
            parse("getTransaction", Value::Null).unwrap_err(),
            ProviderError::MissingField("transactionHash".into())
        );
    }

    #[test]
    fn test_get_block_selection() {
        let hash = format!("0x{}", "ab".repeat(32));
        let by_hash = parse("getBlock", json!({"blockHash": hash})).unwrap();
        assert!(matches!(
            by_hash,
            ProviderRequest::GetBlock { block: BlockId::Hash(_), include_transactions: false }
        ));

        let both = parse("getBlock", json!({"blockTag": "earliest", "blockHash": hash})).unwrap();
        assert!(matches!(
            both,
            ProviderRequest::GetBlock {
                block: BlockId::Selector(BlockSelector::Tag(BlockTag::Earliest)),
                ..
            }
        ));

        let neither = parse("getBlock", json!({"includeTransactions": true})).unwrap();
        assert_eq!(
            neither,
            ProviderRequest::GetBlock {
                block: BlockId::Selector(BlockSelector::Tag(BlockTag::Latest)),
                include_transactions: true,
            }
        );
    }

    #[test]
    fn test_unknown_method_is_passthrough() {
        let params = json!({"anything": [1, 2, 3]});
        let request = parse("resolveName", params.clone()).unwrap();
        assert_eq!(
            request.route(),
            Route::Fallback {
                method: "resolveName".into(),
                params,
            }
        );
    }

    #[test]
    fn test_route_to_command() {
        let request = parse("getBlock", json!({"blockTag": "0x1"})).unwrap();
        assert_eq!(
            request.route(),
            Route::Command(Command::GetBlockByNumber {
                block: BlockSelector::from(1),
                full: false,
            })
        );
        assert_eq!(
            parse("mineBlock", Value::Null).unwrap().route(),
            Route::Command(Command::Mine {})
        );
    }

    #[test]
    fn test_get_logs_filter() {
        let request = parse(
            "getLogs",
            json!({"filter": {"fromBlock": "earliest", "address": ADDRESS}}),
        )
        .unwrap();
        match request {
            ProviderRequest::GetLogs { filter } => {
                assert_eq!(filter.from_block, Some(BlockTag::Earliest.into()));
                assert_eq!(filter.address, Some(ADDRESS.parse().unwrap()));
            }
            other => panic!("unexpected request: {:?}", other),
        }
        assert!(parse("getLogs", json!({"filter": {"address": "0x12"}})).is_err());
    }
}
