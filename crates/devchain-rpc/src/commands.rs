//! Typed commands
//!
//! The `define_commands!` table below is the single declaration of every
//! method: it produces the registry descriptors, the [`Command`] enum and the
//! dispatch onto [`ChainExecutor`].

use devchain_primitives::{Address, HexData, Quantity, H256};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RpcError, RpcResult};
use crate::executor::ChainExecutor;
use crate::registry::{CommandDescriptor, CommandRegistry};
use crate::schema::WireType;
use crate::types::{
    BlockInfo, BlockSelector, LogFilter, LogInfo, ReceiptInfo, TransactionInfo,
    TransactionRequest,
};

macro_rules! define_commands {
    ($(
        $(#[$doc:meta])*
        $variant:ident = $method:literal => $exec:ident($($arg:ident: $ty:ty),*) -> $ret:ty;
    )*) => {
        /// A decoded request for one registered method
        #[derive(Debug, Clone, PartialEq)]
        #[allow(missing_docs)]
        pub enum Command {
            $(
                $(#[$doc])*
                $variant { $($arg: $ty),* },
            )*
        }

        impl Command {
            /// Wire method name
            pub fn method(&self) -> &'static str {
                match self {
                    $(Command::$variant { .. } => $method,)*
                }
            }

            /// Validate raw parameters and decode them into a command
            pub fn from_request(method: &str, params: &Value) -> RpcResult<Self> {
                let descriptor = CommandRegistry::global().descriptor(method)?;
                descriptor.validate_params(params)?;
                match descriptor.name {
                    $(
                        $method => {
                            let ($($arg,)*): ($($ty,)*) = decode_params($method, params)?;
                            Ok(Command::$variant { $($arg),* })
                        }
                    )*
                    other => Err(RpcError::UnknownMethod(other.to_string())),
                }
            }

            async fn run<E: ChainExecutor + ?Sized>(
                self,
                executor: &E,
                check_result: bool,
            ) -> RpcResult<Value> {
                match self {
                    $(
                        Command::$variant { $($arg),* } => {
                            debug!(method = $method, "executing command");
                            let result: $ret = executor.$exec($($arg),*).await?;
                            encode_result($method, &result, check_result)
                        }
                    )*
                }
            }
        }

        pub(crate) fn descriptors() -> Vec<CommandDescriptor> {
            vec![
                $(
                    CommandDescriptor::new(
                        $method,
                        <($($ty,)*) as WireType>::schema(),
                        <$ret as WireType>::schema(),
                    ),
                )*
            ]
        }
    };
}

define_commands! {
    /// `web3_clientVersion`
    ClientVersion = "web3_clientVersion" => client_version() -> String;
    /// `net_version`
    NetVersion = "net_version" => net_version() -> String;
    /// `eth_chainId`
    ChainId = "eth_chainId" => chain_id() -> Quantity;
    /// `eth_gasPrice`
    GasPrice = "eth_gasPrice" => gas_price() -> Quantity;
    /// `eth_blockNumber`
    BlockNumber = "eth_blockNumber" => block_number() -> Quantity;
    /// `eth_getBalance`
    GetBalance = "eth_getBalance" => balance(address: Address, block: BlockSelector) -> Quantity;
    /// `eth_getTransactionCount`
    GetTransactionCount = "eth_getTransactionCount"
        => transaction_count(address: Address, block: BlockSelector) -> Quantity;
    /// `eth_getCode`
    GetCode = "eth_getCode" => code(address: Address, block: BlockSelector) -> HexData;
    /// `eth_getStorageAt`
    GetStorageAt = "eth_getStorageAt"
        => storage_at(address: Address, position: Quantity, block: BlockSelector) -> HexData;
    /// `eth_sendRawTransaction`
    SendRawTransaction = "eth_sendRawTransaction" => send_raw_transaction(data: HexData) -> H256;
    /// `eth_call`
    Call = "eth_call" => call(request: TransactionRequest, block: BlockSelector) -> HexData;
    /// `eth_estimateGas`
    EstimateGas = "eth_estimateGas" => estimate_gas(request: TransactionRequest) -> Quantity;
    /// `eth_getBlockByNumber`
    GetBlockByNumber = "eth_getBlockByNumber"
        => block_by_number(block: BlockSelector, full: bool) -> BlockInfo;
    /// `eth_getBlockByHash`
    GetBlockByHash = "eth_getBlockByHash" => block_by_hash(hash: H256, full: bool) -> BlockInfo;
    /// `eth_getTransactionByHash`
    GetTransactionByHash = "eth_getTransactionByHash" => transaction(hash: H256) -> TransactionInfo;
    /// `eth_getTransactionReceipt`
    GetTransactionReceipt = "eth_getTransactionReceipt"
        => transaction_receipt(hash: H256) -> ReceiptInfo;
    /// `eth_getLogs`
    GetLogs = "eth_getLogs" => logs(filter: LogFilter) -> Vec<LogInfo>;
    /// `evm_mine`
    Mine = "evm_mine" => mine_block() -> Quantity;
}

impl Command {
    /// Run against an executor and encode the result
    ///
    /// The encoded result is checked against the method's return schema.
    pub async fn execute<E: ChainExecutor + ?Sized>(self, executor: &E) -> RpcResult<Value> {
        self.run(executor, true).await
    }

    /// Run against an executor without checking the encoded result
    pub async fn execute_unchecked<E: ChainExecutor + ?Sized>(
        self,
        executor: &E,
    ) -> RpcResult<Value> {
        self.run(executor, false).await
    }
}

fn decode_params<T: DeserializeOwned>(method: &str, params: &Value) -> RpcResult<T> {
    // An empty list decodes like an absent one for zero-parameter commands
    let value = match params {
        Value::Array(items) if items.is_empty() => Value::Null,
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| RpcError::Decoding {
        method: method.to_string(),
        message: e.to_string(),
    })
}

fn encode_result<T: Serialize>(method: &'static str, result: &T, check: bool) -> RpcResult<Value> {
    let value = serde_json::to_value(result).map_err(|e| RpcError::Encoding {
        method: method.to_string(),
        message: e.to_string(),
    })?;
    if check {
        if let Err(err) = CommandRegistry::global().validate_return(method, &value) {
            warn!(method, error = %err, "executor result does not match the return schema");
            return Err(err);
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;
    use crate::testing::MemoryExecutor;
    use devchain_primitives::U256;
    use serde_json::json;

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    fn address() -> Address {
        ADDRESS.parse().unwrap()
    }

    // ==================== Decoding ====================

    #[test]
    fn test_from_request_get_balance() {
        let command = Command::from_request("eth_getBalance", &json!([ADDRESS, "0x5"])).unwrap();
        assert_eq!(
            command,
            Command::GetBalance {
                address: address(),
                block: BlockSelector::from(5),
            }
        );
        assert_eq!(command.method(), "eth_getBalance");
    }

    #[test]
    fn test_from_request_no_params() {
        for params in [Value::Null, json!([])] {
            let command = Command::from_request("eth_blockNumber", &params).unwrap();
            assert_eq!(command, Command::BlockNumber {});
        }
    }

    #[test]
    fn test_from_request_unknown_method() {
        let err = Command::from_request("eth_accounts", &json!([])).unwrap_err();
        assert_eq!(err, RpcError::UnknownMethod("eth_accounts".into()));
    }

    #[test]
    fn test_from_request_validation_precedes_decoding() {
        let err = Command::from_request("eth_getBalance", &json!([ADDRESS])).unwrap_err();
        assert!(matches!(err, RpcError::Validation(_)));
    }

    #[test]
    fn test_from_request_get_logs_topic_alternatives() {
        let topic = format!("0x{}", "ab".repeat(32));
        let params = json!([{"fromBlock": "earliest", "topics": [[topic, topic], null]}]);
        let command = Command::from_request("eth_getLogs", &params).unwrap();
        let topic = H256::from_bytes([0xab; 32]);
        match command {
            Command::GetLogs { filter } => {
                assert_eq!(filter.topics, Some(vec![Some(vec![topic, topic].into()), None]));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let err = Command::from_request("eth_getLogs", &json!([{"topics": [[ADDRESS]]}]))
            .unwrap_err();
        assert!(matches!(err, RpcError::Validation(ref v) if v.path == "params[0].topics[0]"));
    }

    #[test]
    fn test_descriptors_match_methods() {
        let names: Vec<_> = descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, CommandRegistry::global().method_names());
    }

    // ==================== Execution ====================

    #[tokio::test]
    async fn test_execute_get_balance() {
        let executor = MemoryExecutor::new();
        executor.set_balance(address(), U256::from(1000)).await;

        let command = Command::from_request("eth_getBalance", &json!([ADDRESS, "latest"])).unwrap();
        let result = command.execute(&executor).await.unwrap();
        assert_eq!(result, json!("0x3e8"));
    }

    #[tokio::test]
    async fn test_execute_passes_executor_error_through() {
        let executor = MemoryExecutor::new();
        let hash = format!("0x{}", "ab".repeat(32));
        let command = Command::from_request("eth_getTransactionByHash", &json!([hash])).unwrap();
        let err = command.execute(&executor).await.unwrap_err();
        assert!(matches!(err, RpcError::Executor(ExecutorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_execute_mine_then_block_number() {
        let executor = MemoryExecutor::new();
        let mined = Command::Mine {}.execute(&executor).await.unwrap();
        assert_eq!(mined, json!("0x1"));
        let number = Command::BlockNumber {}.execute(&executor).await.unwrap();
        assert_eq!(number, json!("0x1"));
    }

    #[tokio::test]
    async fn test_execute_block_by_number_full() {
        let executor = MemoryExecutor::new();
        let raw_tx = json!(["0xf86b01"]);
        Command::from_request("eth_sendRawTransaction", &raw_tx)
            .unwrap()
            .execute(&executor)
            .await
            .unwrap();

        let block = Command::from_request("eth_getBlockByNumber", &json!(["latest", true]))
            .unwrap()
            .execute(&executor)
            .await
            .unwrap();
        assert_eq!(block["number"], json!("0x1"));
        assert!(block["transactions"][0].is_object());

        let block = Command::from_request("eth_getBlockByNumber", &json!(["latest", false]))
            .unwrap()
            .execute(&executor)
            .await
            .unwrap();
        assert!(block["transactions"][0].is_string());
    }
}
