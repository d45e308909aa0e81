//! Provider bridge integration tests
//!
//! Exercises the bridge end to end against the in-memory executor: agreement
//! with the registry path, default block selection, transaction field
//! omission and fallback forwarding.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use devchain_primitives::{HexData, Quantity, H256, U256};
use devchain_provider::{
    FallbackProvider, Provider, ProviderConfig, ProviderError, ProviderResult,
    UnsupportedFallback,
};
use devchain_rpc::testing::MemoryExecutor;
use devchain_rpc::{BlockTag, ChainExecutor, Command, LogInfo, RpcError, TransactionRequest};
use serde_json::{json, Value};

const ADDRESS: &str = "0x1111111111111111111111111111111111111111";
const OTHER: &str = "0x2222222222222222222222222222222222222222";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn funded_executor() -> Arc<MemoryExecutor> {
    let executor = Arc::new(MemoryExecutor::new());
    executor
        .set_balance(ADDRESS.parse().unwrap(), U256::from(1_000_000u64))
        .await;
    executor
}

/// Records every forwarded call
#[derive(Default)]
struct RecordingFallback {
    calls: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl FallbackProvider for RecordingFallback {
    async fn perform(&self, method: &str, params: Value) -> ProviderResult<Value> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((method.to_string(), params));
        }
        Ok(json!("forwarded"))
    }
}

// ==================== Bridge and registry agreement ====================

#[tokio::test]
async fn test_get_balance_matches_registry() {
    init_tracing();
    let executor = funded_executor().await;
    let provider = Provider::new(executor.clone());

    let bridged = provider
        .perform("getBalance", json!({"address": ADDRESS, "blockTag": "latest"}))
        .await
        .unwrap();
    let direct = Command::from_request("eth_getBalance", &json!([ADDRESS, "latest"]))
        .unwrap()
        .execute(executor.as_ref())
        .await
        .unwrap();

    assert_eq!(bridged, direct);
    assert_eq!(bridged, json!("0xf4240"));
}

#[tokio::test]
async fn test_scalar_methods() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    assert_eq!(provider.perform("getChainId", Value::Null).await.unwrap(), json!("0x539"));
    assert_eq!(provider.perform("getBlockNumber", json!({})).await.unwrap(), json!("0x0"));
    assert_eq!(
        provider.perform("getGasPrice", Value::Null).await.unwrap(),
        json!("0x3b9aca00")
    );
}

#[tokio::test]
async fn test_bridge_errors_keep_executor_failure() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    let err = provider
        .perform("getBalance", json!({"address": ADDRESS, "blockTag": "0x10"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Rpc(RpcError::Executor(_))));
}

// ==================== Block selection ====================

#[tokio::test]
async fn test_get_block_defaults_to_latest() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    provider.mine_block().await.unwrap();
    provider.mine_block().await.unwrap();

    let block = provider.perform("getBlock", json!({})).await.unwrap();
    assert_eq!(block["number"], json!("0x2"));

    let latest = provider
        .perform("getBlock", json!({"blockTag": "latest"}))
        .await
        .unwrap();
    assert_eq!(block, latest);
}

#[tokio::test]
async fn test_get_block_by_hash_and_tag_precedence() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    provider.mine_block().await.unwrap();

    let genesis = provider
        .perform("getBlock", json!({"blockTag": "earliest"}))
        .await
        .unwrap();
    let by_hash = provider
        .perform("getBlock", json!({"blockHash": genesis["hash"].clone()}))
        .await
        .unwrap();
    assert_eq!(by_hash, genesis);

    let latest = provider.perform("getBlock", json!({})).await.unwrap();
    let both = provider
        .perform(
            "getBlock",
            json!({"blockTag": "latest", "blockHash": genesis["hash"].clone()}),
        )
        .await
        .unwrap();
    assert_eq!(both, latest);
}

#[tokio::test]
async fn test_configured_default_block() {
    let executor = funded_executor().await;
    let config = ProviderConfig {
        default_block_tag: BlockTag::Earliest,
        ..Default::default()
    };
    let provider = Provider::with_fallback(executor, UnsupportedFallback, config);
    provider.mine_block().await.unwrap();

    let block = provider.perform("getBlock", json!({})).await.unwrap();
    assert_eq!(block["number"], json!("0x0"));
}

// ==================== Transaction normalization ====================

#[tokio::test]
async fn test_call_keeps_explicit_zero_and_omits_absent() {
    init_tracing();
    let executor = Arc::new(MemoryExecutor::new());
    executor.set_call_result(HexData::new(vec![0xab, 0xcd])).await;
    let provider = Provider::new(executor.clone());

    let result = provider
        .perform(
            "call",
            json!({
                "transaction": {
                    "to": OTHER,
                    "value": 0,
                    "data": "0x",
                    "gasPrice": null,
                    "nonce": ""
                }
            }),
        )
        .await
        .unwrap();
    assert_eq!(result, json!("0xabcd"));

    let requests = executor.requests().await;
    assert_eq!(
        requests,
        vec![TransactionRequest {
            to: Some(OTHER.parse().unwrap()),
            value: Some(Quantity::ZERO),
            data: Some(HexData::empty()),
            ..Default::default()
        }]
    );
    assert_eq!(
        serde_json::to_value(&requests[0]).unwrap(),
        json!({"to": OTHER, "value": "0x0", "data": "0x"})
    );
}

#[tokio::test]
async fn test_estimate_gas_normalizes_ethers_values() {
    let executor = Arc::new(MemoryExecutor::new());
    let provider = Provider::new(executor.clone());

    let gas = provider
        .perform(
            "estimateGas",
            json!({
                "transaction": {
                    "from": ADDRESS,
                    "gasLimit": {"type": "BigNumber", "hex": "0x0186a0"},
                    "value": "0x000001",
                    "data": [1, 2]
                }
            }),
        )
        .await
        .unwrap();
    assert_eq!(gas, json!("0x5228"));

    let requests = executor.requests().await;
    let request = &requests[0];
    assert_eq!(request.gas, Some(Quantity::from(100_000u64)));
    assert_eq!(request.value, Some(Quantity::from(1u64)));
    assert_eq!(request.data, Some(HexData::new(vec![1u8, 2])));
}

#[tokio::test]
async fn test_invalid_transaction_field() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    let err = provider
        .perform("call", json!({"transaction": {"to": "0x1234"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidField { ref field, .. } if field == "transaction.to"));

    let err = provider.perform("call", json!({})).await.unwrap_err();
    assert_eq!(err, ProviderError::MissingField("transaction".into()));
}

// ==================== Transactions ====================

#[tokio::test]
async fn test_send_then_fetch_transaction_and_receipt() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    let hash = provider
        .perform("sendTransaction", json!({"signedTransaction": "0xf86c0a85"}))
        .await
        .unwrap();

    let tx = provider
        .perform("getTransaction", json!({"transactionHash": hash.clone()}))
        .await
        .unwrap();
    assert_eq!(tx["hash"], hash);
    assert_eq!(tx["input"], json!("0xf86c0a85"));

    let receipt = provider
        .perform("getTransactionReceipt", json!({"transactionHash": hash.clone()}))
        .await
        .unwrap();
    assert_eq!(receipt["transactionHash"], hash);
    assert_eq!(receipt["status"], json!("0x1"));

    let block = provider
        .perform("getBlock", json!({"includeTransactions": true}))
        .await
        .unwrap();
    assert_eq!(block["transactions"][0]["hash"], hash);

    let logs = provider
        .perform("getLogs", json!({"filter": {"fromBlock": "earliest"}}))
        .await
        .unwrap();
    assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn test_get_logs_with_topic_alternatives() {
    let executor = Arc::new(MemoryExecutor::new());
    let provider = Provider::new(executor.clone());
    let hash = provider
        .perform("sendTransaction", json!({"signedTransaction": "0x01"}))
        .await
        .unwrap();
    let hash: H256 = hash.as_str().unwrap().parse().unwrap();
    let receipt = executor.transaction_receipt(hash).await.unwrap();

    let (transfer, approval, other) = (
        H256::from_bytes([0x11; 32]),
        H256::from_bytes([0x22; 32]),
        H256::from_bytes([0x33; 32]),
    );
    let logs = [transfer, approval, other]
        .into_iter()
        .enumerate()
        .map(|(i, topic)| LogInfo {
            address: ADDRESS.parse().unwrap(),
            topics: vec![topic],
            block_hash: receipt.block_hash,
            block_number: receipt.block_number,
            transaction_hash: hash,
            log_index: Quantity::from(i as u64),
            ..Default::default()
        })
        .collect();
    executor.add_logs(hash, logs).await.unwrap();

    let found = provider
        .perform(
            "getLogs",
            json!({"filter": {"topics": [[transfer.to_hex(), other.to_hex()]]}}),
        )
        .await
        .unwrap();
    let topics: Vec<Value> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["topics"][0].clone())
        .collect();
    assert_eq!(topics, vec![json!(transfer.to_hex()), json!(other.to_hex())]);
}

// ==================== Fallback ====================

#[tokio::test]
async fn test_unknown_methods_forwarded_verbatim() {
    init_tracing();
    let provider = Provider::with_fallback(
        Arc::new(MemoryExecutor::new()),
        RecordingFallback::default(),
        ProviderConfig::default(),
    );

    let params = json!({"name": "alice.eth", "extra": [1, null, "0x00"]});
    let result = provider.perform("resolveName", params.clone()).await.unwrap();
    assert_eq!(result, json!("forwarded"));

    // recognized methods never reach the fallback
    provider.perform("getBlockNumber", Value::Null).await.unwrap();

    let calls = provider.fallback().calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("resolveName".to_string(), params)]);
}

#[tokio::test]
async fn test_unknown_method_without_fallback() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    let err = provider.perform("lookupAddress", json!({})).await.unwrap_err();
    assert_eq!(err, ProviderError::NotImplemented("lookupAddress".into()));
    assert!(!matches!(err, ProviderError::Rpc(RpcError::UnknownMethod(_))));
}

// ==================== Network ====================

#[tokio::test]
async fn test_network_and_mine_block() {
    let provider = Provider::new(Arc::new(MemoryExecutor::new()));
    let network = provider.network();
    assert_eq!(network.name, "devchain");
    assert_eq!(network.chain_id, 1337);

    assert_eq!(provider.mine_block().await.unwrap(), json!("0x1"));
    assert_eq!(
        provider.perform("mineBlock", Value::Null).await.unwrap(),
        json!("0x2")
    );
}
