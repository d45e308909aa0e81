//! Request handler

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::commands::Command;
use crate::error::JsonRpcError;
use crate::executor::ChainExecutor;
use crate::types::{JsonRpcRequest, JsonRpcResponse};

/// Handler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcHandlerConfig {
    /// Check executor results against the method's return schema
    pub validate_results: bool,
}

impl Default for RpcHandlerConfig {
    fn default() -> Self {
        Self {
            validate_results: true,
        }
    }
}

/// RPC request handler
///
/// Parses each request into a [`Command`] through the registry, executes it
/// and wraps the outcome in a JSON-RPC response. Transport-agnostic.
pub struct RpcHandler<E: ChainExecutor + ?Sized> {
    executor: Arc<E>,
    config: RpcHandlerConfig,
}

impl<E: ChainExecutor + ?Sized> RpcHandler<E> {
    /// Create a new RPC handler
    pub fn new(executor: Arc<E>) -> Self {
        Self::with_config(executor, RpcHandlerConfig::default())
    }

    /// Create a handler with explicit configuration
    pub fn with_config(executor: Arc<E>, config: RpcHandlerConfig) -> Self {
        Self { executor, config }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("invalid JSON-RPC version"),
            );
        }

        debug!(method = %request.method, id = ?request.id, "handling request");
        let command = match Command::from_request(&request.method, &request.params) {
            Ok(command) => command,
            Err(err) => return JsonRpcResponse::error(request.id, err.into()),
        };

        let result = if self.config.validate_results {
            command.execute(self.executor.as_ref()).await
        } else {
            command.execute_unchecked(self.executor.as_ref()).await
        };
        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(err) => JsonRpcResponse::error(request.id, err.into()),
        }
    }

    /// Get the executor
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Get the configuration
    pub fn config(&self) -> &RpcHandlerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_code;
    use crate::testing::MemoryExecutor;
    use crate::types::JsonRpcId;
    use serde_json::{json, Value};

    fn handler() -> RpcHandler<MemoryExecutor> {
        RpcHandler::new(Arc::new(MemoryExecutor::new()))
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(JsonRpcId::Number(1), method, params)
    }

    // ===== Envelope =====

    #[tokio::test]
    async fn test_rejects_wrong_version() {
        let mut req = request("eth_blockNumber", Value::Null);
        req.jsonrpc = "1.0".to_string();
        let response = handler().handle_request(req).await;
        assert_eq!(response.error.unwrap().code, error_code::INVALID_REQUEST);
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_success_keeps_id() {
        let req = JsonRpcRequest::new(JsonRpcId::String("a".into()), "eth_chainId", json!([]));
        let response = handler().handle_request(req).await;
        assert_eq!(response.id, JsonRpcId::String("a".into()));
        assert_eq!(response.result, Some(json!("0x539")));
    }

    // ===== Error Mapping =====

    #[tokio::test]
    async fn test_unknown_method() {
        let response = handler().handle_request(request("eth_mining", json!([]))).await;
        assert_eq!(response.error.unwrap().code, error_code::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let response = handler()
            .handle_request(request("eth_getBalance", json!(["0x12", "latest"])))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, error_code::INVALID_PARAMS);
        assert!(error.message.contains("params[0]"));
        assert_eq!(error.data.unwrap()["expected"], json!("address"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let hash = format!("0x{}", "cd".repeat(32));
        let response = handler()
            .handle_request(request("eth_getTransactionReceipt", json!([hash])))
            .await;
        assert_eq!(response.error.unwrap().code, error_code::RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejected() {
        let response = handler()
            .handle_request(request("eth_sendRawTransaction", json!(["0x"])))
            .await;
        assert_eq!(response.error.unwrap().code, error_code::TRANSACTION_REJECTED);
    }

    // ===== Dynamic Executor =====

    #[tokio::test]
    async fn test_trait_object_executor() {
        let executor: Arc<dyn ChainExecutor> = Arc::new(MemoryExecutor::new());
        let handler = RpcHandler::with_config(
            executor,
            RpcHandlerConfig {
                validate_results: false,
            },
        );
        let response = handler
            .handle_request(request("web3_clientVersion", Value::Null))
            .await;
        let version = response.result.unwrap();
        assert!(version.as_str().unwrap().starts_with("devchain/v"));
        assert!(!handler.config().validate_results);
    }
}
