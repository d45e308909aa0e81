//! Provider bridge

use std::sync::Arc;

use async_trait::async_trait;
use devchain_rpc::ChainExecutor;
use serde_json::Value;
use tracing::debug;

use crate::config::{Network, ProviderConfig};
use crate::error::{ProviderError, ProviderResult};
use crate::request::{ProviderRequest, Route};

/// Answers methods the bridge does not recognize
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    /// Perform a method with its original parameters
    async fn perform(&self, method: &str, params: Value) -> ProviderResult<Value>;
}

/// Fallback that implements nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedFallback;

#[async_trait]
impl FallbackProvider for UnsupportedFallback {
    async fn perform(&self, method: &str, _params: Value) -> ProviderResult<Value> {
        Err(ProviderError::NotImplemented(method.to_string()))
    }
}

/// ethers-style provider over a [`ChainExecutor`]
///
/// Recognized methods become registry commands; everything else is handed to
/// the fallback unchanged.
pub struct Provider<E: ChainExecutor + ?Sized, F: FallbackProvider = UnsupportedFallback> {
    executor: Arc<E>,
    fallback: F,
    config: ProviderConfig,
}

impl<E: ChainExecutor + ?Sized> Provider<E> {
    /// Create a provider with the default configuration and no fallback
    pub fn new(executor: Arc<E>) -> Self {
        Self::with_fallback(executor, UnsupportedFallback, ProviderConfig::default())
    }
}

impl<E: ChainExecutor + ?Sized, F: FallbackProvider> Provider<E, F> {
    /// Create a provider with a fallback and configuration
    pub fn with_fallback(executor: Arc<E>, fallback: F, config: ProviderConfig) -> Self {
        Self {
            executor,
            fallback,
            config,
        }
    }

    /// Network name and chain id
    pub fn network(&self) -> Network {
        Network {
            name: self.config.name.clone(),
            chain_id: self.config.chain_id,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Get the executor
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Get the fallback provider
    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    /// Perform an ethers-style method with its parameter bag
    pub async fn perform(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let request = ProviderRequest::parse(method, params, self.config.default_block())?;
        self.execute(request).await
    }

    /// Execute an already parsed request
    pub async fn execute(&self, request: ProviderRequest) -> ProviderResult<Value> {
        match request.route() {
            Route::Command(command) => {
                debug!(method = command.method(), "bridging to command");
                Ok(command.execute(self.executor.as_ref()).await?)
            }
            Route::Fallback { method, params } => {
                debug!(%method, "forwarding to fallback provider");
                self.fallback.perform(&method, params).await
            }
        }
    }

    /// Mine an empty block and return its number
    pub async fn mine_block(&self) -> ProviderResult<Value> {
        self.execute(ProviderRequest::MineBlock).await
    }
}
