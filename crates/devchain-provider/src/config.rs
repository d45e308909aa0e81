//! Provider configuration

use devchain_rpc::{BlockSelector, BlockTag};
use serde::{Deserialize, Serialize};

/// Default network name
pub const DEFAULT_NETWORK_NAME: &str = "devchain";

/// Default chain id
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Network name reported by [`Provider::network`](crate::Provider::network)
    pub name: String,
    /// Chain id reported by [`Provider::network`](crate::Provider::network)
    pub chain_id: u64,
    /// Block used when a request carries no `blockTag`
    pub default_block_tag: BlockTag,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NETWORK_NAME.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            default_block_tag: BlockTag::Latest,
        }
    }
}

impl ProviderConfig {
    /// Block selector used for a missing `blockTag`
    pub fn default_block(&self) -> BlockSelector {
        BlockSelector::Tag(self.default_block_tag)
    }
}

/// Network description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Network name
    pub name: String,
    /// Chain id
    pub chain_id: u64,
}
