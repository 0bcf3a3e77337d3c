use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::SUPPORTED_CHAIN_IDS;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for the synchronization layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// WebSocket RPC URL for the newHeads subscription
    pub rpc_wss_url: String,
    /// WebSocket connection timeout in seconds
    pub ws_connection_timeout_secs: u64,
    /// Maximum number of reconnection attempts
    pub max_reconnect_attempts: u32,
    /// Delay between reconnection attempts in seconds
    pub reconnect_delay_secs: u64,
    /// Per-listener buffer of undelivered block notifications
    pub block_channel_buffer_size: usize,
    /// Networks the swap screen is offered on
    pub supported_chain_ids: Vec<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rpc_wss_url: "wss://mainnet.infura.io/ws/v3".to_string(),
            ws_connection_timeout_secs: 30,
            max_reconnect_attempts: 5,
            reconnect_delay_secs: 2,
            block_channel_buffer_size: 16,
            supported_chain_ids: SUPPORTED_CHAIN_IDS.to_vec(),
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
struct SyncConfigRoot {
    sync: SyncConfig,
}

impl SyncConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(rpc_wss_url) = std::env::var("RPC_WSS_URL") {
            let _url = Url::parse(&rpc_wss_url)
                .map_err(|e| eyre::eyre!("Invalid RPC_WSS_URL: {}", e))?;
            config.rpc_wss_url = rpc_wss_url;
        }

        if let Ok(timeout_str) = std::env::var("WS_CONNECTION_TIMEOUT_SECS") {
            config.ws_connection_timeout_secs = timeout_str.parse()
                .map_err(|e| eyre::eyre!("Invalid WS_CONNECTION_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(max_attempts_str) = std::env::var("MAX_RECONNECT_ATTEMPTS") {
            config.max_reconnect_attempts = max_attempts_str.parse()
                .map_err(|e| eyre::eyre!("Invalid MAX_RECONNECT_ATTEMPTS: {}", e))?;
        }

        if let Ok(delay_str) = std::env::var("RECONNECT_DELAY_SECS") {
            config.reconnect_delay_secs = delay_str.parse()
                .map_err(|e| eyre::eyre!("Invalid RECONNECT_DELAY_SECS: {}", e))?;
        }

        if let Ok(buffer_size_str) = std::env::var("BLOCK_CHANNEL_BUFFER_SIZE") {
            config.block_channel_buffer_size = buffer_size_str.parse()
                .map_err(|e| eyre::eyre!("Invalid BLOCK_CHANNEL_BUFFER_SIZE: {}", e))?;
        }

        if let Ok(chain_ids_str) = std::env::var("SUPPORTED_CHAIN_IDS") {
            config.supported_chain_ids = parse_chain_ids(&chain_ids_str)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        Url::parse(&self.rpc_wss_url).map_err(|e| eyre::eyre!("Invalid rpc_wss_url: {}", e))?;
        if self.block_channel_buffer_size == 0 {
            return Err(eyre::eyre!("block_channel_buffer_size must be positive"));
        }
        Ok(())
    }

    pub fn ws_connection_timeout(&self) -> Duration {
        Duration::from_secs(self.ws_connection_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

fn parse_chain_ids(raw: &str) -> eyre::Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().map_err(|e| eyre::eyre!("Invalid SUPPORTED_CHAIN_IDS entry {:?}: {}", s, e)))
        .collect()
}

#[async_trait]
impl ConfigLoader for SyncConfig {
    type SectionType = SyncConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: SyncConfigRoot = load_from_file(file_name).await?;
        Ok(root.sync)
    }
}

impl ConfigLoaderSync for SyncConfig {
    type SectionType = SyncConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: SyncConfigRoot = load_from_file_sync(file_name)?;
        Ok(root.sync)
    }
}
