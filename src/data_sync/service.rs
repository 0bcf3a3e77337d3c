use crate::data_sync::{
    config::SyncConfig,
    context::WalletContextHandle,
    fetchers::LpTokenMode,
    notifier::BlockNotifier,
    sdk::LiquiditySdk,
    websocket::BlockFeed,
};
use crate::execution::ActionExecutor;
use crate::logic::{LpTokensSession, SwapSession};
use eyre::{Result, eyre};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Main synchronization service
///
/// Owns the shared pieces every screen syncs against: the wallet context,
/// the block notifier and the liquidity SDK. Once started, a websocket feed
/// pushes new heads into the notifier. Sessions created from the service
/// share all three.
pub struct SyncService {
    config: SyncConfig,
    notifier: BlockNotifier,
    context: WalletContextHandle,
    sdk: Arc<dyn LiquiditySdk>,

    feed_task: Option<JoinHandle<()>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl SyncService {
    pub fn new(config: SyncConfig, sdk: Arc<dyn LiquiditySdk>) -> Result<Self> {
        config.validate()?;
        info!("Initializing SyncService for chains {:?}", config.supported_chain_ids);

        Ok(Self {
            notifier: BlockNotifier::new(config.block_channel_buffer_size),
            context: WalletContextHandle::default(),
            config,
            sdk,
            feed_task: None,
            shutdown_tx: None,
        })
    }

    /// Start feeding new heads from the configured websocket endpoint.
    pub fn start(&mut self) -> Result<()> {
        if self.feed_task.is_some() {
            return Err(eyre!("SyncService already started"));
        }
        info!("Starting SyncService");

        let feed = BlockFeed::new(
            self.config.rpc_wss_url.clone(),
            self.config.ws_connection_timeout(),
            self.config.max_reconnect_attempts,
            self.config.reconnect_delay(),
        );
        let (task, shutdown_tx) = feed.spawn(self.notifier.clone());
        self.feed_task = Some(task);
        self.shutdown_tx = Some(shutdown_tx);

        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping SyncService");

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(()).await;
        }

        if let Some(feed_task) = self.feed_task.take() {
            if let Err(e) = feed_task.await {
                warn!("Block feed task error during shutdown: {}", e);
            }
        }

        info!("SyncService stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.feed_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn context(&self) -> &WalletContextHandle {
        &self.context
    }

    pub fn notifier(&self) -> &BlockNotifier {
        &self.notifier
    }

    pub fn get_config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn lp_tokens(&self, mode: LpTokenMode) -> LpTokensSession {
        LpTokensSession::new(self.sdk.clone(), mode, self.context.subscribe(), self.notifier.clone())
    }

    pub fn swap_session(&self, executor: Arc<dyn ActionExecutor>) -> SwapSession {
        SwapSession::new(
            self.sdk.clone(),
            executor,
            self.context.subscribe(),
            self.notifier.clone(),
            self.config.supported_chain_ids.clone(),
        )
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncService dropped while running, block feed may be orphaned");
        }
    }
}

/// Builder for SyncService
pub struct SyncServiceBuilder {
    config: Option<SyncConfig>,
    sdk: Option<Arc<dyn LiquiditySdk>>,
}

impl SyncServiceBuilder {
    pub fn new() -> Self {
        Self { config: None, sdk: None }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_sdk(mut self, sdk: Arc<dyn LiquiditySdk>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    pub fn build(self) -> Result<SyncService> {
        let sdk = self.sdk.ok_or_else(|| eyre!("SyncService needs a liquidity SDK"))?;
        let config = match self.config {
            Some(config) => config,
            None => SyncConfig::from_env().unwrap_or_default(),
        };

        SyncService::new(config, sdk)
    }
}

impl Default for SyncServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::mock_sdk::MockSdk;

    #[test]
    fn test_service_creation() {
        let service = SyncService::new(SyncConfig::default(), Arc::new(MockSdk::new())).unwrap();
        assert!(!service.is_running());
        assert_eq!(service.notifier().listener_count(), 0);
    }

    #[test]
    fn test_builder_requires_sdk() {
        assert!(SyncServiceBuilder::new().with_config(SyncConfig::default()).build().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SyncConfig { rpc_wss_url: "not a url".to_string(), ..SyncConfig::default() };
        assert!(SyncService::new(config, Arc::new(MockSdk::new())).is_err());
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let mut service =
            SyncServiceBuilder::new().with_config(SyncConfig::default()).with_sdk(Arc::new(MockSdk::new())).build().unwrap();
        assert!(service.stop().await.is_ok());
    }
}
