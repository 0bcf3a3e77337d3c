use crate::data_sync::context::WalletContext;
use crate::data_sync::controller::{ResourceSyncController, ResourceSyncState, SyncSources};
use crate::data_sync::fetchers::{LpTokenMode, LpTokensFetcher};
use crate::data_sync::notifier::BlockNotifier;
use crate::data_sync::sdk::{LiquiditySdk, LpToken};
use crate::logic::selection::SelectionState;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// LP-token listing for one screen: the synced list plus the user's pick.
pub struct LpTokensSession {
    mode: LpTokenMode,
    controller: ResourceSyncController<Vec<LpToken>>,
    selection: SelectionState<LpToken>,
    _params: watch::Sender<()>,
}

impl LpTokensSession {
    pub fn new(
        sdk: Arc<dyn LiquiditySdk>,
        mode: LpTokenMode,
        context: watch::Receiver<WalletContext>,
        notifier: BlockNotifier,
    ) -> Self {
        let (params_tx, params_rx) = watch::channel(());
        let controller = ResourceSyncController::spawn(
            format!("lp-tokens/{}", mode),
            LpTokensFetcher::new(sdk, mode),
            mode.sync_mode(),
            Vec::new(),
            SyncSources { context, params: params_rx, notifier },
        );

        Self { mode, controller, selection: SelectionState::new(), _params: params_tx }
    }

    pub fn mode(&self) -> LpTokenMode {
        self.mode
    }

    pub fn lp_tokens(&self) -> Vec<LpToken> {
        self.controller.value()
    }

    pub fn loading(&self) -> bool {
        self.controller.loading()
    }

    pub fn last_time_refreshed(&self) -> u64 {
        self.controller.state().refresh_trigger
    }

    pub fn refresh(&self) {
        self.controller.refresh();
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceSyncState<Vec<LpToken>>> {
        self.controller.subscribe()
    }

    pub fn select(&mut self, lp_token: Option<LpToken>) {
        self.selection.select(lp_token);
    }

    pub fn selected(&self) -> Option<&LpToken> {
        self.selection.selected()
    }

    pub fn amount(&self) -> &str {
        self.selection.amount()
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.selection.set_amount(amount);
    }

    pub fn selected_allowed(&self) -> bool {
        self.selection.allowed()
    }

    pub fn set_selected_allowed(&self, allowed: bool) {
        self.selection.set_allowed(allowed);
    }

    pub fn selection(&self) -> &SelectionState<LpToken> {
        &self.selection
    }

    pub async fn shutdown(self) -> Result<()> {
        self.controller.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::context::WalletContextHandle;
    use crate::data_sync::mock_sdk::MockSdk;
    use crate::utils::token::Token;
    use alloy_primitives::{Address, U256};
    use std::time::Duration;
    use tokio::time::timeout;
    use url::Url;

    fn lp(byte: u8) -> LpToken {
        LpToken {
            address: Address::repeat_byte(byte),
            token_a: Arc::new(Token::repeat_byte(byte + 1)),
            token_b: Arc::new(Token::repeat_byte(byte + 2)),
            symbol: "SLP".to_string(),
            decimals: 18,
            balance: U256::from(byte),
            total_supply: U256::from(1000),
        }
    }

    fn connected() -> WalletContextHandle {
        let context = WalletContextHandle::default();
        context.connect(Url::parse("http://localhost:8545").unwrap(), Address::repeat_byte(0xaa), 1);
        context
    }

    async fn settled(session: &LpTokensSession) -> Vec<LpToken> {
        let mut rx = session.subscribe();
        timeout(Duration::from_secs(2), rx.wait_for(|s| !s.loading))
            .await
            .expect("never settled")
            .expect("controller gone")
            .value
            .clone()
    }

    #[tokio::test]
    async fn test_pools_listing() {
        let sdk = Arc::new(MockSdk::new().with_pools(vec![lp(1), lp(4)]));
        let context = connected();
        let session = LpTokensSession::new(sdk, LpTokenMode::Pools, context.subscribe(), BlockNotifier::default());

        assert_eq!(settled(&session).await.len(), 2);
        assert_eq!(session.mode(), LpTokenMode::Pools);
    }

    #[tokio::test]
    async fn test_my_lp_tokens_wait_for_watched_tokens() {
        let sdk = Arc::new(MockSdk::new().with_my_lp_tokens(vec![lp(7)]));
        let context = connected();
        let session = LpTokensSession::new(sdk, LpTokenMode::MyLpTokens, context.subscribe(), BlockNotifier::default());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(session.loading());
        assert!(session.lp_tokens().is_empty());

        context.add_custom_token(Arc::new(Token::repeat_byte(0x42)));
        assert_eq!(settled(&session).await, vec![lp(7)]);
    }

    #[tokio::test]
    async fn test_refresh_updates_trigger() {
        let sdk = Arc::new(MockSdk::new().with_pools(vec![lp(1)]));
        let context = connected();
        let session = LpTokensSession::new(sdk, LpTokenMode::Pools, context.subscribe(), BlockNotifier::default());
        settled(&session).await;
        assert_eq!(session.last_time_refreshed(), 0);

        session.refresh();
        let mut rx = session.subscribe();
        let state = timeout(Duration::from_secs(2), rx.wait_for(|s| s.refresh_trigger > 0 && !s.loading))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(state.value.len(), 1);
    }

    #[tokio::test]
    async fn test_deselect_clears_amount() {
        let sdk = Arc::new(MockSdk::new().with_pools(vec![lp(1)]));
        let context = connected();
        let mut session = LpTokensSession::new(sdk, LpTokenMode::Pools, context.subscribe(), BlockNotifier::default());
        let lp_token = settled(&session).await.remove(0);

        session.select(Some(lp_token));
        session.set_amount("0.5");
        session.select(None);

        assert_eq!(session.amount(), "");
        assert!(!session.selected_allowed());
    }
}
