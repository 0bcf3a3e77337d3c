use crate::data_sync::context::WalletContext;
use crate::data_sync::sdk::{FetchError, LiquiditySdk, LpToken, Trade, TradeRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory SDK serving canned responses. Trades are keyed by the
/// destination token's symbol; unknown pairs have no trade.
#[derive(Default)]
pub struct MockSdk {
    pub pools: Vec<LpToken>,
    pub my_lp_tokens: Vec<LpToken>,
    pub my_uniswap_lp_tokens: Vec<LpToken>,
    trades: DashMap<String, Result<Trade, FetchError>>,
    trade_calls: AtomicUsize,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pools(mut self, pools: Vec<LpToken>) -> Self {
        self.pools = pools;
        self
    }

    pub fn with_my_lp_tokens(mut self, lp_tokens: Vec<LpToken>) -> Self {
        self.my_lp_tokens = lp_tokens;
        self
    }

    pub fn set_trade(&self, to_symbol: &str, trade: Result<Trade, FetchError>) {
        self.trades.insert(to_symbol.to_string(), trade);
    }

    pub fn trade_calls(&self) -> usize {
        self.trade_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LiquiditySdk for MockSdk {
    async fn get_pools(&self, _ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError> {
        Ok(Some(self.pools.clone()))
    }

    async fn get_my_lp_tokens(&self, ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError> {
        if ctx.address.is_none() {
            return Err(FetchError::NotConnected);
        }
        Ok(Some(self.my_lp_tokens.clone()))
    }

    async fn get_my_uniswap_lp_tokens(&self, ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError> {
        if ctx.address.is_none() {
            return Err(FetchError::NotConnected);
        }
        Ok(Some(self.my_uniswap_lp_tokens.clone()))
    }

    async fn get_trade(&self, _ctx: &WalletContext, request: &TradeRequest) -> Result<Option<Trade>, FetchError> {
        self.trade_calls.fetch_add(1, Ordering::Relaxed);
        match self.trades.get(&request.to.get_symbol()) {
            Some(entry) => entry.value().clone().map(Some),
            None => Ok(None),
        }
    }
}
