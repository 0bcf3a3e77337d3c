use crate::data_sync::context::WalletContext;
use crate::data_sync::controller::{ResourceFetcher, SyncMode};
use crate::data_sync::sdk::{FetchError, LiquiditySdk, LpToken, Trade, TradeRequest};
use async_trait::async_trait;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Which LP-token listing a screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum LpTokenMode {
    /// Every pool of the exchange
    Pools,
    /// Positions the account holds on this exchange
    MyLpTokens,
    /// Positions the account holds on Uniswap, for migration
    MyUniswapLpTokens,
}

impl LpTokenMode {
    pub fn sync_mode(&self) -> SyncMode {
        match self {
            LpTokenMode::Pools => SyncMode::Always,
            LpTokenMode::MyLpTokens | LpTokenMode::MyUniswapLpTokens => SyncMode::RequiresWatchedTokens,
        }
    }
}

pub struct LpTokensFetcher {
    sdk: Arc<dyn LiquiditySdk>,
    mode: LpTokenMode,
}

impl LpTokensFetcher {
    pub fn new(sdk: Arc<dyn LiquiditySdk>, mode: LpTokenMode) -> Self {
        Self { sdk, mode }
    }
}

#[async_trait]
impl ResourceFetcher for LpTokensFetcher {
    type Output = Vec<LpToken>;
    type Params = ();

    async fn fetch(&self, ctx: &WalletContext, _params: &()) -> Result<Option<Vec<LpToken>>, FetchError> {
        match self.mode {
            LpTokenMode::Pools => self.sdk.get_pools(ctx).await,
            LpTokenMode::MyLpTokens => self.sdk.get_my_lp_tokens(ctx).await,
            LpTokenMode::MyUniswapLpTokens => self.sdk.get_my_uniswap_lp_tokens(ctx).await,
        }
    }
}

/// Latest trade for the current request, as seen by the swap screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteState {
    /// Request this state answers
    pub request: Option<TradeRequest>,
    pub trade: Option<Trade>,
    /// The SDK refused to route this pair
    pub unsupported: bool,
}

pub struct TradeFetcher {
    sdk: Arc<dyn LiquiditySdk>,
}

impl TradeFetcher {
    pub fn new(sdk: Arc<dyn LiquiditySdk>) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl ResourceFetcher for TradeFetcher {
    type Output = QuoteState;
    type Params = Option<TradeRequest>;

    async fn fetch(&self, ctx: &WalletContext, request: &Option<TradeRequest>) -> Result<Option<QuoteState>, FetchError> {
        let Some(request) = request else {
            return Ok(Some(QuoteState::default()));
        };

        match self.sdk.get_trade(ctx, request).await {
            Ok(trade) => {
                if trade.is_none() {
                    debug!("No pair for {} -> {}", request.from.get_symbol(), request.to.get_symbol());
                }
                Ok(Some(QuoteState { request: Some(request.clone()), trade, unsupported: false }))
            }
            Err(FetchError::UnsupportedPair) => {
                Ok(Some(QuoteState { request: Some(request.clone()), trade: None, unsupported: true }))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::Token;
    use alloy_primitives::U256;
    use std::str::FromStr;

    struct StaticSdk;

    fn lp(byte: u8) -> LpToken {
        LpToken {
            address: alloy_primitives::Address::repeat_byte(byte),
            token_a: Arc::new(Token::repeat_byte(byte + 1)),
            token_b: Arc::new(Token::repeat_byte(byte + 2)),
            symbol: "SLP".to_string(),
            decimals: 18,
            balance: U256::ZERO,
            total_supply: U256::ZERO,
        }
    }

    #[async_trait]
    impl LiquiditySdk for StaticSdk {
        async fn get_pools(&self, _ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError> {
            Ok(Some(vec![lp(1), lp(4)]))
        }

        async fn get_my_lp_tokens(&self, _ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError> {
            Ok(Some(vec![lp(1)]))
        }

        async fn get_my_uniswap_lp_tokens(&self, _ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError> {
            Ok(None)
        }

        async fn get_trade(&self, _ctx: &WalletContext, request: &TradeRequest) -> Result<Option<Trade>, FetchError> {
            match request.to.get_symbol().as_str() {
                "AMPL" => Err(FetchError::UnsupportedPair),
                "NOPAIR" => Ok(None),
                _ => Ok(Some(Trade::default())),
            }
        }
    }

    fn request(to_symbol: &str) -> Option<TradeRequest> {
        Some(TradeRequest {
            from: Arc::new(Token::native()),
            to: Arc::new(Token::new_with_data(
                alloy_primitives::Address::repeat_byte(3),
                Some(to_symbol.to_string()),
                None,
                Some(18),
            )),
            amount: U256::from(1),
        })
    }

    #[test]
    fn test_mode_names_and_sync_modes() {
        assert_eq!(LpTokenMode::from_str("my-uniswap-lp-tokens").unwrap(), LpTokenMode::MyUniswapLpTokens);
        assert_eq!(LpTokenMode::Pools.to_string(), "pools");
        assert_eq!(LpTokenMode::Pools.sync_mode(), SyncMode::Always);
        assert_eq!(LpTokenMode::MyLpTokens.sync_mode(), SyncMode::RequiresWatchedTokens);
    }

    #[tokio::test]
    async fn test_lp_fetcher_dispatches_by_mode() {
        let ctx = WalletContext::default();
        let pools = LpTokensFetcher::new(Arc::new(StaticSdk), LpTokenMode::Pools);
        let mine = LpTokensFetcher::new(Arc::new(StaticSdk), LpTokenMode::MyLpTokens);
        let uniswap = LpTokensFetcher::new(Arc::new(StaticSdk), LpTokenMode::MyUniswapLpTokens);

        assert_eq!(pools.fetch(&ctx, &()).await.unwrap().unwrap().len(), 2);
        assert_eq!(mine.fetch(&ctx, &()).await.unwrap().unwrap().len(), 1);
        assert_eq!(uniswap.fetch(&ctx, &()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_trade_fetcher_states() {
        let ctx = WalletContext::default();
        let fetcher = TradeFetcher::new(Arc::new(StaticSdk));

        let idle = fetcher.fetch(&ctx, &None).await.unwrap().unwrap();
        assert_eq!(idle, QuoteState::default());

        let quoted = fetcher.fetch(&ctx, &request("DAI")).await.unwrap().unwrap();
        assert!(quoted.trade.is_some());

        let missing = fetcher.fetch(&ctx, &request("NOPAIR")).await.unwrap().unwrap();
        assert!(missing.trade.is_none());
        assert!(!missing.unsupported);

        let unsupported = fetcher.fetch(&ctx, &request("AMPL")).await.unwrap().unwrap();
        assert!(unsupported.unsupported);
        assert_eq!(unsupported.request, request("AMPL"));
    }
}
