use crate::data_sync::context::WalletContext;
use crate::utils::amount::{format_fixed, scale_ratio};
use crate::utils::token::TokenWrapper;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("pair is not supported")]
    UnsupportedPair,
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// A liquidity pool share token, with the pair it represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpToken {
    pub address: Address,
    pub token_a: TokenWrapper,
    pub token_b: TokenWrapper,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub balance: U256,
    #[serde(default)]
    pub total_supply: U256,
}

/// An exact ratio as returned by the trade SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: U256,
    pub denominator: U256,
}

impl Fraction {
    pub fn new(numerator: U256, denominator: U256) -> Self {
        Self { numerator, denominator }
    }

    /// Value scaled by `10^places`, rounded half up. `None` for a zero
    /// denominator or when the scaled value overflows.
    pub fn scaled(&self, places: u8) -> Option<U256> {
        scale_ratio(self.numerator, self.denominator, places)
    }

    pub fn to_fixed(&self, places: u8) -> Option<String> {
        let scaled = self.scaled(places)?;
        format_fixed(scaled, places, places)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: TokenWrapper,
    pub raw: U256,
}

/// Raw trade object computed by the SDK from on-chain reserves.
/// Every field may be missing on a partial quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trade {
    pub input_amount: Option<TokenAmount>,
    pub output_amount: Option<TokenAmount>,
    /// Output units per input unit
    pub execution_price: Option<Fraction>,
    /// Ratio, so 0.02 is 2%
    pub price_impact: Option<Fraction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub from: TokenWrapper,
    pub to: TokenWrapper,
    pub amount: U256,
}

/// Remote calls that compute pool lists and trades. Implementations talk to a
/// node through the connected provider; `Ok(None)` means the call produced
/// nothing this time.
#[async_trait]
pub trait LiquiditySdk: Send + Sync {
    async fn get_pools(&self, ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError>;

    async fn get_my_lp_tokens(&self, ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError>;

    async fn get_my_uniswap_lp_tokens(&self, ctx: &WalletContext) -> Result<Option<Vec<LpToken>>, FetchError>;

    /// `Ok(None)` when no pair exists for the request.
    async fn get_trade(&self, ctx: &WalletContext, request: &TradeRequest) -> Result<Option<Trade>, FetchError>;
}
