/// Data Synchronization Layer
///
/// Keeps remote resources in step with the wallet context and the chain:
///
/// - Wallet context (provider, account, network, watched tokens)
/// - Block notifier fed by a websocket newHeads subscription
/// - Resource sync controllers that refetch on context change, on refresh
///   and on every new block, discarding stale responses
/// - The liquidity SDK seam and its fetchers

pub mod config;
pub mod context;
pub mod controller;
pub mod fetchers;
pub mod mock_sdk;
pub mod notifier;
pub mod sdk;
pub mod service;
pub mod websocket;


pub use config::SyncConfig;
pub use context::{WalletContext, WalletContextHandle};
pub use controller::{ResourceFetcher, ResourceSyncController, ResourceSyncState, SyncMode, SyncSources};
pub use fetchers::{LpTokenMode, LpTokensFetcher, QuoteState, TradeFetcher};
pub use mock_sdk::MockSdk;
pub use notifier::{BlockNotifier, BlockSubscription};
pub use sdk::{FetchError, Fraction, LiquiditySdk, LpToken, TokenAmount, Trade, TradeRequest};
pub use service::{SyncService, SyncServiceBuilder};
pub use websocket::{BlockFeed, BlockHeader};
