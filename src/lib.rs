// Three-Layer Architecture
pub mod data_sync; // Data Layer: wallet context, block notifications, resource sync
pub mod logic; // Logic Layer: quotes, action gate, screen sessions
pub mod execution; // Execution Layer: swap/wrap/approve calls and their errors

// Common utilities and types
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    BlockNotifier, LiquiditySdk, LpToken, LpTokenMode, ResourceSyncController, SyncConfig, SyncService,
    SyncServiceBuilder, Trade, TradeRequest, WalletContext, WalletContextHandle,
};
pub use execution::{ActionError, ActionExecutor, ActionRunner};
pub use logic::{ActionDecision, LpTokensSession, Quote, SwapSession, SwapView};
pub use utils::{Token, TokenWrapper};
