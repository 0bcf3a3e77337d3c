/// Logic Layer
///
/// Screen state built on the synced resources:
/// - Quote evaluation and the price impact ceiling
/// - The ordered action gate for the swap controls
/// - Selection, amount and allowance bookkeeping
/// - LP-token and swap sessions tying the above to their controllers

pub mod gate;
pub mod lp_tokens;
pub mod quote;
pub mod selection;
pub mod swap;

pub use gate::{ActionDecision, GateContext, decide};
pub use lp_tokens::LpTokensSession;
pub use quote::{PRICE_DECIMALS, PriceImpact, Quote, evaluate};
pub use selection::{AllowanceFlag, SelectionState};
pub use swap::{SessionError, SwapSession, SwapView};
