/// Execution Layer
///
/// Mutating calls (swap, wrap, unwrap, approve) and the per-screen error slot
/// their failures land in.

pub mod executor;
pub mod mock_executor;
pub mod runner;

pub use executor::{ActionError, ActionExecutor, ActionKind, ApprovalCallback};
pub use mock_executor::MockExecutor;
pub use runner::ActionRunner;
