use super::executor::{ActionError, ActionExecutor, ActionKind, ApprovalCallback};
use crate::data_sync::sdk::TradeRequest;
use crate::utils::token::Token;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-memory executor. Records every call, fails when told to, and confirms
/// approvals immediately.
#[derive(Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<ActionKind>>,
    next_failure: Mutex<Option<ActionError>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error`.
    pub async fn fail_next(&self, error: ActionError) {
        *self.next_failure.lock().await = Some(error);
    }

    pub async fn calls(&self) -> Vec<ActionKind> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, kind: ActionKind) -> Result<(), ActionError> {
        self.calls.lock().await.push(kind);
        match self.next_failure.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActionExecutor for MockExecutor {
    async fn swap(&self, _request: &TradeRequest) -> Result<(), ActionError> {
        self.record(ActionKind::Swap).await
    }

    async fn wrap(&self, _amount: U256) -> Result<(), ActionError> {
        self.record(ActionKind::Wrap).await
    }

    async fn unwrap(&self, _amount: U256) -> Result<(), ActionError> {
        self.record(ActionKind::Unwrap).await
    }

    async fn approve(&self, _token: &Token, _spender: Address, on_success: ApprovalCallback) -> Result<(), ActionError> {
        self.record(ActionKind::Approve).await?;
        on_success();
        Ok(())
    }
}
