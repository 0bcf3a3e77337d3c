use super::executor::{ActionError, ActionExecutor, ActionKind, ApprovalCallback};
use crate::data_sync::sdk::TradeRequest;
use crate::utils::token::Token;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs mutating actions for one screen and owns that screen's error slot.
///
/// The slot is cleared before every attempt and filled with the structured
/// error when an attempt fails. User rejections are stored but never shown.
pub struct ActionRunner {
    executor: Arc<dyn ActionExecutor>,
    error: Option<ActionError>,
}

impl ActionRunner {
    pub fn new(executor: Arc<dyn ActionExecutor>) -> Self {
        Self { executor, error: None }
    }

    /// Error to display, if any.
    pub fn error(&self) -> Option<&ActionError> {
        self.error.as_ref().filter(|e| !e.is_user_rejection())
    }

    pub fn last_error(&self) -> Option<&ActionError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub async fn swap(&mut self, request: &TradeRequest) -> Result<(), ActionError> {
        self.clear_error();
        let result = self.executor.swap(request).await;
        self.finish(ActionKind::Swap, result)
    }

    pub async fn wrap(&mut self, amount: U256) -> Result<(), ActionError> {
        self.clear_error();
        let result = self.executor.wrap(amount).await;
        self.finish(ActionKind::Wrap, result)
    }

    pub async fn unwrap(&mut self, amount: U256) -> Result<(), ActionError> {
        self.clear_error();
        let result = self.executor.unwrap(amount).await;
        self.finish(ActionKind::Unwrap, result)
    }

    pub async fn approve(&mut self, token: &Token, spender: Address, on_success: ApprovalCallback) -> Result<(), ActionError> {
        self.clear_error();
        let result = self.executor.approve(token, spender, on_success).await;
        self.finish(ActionKind::Approve, result)
    }

    fn finish(&mut self, kind: ActionKind, result: Result<(), ActionError>) -> Result<(), ActionError> {
        match &result {
            Ok(()) => info!("{} submitted", kind),
            Err(e) => {
                if e.is_user_rejection() {
                    info!("{} rejected by user", kind);
                } else {
                    warn!("{} failed: {}", kind, e);
                }
                self.error = Some(e.clone());
            }
        }
        result
    }
}
