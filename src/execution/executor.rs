use crate::data_sync::sdk::TradeRequest;
use crate::utils::constants::USER_REJECTED_CODE;
use crate::utils::token::Token;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use strum_macros::Display;
use thiserror::Error;

/// Structured failure reported by the wallet for a mutating call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct ActionError {
    pub code: i64,
    pub message: String,
}

impl ActionError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User denied transaction signature.")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    Swap,
    Wrap,
    Unwrap,
    Approve,
}

/// Invoked once when an approval has been confirmed.
pub type ApprovalCallback = Box<dyn FnOnce() + Send>;

/// Mutating calls against the chain. Implementations sign and broadcast
/// through the connected signer.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn swap(&self, request: &TradeRequest) -> Result<(), ActionError>;

    async fn wrap(&self, amount: U256) -> Result<(), ActionError>;

    async fn unwrap(&self, amount: U256) -> Result<(), ActionError>;

    /// Must call `on_success` when the approval is confirmed.
    async fn approve(&self, token: &Token, spender: Address, on_success: ApprovalCallback) -> Result<(), ActionError>;
}
