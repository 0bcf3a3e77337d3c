use crate::data_sync::context::WalletContext;
use crate::data_sync::controller::{ResourceSyncController, ResourceSyncState, SyncMode, SyncSources};
use crate::data_sync::fetchers::{QuoteState, TradeFetcher};
use crate::data_sync::notifier::BlockNotifier;
use crate::data_sync::sdk::{LiquiditySdk, TradeRequest};
use crate::execution::{ActionError, ActionExecutor, ActionRunner};
use crate::logic::gate::{ActionDecision, GateContext, decide};
use crate::logic::quote::{Quote, evaluate};
use crate::logic::selection::SelectionState;
use crate::utils::amount::{is_empty_amount, parse_amount};
use crate::utils::constants::{ROUTER, is_supported_chain, wrapped_native};
use crate::utils::token::{Token, TokenWrapper, is_native_wrapped_pair};
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("action not permitted: {0}")]
    NotPermitted(ActionDecision),
    #[error(transparent)]
    Action(#[from] ActionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapView {
    /// Connected to a network the swap screen does not serve
    ChangeNetwork,
    Swap,
}

/// State behind the swap screen: token pair, typed amount, allowance, the
/// synced quote, and the action runner.
pub struct SwapSession {
    context: watch::Receiver<WalletContext>,
    supported_chain_ids: Vec<u64>,
    from: SelectionState<TokenWrapper>,
    to: Option<TokenWrapper>,
    request_tx: watch::Sender<Option<TradeRequest>>,
    quote: ResourceSyncController<QuoteState>,
    runner: ActionRunner,
}

impl SwapSession {
    pub fn new(
        sdk: Arc<dyn LiquiditySdk>,
        executor: Arc<dyn ActionExecutor>,
        context: watch::Receiver<WalletContext>,
        notifier: BlockNotifier,
        supported_chain_ids: Vec<u64>,
    ) -> Self {
        let (request_tx, request_rx) = watch::channel(None);
        let quote = ResourceSyncController::spawn(
            "swap-quote",
            TradeFetcher::new(sdk),
            SyncMode::Always,
            QuoteState::default(),
            SyncSources { context: context.clone(), params: request_rx, notifier },
        );

        Self {
            context,
            supported_chain_ids,
            from: SelectionState::new(),
            to: None,
            request_tx,
            quote,
            runner: ActionRunner::new(executor),
        }
    }

    pub fn view(&self) -> SwapView {
        if is_supported_chain(self.context.borrow().chain_id, &self.supported_chain_ids) {
            SwapView::Swap
        } else {
            SwapView::ChangeNetwork
        }
    }

    pub fn from_token(&self) -> Option<&Token> {
        self.from.selected().map(Arc::as_ref)
    }

    pub fn to_token(&self) -> Option<&Token> {
        self.to.as_deref()
    }

    pub fn amount(&self) -> &str {
        self.from.amount()
    }

    pub fn set_from(&mut self, token: Option<TokenWrapper>) {
        self.from.select(token);
        self.on_input_changed();
    }

    pub fn set_to(&mut self, token: Option<TokenWrapper>) {
        if token.is_none() {
            self.from.clear_amount();
        }
        self.to = token;
        self.on_input_changed();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.from.set_amount(amount);
        self.on_input_changed();
    }

    pub fn from_allowed(&self) -> bool {
        self.from.allowed()
    }

    pub fn set_from_allowed(&self, allowed: bool) {
        self.from.set_allowed(allowed);
    }

    /// Source list hides empty balances unless the user added the token.
    pub fn from_token_hidden(&self, token: &Token) -> bool {
        !self.context.borrow().is_custom_token(token.get_address()) && token.get_balance().is_zero()
    }

    /// Destination list hides the token being sold.
    pub fn to_token_hidden(&self, token: &Token) -> bool {
        self.from_token().is_some_and(|from| from.get_symbol() == token.get_symbol())
    }

    pub fn wrapped_native(&self) -> Address {
        wrapped_native(self.context.borrow().chain_id)
    }

    pub fn is_wrap_pair(&self) -> bool {
        is_native_wrapped_pair(self.from_token(), self.to_token(), self.wrapped_native())
    }

    /// True while the quote is being fetched or still answers an older request.
    pub fn loading(&self) -> bool {
        self.is_pending(&self.quote.state())
    }

    pub fn quote_state(&self) -> ResourceSyncState<QuoteState> {
        self.quote.state()
    }

    pub fn subscribe_quote(&self) -> watch::Receiver<ResourceSyncState<QuoteState>> {
        self.quote.subscribe()
    }

    pub fn quote(&self) -> Option<Quote> {
        evaluate(self.quote.value().trade.as_ref())
    }

    pub fn refresh(&self) {
        self.quote.refresh();
    }

    /// Settled with a complete request and still no trade: the pair does not exist.
    pub fn pair_missing(&self) -> bool {
        self.request_tx.borrow().is_some() && !self.loading() && self.quote.value().trade.is_none()
    }

    /// Output shown for a wrap or unwrap, which converts one-to-one.
    pub fn wrap_preview(&self) -> String {
        match self.to_token() {
            Some(to) if !is_empty_amount(self.amount()) => format!("{} {}", self.amount(), to.get_symbol()),
            _ => "N/A".to_string(),
        }
    }

    pub fn decision(&self) -> ActionDecision {
        let state = self.quote.state();
        let pending = self.is_pending(&state);
        let quote = evaluate(state.value.trade.as_ref());
        let wrapped_native = self.wrapped_native();

        decide(&GateContext {
            from: self.from_token(),
            to: self.to_token(),
            amount: self.amount(),
            allowed: self.from_allowed(),
            loading: pending,
            quote: quote.as_ref(),
            // The flag only speaks for the request that produced it
            unsupported: state.value.unsupported && !pending,
            wrapped_native,
        })
    }

    /// Error to display under the controls.
    pub fn error(&self) -> Option<&ActionError> {
        self.runner.error()
    }

    /// Run the primary action the gate currently permits.
    pub async fn submit(&mut self) -> Result<(), SessionError> {
        let decision = self.decision();
        match decision {
            ActionDecision::NeedsWrap => {
                let amount = self.parsed_amount(decision)?;
                self.runner.wrap(amount).await?;
            }
            ActionDecision::NeedsUnwrap => {
                let amount = self.parsed_amount(decision)?;
                self.runner.unwrap(amount).await?;
            }
            ActionDecision::ReadyToSwap { needs_approval: false } => {
                let request = self.request_tx.borrow().clone().ok_or(SessionError::NotPermitted(decision))?;
                self.runner.swap(&request).await?;
            }
            _ => return Err(SessionError::NotPermitted(decision)),
        }
        Ok(())
    }

    /// Approve the router to spend the source token. The allowance flag flips
    /// as soon as the executor reports success.
    pub async fn approve(&mut self) -> Result<(), SessionError> {
        let decision = self.decision();
        if !decision.needs_approval() {
            return Err(SessionError::NotPermitted(decision));
        }
        let Some(token) = self.from.selected().cloned() else {
            return Err(SessionError::NotPermitted(decision));
        };

        let allowance = self.from.allowance_flag();
        self.runner.approve(&token, ROUTER, Box::new(move || allowance.set(true))).await?;
        Ok(())
    }

    pub async fn shutdown(self) -> eyre::Result<()> {
        self.quote.shutdown().await
    }

    fn is_pending(&self, state: &ResourceSyncState<QuoteState>) -> bool {
        state.loading || state.value.request != *self.request_tx.borrow()
    }

    fn parsed_amount(&self, decision: ActionDecision) -> Result<U256, SessionError> {
        let decimals = self.from_token().map(|t| t.get_decimals()).ok_or(SessionError::NotPermitted(decision))?;
        parse_amount(self.amount(), decimals).map_err(|_| SessionError::NotPermitted(decision))
    }

    fn on_input_changed(&mut self) {
        self.runner.clear_error();

        let request = self.build_request();
        self.request_tx.send_if_modified(|current| {
            if *current == request {
                return false;
            }
            debug!("Trade request changed: {:?}", request.as_ref().map(|r| (r.from.get_symbol(), r.to.get_symbol(), r.amount)));
            *current = request;
            true
        });
    }

    fn build_request(&self) -> Option<TradeRequest> {
        let from = self.from.selected()?.clone();
        let to = self.to.clone()?;
        if self.is_wrap_pair() {
            return None;
        }
        let amount = parse_amount(self.amount(), from.get_decimals()).ok().filter(|a| !a.is_zero())?;
        Some(TradeRequest { from, to, amount })
    }
}
