use crate::logic::quote::Quote;
use crate::utils::amount::parse_amount;
use crate::utils::token::{Token, is_native_wrapped_pair};
use alloy_primitives::Address;
use strum_macros::{Display, IntoStaticStr};

/// The single action the swap controls expose.
///
/// `ReadyToSwap` carries the parallel approval sub-decision: when
/// `needs_approval` is set, an approve control is shown next to a disabled
/// swap control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ActionDecision {
    /// Nothing to act on yet; render a disabled swap control
    NoOp,
    InsufficientBalance,
    NeedsUnwrap,
    NeedsWrap,
    Unsupported,
    Fetching,
    PriceImpactTooHigh,
    ReadyToSwap { needs_approval: bool },
}

impl ActionDecision {
    pub fn needs_approval(&self) -> bool {
        matches!(self, ActionDecision::ReadyToSwap { needs_approval: true })
    }

    /// Whether the primary control can be pressed.
    pub fn is_enabled(&self) -> bool {
        match self {
            ActionDecision::NeedsWrap | ActionDecision::NeedsUnwrap => true,
            ActionDecision::ReadyToSwap { needs_approval } => !needs_approval,
            _ => false,
        }
    }
}

/// Everything the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    pub from: Option<&'a Token>,
    pub to: Option<&'a Token>,
    /// Amount as typed by the user
    pub amount: &'a str,
    /// Router may spend `from`
    pub allowed: bool,
    pub loading: bool,
    pub quote: Option<&'a Quote>,
    pub unsupported: bool,
    /// Wrapped native token on the connected chain
    pub wrapped_native: Address,
}

impl GateContext<'_> {
    pub fn is_wrap_pair(&self) -> bool {
        is_native_wrapped_pair(self.from, self.to, self.wrapped_native)
    }
}

/// Pick the action for `ctx`. Checks run in a fixed order and the first
/// match wins, so e.g. an insufficient balance hides every later condition.
pub fn decide(ctx: &GateContext<'_>) -> ActionDecision {
    let (Some(from), Some(to)) = (ctx.from, ctx.to) else {
        return ActionDecision::NoOp;
    };
    let amount = match parse_amount(ctx.amount, from.get_decimals()) {
        Ok(amount) if !amount.is_zero() => amount,
        _ => return ActionDecision::NoOp,
    };
    // Wrapping converts one-to-one and never waits on a quote.
    if !ctx.is_wrap_pair() && !ctx.loading && ctx.quote.is_none() {
        return ActionDecision::NoOp;
    }

    if amount > from.get_balance() {
        return ActionDecision::InsufficientBalance;
    }
    if from.is_wrapped(ctx.wrapped_native) && to.is_native() {
        return ActionDecision::NeedsUnwrap;
    }
    if from.is_native() && to.is_wrapped(ctx.wrapped_native) {
        return ActionDecision::NeedsWrap;
    }
    if ctx.unsupported {
        return ActionDecision::Unsupported;
    }
    let quote = match ctx.quote {
        Some(quote) if !ctx.loading => quote,
        _ => return ActionDecision::Fetching,
    };
    if quote.is_price_impact_too_high() {
        return ActionDecision::PriceImpactTooHigh;
    }

    ActionDecision::ReadyToSwap { needs_approval: !from.is_native() && !ctx.allowed }
}
