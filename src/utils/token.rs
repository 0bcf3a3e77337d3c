use crate::utils::constants::NATIVE;
use alloy_primitives::utils::Unit;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::default::Default;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A token as listed on the swap screen, together with the balance the
/// connected account holds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    decimals: u8,
    name: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    balance: U256,
}

pub type TokenWrapper = Arc<Token>;

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.get_address()
    }
}

impl Eq for Token {}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.get_address())
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Token {
    pub fn new(address: Address) -> Token {
        Token { address, decimals: 18, ..Token::default() }
    }

    pub fn new_with_data(address: Address, symbol: Option<String>, name: Option<String>, decimals: Option<u8>) -> Token {
        Token { address, symbol, name, decimals: decimals.unwrap_or(18), balance: U256::ZERO }
    }

    /// The chain's native asset (ETH), addressed as the zero address.
    pub fn native() -> Token {
        Token::new_with_data(NATIVE, Some("ETH".to_string()), Some("Ethereum".to_string()), Some(18))
    }

    pub fn with_balance(mut self, balance: U256) -> Token {
        self.balance = balance;
        self
    }

    // For testing purposes
    pub fn repeat_byte(byte: u8) -> Token {
        Token::new(Address::repeat_byte(byte))
    }

    pub fn get_symbol(&self) -> String {
        self.symbol.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_name(&self) -> String {
        self.name.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_decimals(&self) -> u8 {
        self.decimals
    }

    pub fn get_exp(&self) -> U256 {
        if self.decimals == 18 { Unit::ETHER.wei() } else { U256::from(10).pow(U256::from(self.decimals)) }
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    pub fn get_balance(&self) -> U256 {
        self.balance
    }

    pub fn is_native(&self) -> bool {
        self.address == NATIVE
    }

    /// True if this token is the wrapped form of the native asset at `wrapped`.
    pub fn is_wrapped(&self, wrapped: Address) -> bool {
        self.address == wrapped
    }
}

/// True for a native/wrapped-native pair in either direction.
pub fn is_native_wrapped_pair(from: Option<&Token>, to: Option<&Token>, wrapped: Address) -> bool {
    match (from, to) {
        (Some(from), Some(to)) => {
            (from.is_native() && to.is_wrapped(wrapped)) || (from.is_wrapped(wrapped) && to.is_native())
        }
        _ => false,
    }
}
