use alloy_primitives::{Address, address};

pub const NATIVE: Address = Address::ZERO;

/// Chain ids the swap screen is available on (mainnet, kovan).
pub const SUPPORTED_CHAIN_IDS: [u64; 2] = [1, 42];

/// Price impact ceiling in percent. Quotes above it are not executable.
pub const MAX_PRICE_IMPACT: u64 = 7;

/// Swap fee charged by the router pairs, in basis points.
pub const SWAP_FEE_BPS: u64 = 30;

/// Wallet error code for a request the user rejected.
pub const USER_REJECTED_CODE: i64 = 4001;

#[non_exhaustive]
pub struct ChainId;

impl ChainId {
    pub const MAINNET: u64 = 1;
    pub const KOVAN: u64 = 42;
}

#[non_exhaustive]
pub struct WrappedNative;

impl WrappedNative {
    pub const MAINNET: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    pub const KOVAN: Address = address!("0xd0A1E359811322d97991E03f863a0C30C2cF029C");
}

/// Router contract that spends approved tokens on swaps.
pub const ROUTER: Address = address!("0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F");

/// Wrapped native token for `chain_id`, defaulting to mainnet.
pub fn wrapped_native(chain_id: Option<u64>) -> Address {
    match chain_id {
        Some(ChainId::KOVAN) => WrappedNative::KOVAN,
        _ => WrappedNative::MAINNET,
    }
}

pub fn is_supported_chain(chain_id: Option<u64>, supported: &[u64]) -> bool {
    chain_id.is_some_and(|id| supported.contains(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_native_per_chain() {
        assert_eq!(wrapped_native(Some(ChainId::MAINNET)), WrappedNative::MAINNET);
        assert_eq!(wrapped_native(Some(ChainId::KOVAN)), WrappedNative::KOVAN);
        assert_eq!(wrapped_native(None), WrappedNative::MAINNET);
    }

    #[test]
    fn test_supported_chains() {
        assert!(is_supported_chain(Some(1), &SUPPORTED_CHAIN_IDS));
        assert!(is_supported_chain(Some(42), &SUPPORTED_CHAIN_IDS));
        assert!(!is_supported_chain(Some(137), &SUPPORTED_CHAIN_IDS));
        assert!(!is_supported_chain(None, &SUPPORTED_CHAIN_IDS));
    }
}
