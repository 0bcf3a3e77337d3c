pub mod amount;
pub mod config_loader;
pub mod constants;
pub mod token;

pub use amount::{AmountError, format_fixed, is_empty_amount, parse_amount, scale_ratio};
pub use config_loader::*;
pub use constants::*;
pub use token::{Token, TokenWrapper, is_native_wrapped_pair};
