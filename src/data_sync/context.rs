use crate::utils::token::TokenWrapper;
use alloy_primitives::Address;
use tokio::sync::watch;
use tracing::info;
use url::Url;

/// Wallet and network context every controller syncs against.
#[derive(Debug, Clone, Default)]
pub struct WalletContext {
    /// RPC endpoint of the connected provider
    pub provider: Option<Url>,
    /// Account able to sign transactions
    pub signer: Option<Address>,
    /// Account whose positions and balances are shown
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    /// Tokens the user added by hand
    pub custom_tokens: Vec<TokenWrapper>,
}

impl WalletContext {
    pub fn is_connected(&self) -> bool {
        self.provider.is_some() && self.signer.is_some()
    }

    pub fn is_custom_token(&self, address: Address) -> bool {
        self.custom_tokens.iter().any(|token| token.get_address() == address)
    }
}

/// Publishing side of the wallet context. Account and network switches are
/// applied here and observed by every controller holding a receiver.
#[derive(Debug, Clone)]
pub struct WalletContextHandle {
    tx: watch::Sender<WalletContext>,
}

impl WalletContextHandle {
    pub fn new(initial: WalletContext) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletContext> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> WalletContext {
        self.tx.borrow().clone()
    }

    pub fn connect(&self, provider: Url, signer: Address, chain_id: u64) {
        info!("Wallet {} connected on chain {}", signer, chain_id);
        self.tx.send_modify(|ctx| {
            ctx.provider = Some(provider);
            ctx.signer = Some(signer);
            ctx.address = Some(signer);
            ctx.chain_id = Some(chain_id);
        });
    }

    pub fn disconnect(&self) {
        info!("Wallet disconnected");
        self.tx.send_modify(|ctx| {
            ctx.provider = None;
            ctx.signer = None;
            ctx.address = None;
        });
    }

    pub fn switch_account(&self, address: Address) {
        self.tx.send_if_modified(|ctx| {
            if ctx.address == Some(address) {
                return false;
            }
            info!("Switched account to {}", address);
            ctx.signer = Some(address);
            ctx.address = Some(address);
            true
        });
    }

    pub fn switch_network(&self, chain_id: u64) {
        self.tx.send_if_modified(|ctx| {
            if ctx.chain_id == Some(chain_id) {
                return false;
            }
            info!("Switched network to chain {}", chain_id);
            ctx.chain_id = Some(chain_id);
            true
        });
    }

    pub fn add_custom_token(&self, token: TokenWrapper) {
        self.tx.send_if_modified(|ctx| {
            if ctx.is_custom_token(token.get_address()) {
                return false;
            }
            ctx.custom_tokens.push(token);
            true
        });
    }

    pub fn remove_custom_token(&self, address: Address) {
        self.tx.send_if_modified(|ctx| {
            let before = ctx.custom_tokens.len();
            ctx.custom_tokens.retain(|token| token.get_address() != address);
            ctx.custom_tokens.len() != before
        });
    }
}

impl Default for WalletContextHandle {
    fn default() -> Self {
        Self::new(WalletContext::default())
    }
}
