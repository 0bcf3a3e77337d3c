use crate::data_sync::context::WalletContext;
use crate::data_sync::notifier::{BlockNotifier, BlockSubscription};
use crate::data_sync::sdk::FetchError;
use crate::data_sync::websocket::BlockHeader;
use alloy_primitives::Address;
use async_trait::async_trait;
use eyre::{Result, eyre};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// When a controller is allowed to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Sync whenever a wallet is connected
    Always,
    /// Additionally require at least one user-added token
    RequiresWatchedTokens,
}

/// Fetches one kind of remote resource for a given wallet context.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;
    /// Extra inputs that take part in the dependency key (e.g. the trade request)
    type Params: Clone + PartialEq + Send + Sync + 'static;

    /// `Ok(None)` means "no update": the previous value is kept.
    async fn fetch(&self, ctx: &WalletContext, params: &Self::Params) -> Result<Option<Self::Output>, FetchError>;
}

/// State owned by a single controller.
#[derive(Debug, Clone)]
pub struct ResourceSyncState<T> {
    /// Last successfully fetched payload
    pub value: T,
    /// True while the most recently issued fetch is outstanding
    pub loading: bool,
    /// Manual refresh marker in unix millis; part of the dependency key
    pub refresh_trigger: u64,
    epoch: u64,
    latest_issued: u64,
    last_applied: u64,
}

impl<T> ResourceSyncState<T> {
    fn new(value: T) -> Self {
        Self { value, loading: true, refresh_trigger: 0, epoch: 0, latest_issued: 0, last_applied: 0 }
    }

    /// Bumped on every dependency change
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Id of the request whose result is in `value` (0 if none yet)
    pub fn applied_request(&self) -> u64 {
        self.last_applied
    }

    pub fn issued_requests(&self) -> u64 {
        self.latest_issued
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FetchTicket {
    epoch: u64,
    id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DependencyKey {
    connected: bool,
    address: Option<Address>,
    chain_id: Option<u64>,
    watched_tokens: usize,
    refresh_trigger: u64,
}

impl DependencyKey {
    fn new(ctx: &WalletContext, refresh_trigger: u64) -> Self {
        Self {
            connected: ctx.is_connected(),
            address: ctx.address,
            chain_id: ctx.chain_id,
            watched_tokens: ctx.custom_tokens.len(),
            refresh_trigger,
        }
    }
}

/// Where a controller takes its triggers from.
pub struct SyncSources<P> {
    pub context: watch::Receiver<WalletContext>,
    pub params: watch::Receiver<P>,
    pub notifier: BlockNotifier,
}

/// Resource Sync Controller
///
/// Keeps one remote resource fresh: it re-fetches whenever the wallet context,
/// the fetch parameters or the refresh trigger change, and on every new block
/// while its preconditions hold. Results are tagged with the request that
/// produced them; a result from an older dependency context, or one that
/// resolves after a newer request already landed, is discarded.
pub struct ResourceSyncController<T> {
    name: String,
    state: watch::Receiver<ResourceSyncState<T>>,
    refresh_tx: watch::Sender<u64>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    driver: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + Sync + 'static> ResourceSyncController<T> {
    /// Start a controller. `initial` is the value exposed until the first
    /// successful fetch.
    pub fn spawn<F>(name: impl Into<String>, fetcher: F, mode: SyncMode, initial: T, sources: SyncSources<F::Params>) -> Self
    where
        F: ResourceFetcher<Output = T>,
    {
        let name = name.into();
        let (state_tx, state_rx) = watch::channel(ResourceSyncState::new(initial));
        let (refresh_tx, refresh_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let driver = Driver {
            name: name.clone(),
            fetcher: Arc::new(fetcher),
            mode,
            state: Arc::new(state_tx),
            context: sources.context,
            params: sources.params,
            refresh: refresh_rx,
            notifier: sources.notifier,
            subscription: None,
            fetches: JoinSet::new(),
        };

        info!("Starting resource sync controller {}", name);
        let handle = tokio::spawn(driver.run(shutdown_rx));

        Self {
            name,
            state: state_rx,
            refresh_tx,
            shutdown_tx: Some(shutdown_tx),
            driver: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ResourceSyncState<T> {
        self.state.borrow().clone()
    }

    pub fn value(&self) -> T {
        self.state.borrow().value.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceSyncState<T>> {
        self.state.clone()
    }

    /// Force a re-fetch cycle by moving the refresh trigger to the current time.
    pub fn refresh(&self) {
        let now = now_millis();
        self.refresh_tx.send_modify(|trigger| *trigger = now.max(*trigger + 1));
    }

    pub fn is_running(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| !driver.is_finished())
    }

    /// Stop syncing: deregisters the block listener and aborts outstanding fetches.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(driver) = self.driver.take() {
            driver.await.map_err(|e| eyre!("Controller {} failed during shutdown: {}", self.name, e))?;
        }
        Ok(())
    }
}

struct Driver<F: ResourceFetcher> {
    name: String,
    fetcher: Arc<F>,
    mode: SyncMode,
    state: Arc<watch::Sender<ResourceSyncState<F::Output>>>,
    context: watch::Receiver<WalletContext>,
    params: watch::Receiver<F::Params>,
    refresh: watch::Receiver<u64>,
    notifier: BlockNotifier,
    subscription: Option<BlockSubscription>,
    fetches: JoinSet<()>,
}

enum Event {
    Shutdown,
    Changed,
    ContextClosed,
    ParamsClosed,
    Block(BlockHeader),
    FetchFinished,
}

impl<F: ResourceFetcher> Driver<F> {
    async fn run(mut self, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut context_open = true;
        let mut params_open = true;
        let mut current_key: Option<(DependencyKey, F::Params)> = None;

        loop {
            let ctx = self.context.borrow_and_update().clone();
            let params = self.params.borrow_and_update().clone();
            let refresh_trigger = *self.refresh.borrow_and_update();

            let key = (DependencyKey::new(&ctx, refresh_trigger), params.clone());
            if current_key.as_ref() != Some(&key) {
                current_key = Some(key);
                self.on_dependency_change(&ctx, &params, refresh_trigger);
            }

            let event = tokio::select! {
                _ = &mut shutdown_rx => Event::Shutdown,
                res = self.refresh.changed() => match res {
                    Ok(()) => Event::Changed,
                    Err(_) => Event::Shutdown,
                },
                res = self.context.changed(), if context_open => match res {
                    Ok(()) => Event::Changed,
                    Err(_) => Event::ContextClosed,
                },
                res = self.params.changed(), if params_open => match res {
                    Ok(()) => Event::Changed,
                    Err(_) => Event::ParamsClosed,
                },
                Some(header) = next_block(&mut self.subscription) => Event::Block(header),
                Some(joined) = self.fetches.join_next() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("{}: fetch task panicked", self.name);
                        }
                    }
                    Event::FetchFinished
                }
            };

            match event {
                Event::Shutdown => break,
                Event::Changed | Event::FetchFinished => {}
                Event::ContextClosed => context_open = false,
                Event::ParamsClosed => params_open = false,
                Event::Block(header) => {
                    debug!("{}: new block {}, refetching", self.name, header.number);
                    self.start_fetch(&ctx, &params);
                }
            }
        }

        self.subscription = None;
        self.fetches.abort_all();
        info!("Resource sync controller {} stopped", self.name);
    }

    fn preconditions_hold(&self, ctx: &WalletContext) -> bool {
        ctx.is_connected()
            && match self.mode {
                SyncMode::Always => true,
                SyncMode::RequiresWatchedTokens => !ctx.custom_tokens.is_empty(),
            }
    }

    fn on_dependency_change(&mut self, ctx: &WalletContext, params: &F::Params, refresh_trigger: u64) {
        // Release the old registration before any new one is made.
        self.subscription = None;

        let ready = self.preconditions_hold(ctx);
        self.state.send_modify(|state| {
            state.epoch += 1;
            state.refresh_trigger = refresh_trigger;
            if ready {
                state.loading = true;
            }
        });

        if ready {
            self.start_fetch(ctx, params);
            self.subscription = Some(self.notifier.subscribe(self.name.clone()));
        } else {
            debug!("{}: preconditions not met, idle", self.name);
        }
    }

    fn start_fetch(&mut self, ctx: &WalletContext, params: &F::Params) {
        let mut ticket = FetchTicket { epoch: 0, id: 0 };
        self.state.send_if_modified(|state| {
            state.latest_issued += 1;
            ticket = FetchTicket { epoch: state.epoch, id: state.latest_issued };
            false
        });

        let guard = LoadingGuard { state: Arc::clone(&self.state), id: ticket.id };
        let state = Arc::clone(&self.state);
        let fetcher = Arc::clone(&self.fetcher);
        let name = self.name.clone();
        let ctx = ctx.clone();
        let params = params.clone();

        debug!("{}: issuing request #{} (epoch {})", name, ticket.id, ticket.epoch);
        self.fetches.spawn(async move {
            let _guard = guard;
            match fetcher.fetch(&ctx, &params).await {
                Ok(Some(value)) => apply_result(&state, ticket, value, &name),
                Ok(None) => debug!("{}: request #{} returned nothing, keeping value", name, ticket.id),
                Err(e) => warn!("{}: request #{} failed: {}", name, ticket.id, e),
            }
        });
    }
}

fn apply_result<T>(state: &watch::Sender<ResourceSyncState<T>>, ticket: FetchTicket, value: T, name: &str) {
    state.send_if_modified(move |state| {
        if state.epoch != ticket.epoch {
            debug!("{}: discarding request #{} from epoch {} (now {})", name, ticket.id, ticket.epoch, state.epoch);
            return false;
        }
        if ticket.id <= state.last_applied {
            debug!("{}: discarding request #{}, #{} already applied", name, ticket.id, state.last_applied);
            return false;
        }
        state.value = value;
        state.last_applied = ticket.id;
        true
    });
}

/// Clears `loading` when the fetch it guards ends, however it ends, provided
/// no newer request has been issued since.
struct LoadingGuard<T> {
    state: Arc<watch::Sender<ResourceSyncState<T>>>,
    id: u64,
}

impl<T> Drop for LoadingGuard<T> {
    fn drop(&mut self) {
        let id = self.id;
        self.state.send_if_modified(|state| {
            if state.latest_issued == id && state.loading {
                state.loading = false;
                true
            } else {
                false
            }
        });
    }
}

async fn next_block(subscription: &mut Option<BlockSubscription>) -> Option<BlockHeader> {
    match subscription.as_mut() {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
