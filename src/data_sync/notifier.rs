use crate::data_sync::websocket::BlockHeader;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub type SubscriptionId = u64;

struct Listener {
    name: String,
    tx: mpsc::Sender<BlockHeader>,
}

struct NotifierInner {
    listeners: DashMap<SubscriptionId, Listener>,
    next_id: AtomicU64,
    buffer_size: usize,
}

/// Block Change Notifier
///
/// Fans every new block header out to the registered listeners. Registration
/// hands back a [`BlockSubscription`]; the listener stays registered exactly as
/// long as that handle is alive, so two listeners can never clobber each other
/// even when they share a name.
#[derive(Clone)]
pub struct BlockNotifier {
    inner: Arc<NotifierInner>,
}

impl BlockNotifier {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                listeners: DashMap::new(),
                next_id: AtomicU64::new(1),
                buffer_size: buffer_size.max(1),
            }),
        }
    }

    /// Register a listener under `name`. Dropping the returned handle deregisters it.
    pub fn subscribe(&self, name: impl Into<String>) -> BlockSubscription {
        let name = name.into();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inner.buffer_size);

        self.inner.listeners.insert(id, Listener { name: name.clone(), tx });
        debug!("Block listener {} registered as #{}", name, id);

        BlockSubscription { id, name, rx, inner: Arc::clone(&self.inner) }
    }

    /// Deliver `header` to every listener. Returns how many received it.
    pub fn notify(&self, header: &BlockHeader) -> usize {
        let mut delivered = 0;

        for entry in self.inner.listeners.iter() {
            match entry.tx.try_send(header.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("Block listener {} is lagging, dropping block {}", entry.name, header.number);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("Block listener {} is closing", entry.name);
                }
            }
        }

        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Number of live registrations under `name`.
    pub fn registrations(&self, name: &str) -> usize {
        self.inner.listeners.iter().filter(|entry| entry.name == name).count()
    }
}

impl Default for BlockNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

/// A live block-listener registration.
pub struct BlockSubscription {
    id: SubscriptionId,
    name: String,
    rx: mpsc::Receiver<BlockHeader>,
    inner: Arc<NotifierInner>,
}

impl BlockSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn recv(&mut self) -> Option<BlockHeader> {
        self.rx.recv().await
    }
}

impl Drop for BlockSubscription {
    fn drop(&mut self) {
        self.inner.listeners.remove(&self.id);
        debug!("Block listener {} (#{}) deregistered", self.name, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(number: u64) -> BlockHeader {
        BlockHeader {
            number: format!("0x{:x}", number),
            hash: "0xabcd".to_string(),
            parent_hash: "0x1234".to_string(),
            timestamp: "0x61234567".to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_and_notify() {
        let notifier = BlockNotifier::new(4);
        let mut first = notifier.subscribe("lp-tokens");
        let mut second = notifier.subscribe("swap-quote");

        assert_eq!(notifier.notify(&header(10)), 2);
        assert_eq!(first.recv().await.unwrap().block_number().unwrap(), 10);
        assert_eq!(second.recv().await.unwrap().block_number().unwrap(), 10);
    }

    #[test]
    fn test_drop_deregisters_only_own_entry() {
        let notifier = BlockNotifier::new(4);
        let first = notifier.subscribe("lp-tokens/pools");
        let second = notifier.subscribe("lp-tokens/pools");

        assert_ne!(first.id(), second.id());
        assert_eq!(notifier.registrations("lp-tokens/pools"), 2);

        drop(first);
        assert_eq!(notifier.registrations("lp-tokens/pools"), 1);
        assert_eq!(notifier.listener_count(), 1);

        drop(second);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_full_listener_drops_block() {
        let notifier = BlockNotifier::new(1);
        let _slow = notifier.subscribe("slow");

        assert_eq!(notifier.notify(&header(1)), 1);
        assert_eq!(notifier.notify(&header(2)), 0);
    }
}
