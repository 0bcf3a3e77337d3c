use crate::data_sync::notifier::BlockNotifier;
use eyre::{Result, eyre};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Head announced by a `newHeads` notification; quantities stay hex-encoded
/// as they arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: String,
}

impl BlockHeader {
    pub fn block_number(&self) -> Result<u64> {
        parse_quantity(&self.number).map_err(|e| eyre!("bad block number {:?}: {}", self.number, e))
    }

    pub fn timestamp_secs(&self) -> Result<u64> {
        parse_quantity(&self.timestamp).map_err(|e| eyre!("bad timestamp {:?}: {}", self.timestamp, e))
    }
}

fn parse_quantity(hex: &str) -> Result<u64, std::num::ParseIntError> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SUBSCRIBE_NEW_HEADS: &str = r#"{"jsonrpc":"2.0","id":1,"method":"eth_subscribe","params":["newHeads"]}"#;

/// Publishes `newHeads` from a websocket endpoint into a [`BlockNotifier`].
///
/// A lost connection is reopened after `reconnect_delay`; the feed stops
/// for good after `max_reconnect_attempts` failures.
#[derive(Debug, Clone)]
pub struct BlockFeed {
    rpc_url: String,
    connection_timeout: Duration,
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
}

impl BlockFeed {
    pub fn new(rpc_url: String, connection_timeout: Duration, max_reconnect_attempts: u32, reconnect_delay: Duration) -> Self {
        Self { rpc_url, connection_timeout, max_reconnect_attempts, reconnect_delay }
    }

    /// Returns the feed task and its shutdown sender.
    pub fn spawn(&self, notifier: BlockNotifier) -> (JoinHandle<()>, mpsc::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let task = tokio::spawn(self.clone().run(notifier, shutdown_rx));
        (task, shutdown_tx)
    }

    async fn run(self, notifier: BlockNotifier, mut shutdown_rx: mpsc::Receiver<()>) {
        let mut failures = 0u32;

        loop {
            let err = match self.follow(&notifier, &mut shutdown_rx).await {
                Ok(()) => break,
                Err(err) => err,
            };

            failures += 1;
            if failures >= self.max_reconnect_attempts {
                error!("Block feed lost ({}), giving up after {} attempts", err, failures);
                break;
            }
            warn!(
                "Block feed lost ({}), retry {}/{} in {:?}",
                err, failures, self.max_reconnect_attempts, self.reconnect_delay
            );

            let stop = tokio::select! {
                _ = sleep(self.reconnect_delay) => false,
                _ = shutdown_rx.recv() => true,
            };
            if stop {
                break;
            }
        }

        info!("Block feed for {} stopped", self.rpc_url);
    }

    /// One connection's lifetime. `Ok` means shutdown was requested.
    async fn follow(&self, notifier: &BlockNotifier, shutdown_rx: &mut mpsc::Receiver<()>) -> Result<()> {
        let mut ws = self.open().await?;

        loop {
            let next = tokio::select! {
                frame = ws.next() => Some(frame),
                _ = shutdown_rx.recv() => None,
            };
            let Some(frame) = next else {
                let _ = ws.close(None).await;
                return Ok(());
            };

            match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = Self::handle_message(text.as_str(), notifier) {
                        warn!("Skipping malformed notification: {}", e);
                    }
                }
                Some(Ok(Message::Close(close))) => return Err(eyre!("closed by server: {:?}", close)),
                // Pings are answered by tungstenite itself
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(eyre!("stream ended")),
            }
        }
    }

    async fn open(&self) -> Result<WsStream> {
        let url = Url::parse(&self.rpc_url)?;
        debug!("Opening block feed to {}", url);

        let (mut ws, _) = timeout(self.connection_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| eyre!("connecting to {} timed out after {:?}", url, self.connection_timeout))??;

        ws.send(Message::Text(SUBSCRIBE_NEW_HEADS.to_string().into())).await?;
        let ack = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(other)) => return Err(eyre!("unexpected frame before subscription ack: {:?}", other)),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(eyre!("socket closed before subscription ack")),
            }
        };

        let subscription_id = Self::parse_subscription_ack(ack.as_str())?;
        info!("Following newHeads on {} (subscription {})", url, subscription_id);
        Ok(ws)
    }

    /// Subscription id from the `eth_subscribe` reply.
    fn parse_subscription_ack(text: &str) -> Result<String> {
        let reply: Value = serde_json::from_str(text)?;
        if let Some(err) = reply.get("error") {
            return Err(eyre!("eth_subscribe rejected: {}", err));
        }
        reply
            .get("result")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| eyre!("no subscription id in {}", text))
    }

    /// Publish the header carried by a subscription notification.
    /// Returns the block number, or `None` for unrelated messages.
    fn handle_message(text: &str, notifier: &BlockNotifier) -> Result<Option<u64>> {
        let message: Value = serde_json::from_str(text)?;

        let Some(result) = message.get("params").and_then(|params| params.get("result")) else {
            return Ok(None);
        };

        let block_header: BlockHeader = serde_json::from_value(result.clone())?;
        let block_number = block_header.block_number()?;

        let delivered = notifier.notify(&block_header);
        debug!("Block {} delivered to {} listeners", block_number, delivered);

        Ok(Some(block_number))
    }
}
