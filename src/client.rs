//! Relay client.
//!
//! Connects to the relay over TCP, speaks the newline-delimited JSON
//! protocol, and surfaces inbound events as a channel of
//! [`ServerMessage`]. Reconnection uses a fixed backoff delay; messages
//! missed during an outage are simply lost, and the normal CRUD read
//! path is the authoritative fallback.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::protocol::{ClientMessage, ServerMessage};

/// The send half of a relay connection.
pub struct RelaySender {
    writer: OwnedWriteHalf,
}

impl RelaySender {
    /// Send one message to the relay.
    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let line = serde_json::to_string(msg)?;
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|_| Error::ChannelClosed)?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|_| Error::ChannelClosed)?;
        Ok(())
    }
}

/// A live connection to the relay.
pub struct RelayClient {
    sender: RelaySender,
    incoming: mpsc::UnboundedReceiver<ServerMessage>,
}

impl RelayClient {
    /// Connect and start the background reader.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let socket = TcpStream::connect(addr).await?;
        let (reader, writer) = socket.into_split();

        let (incoming_tx, incoming) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ServerMessage>(line) {
                    Ok(msg) => {
                        if incoming_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(%err, "skipping malformed relay message"),
                }
            }
            debug!("relay reader finished");
        });

        Ok(Self {
            sender: RelaySender { writer },
            incoming,
        })
    }

    /// Send one message to the relay.
    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        self.sender.send(msg).await
    }

    /// Join a portfolio under the given identity.
    pub async fn join(&mut self, portfolio_id: &str, identity: &Identity) -> Result<()> {
        self.send(&ClientMessage::JoinPortfolio {
            portfolio_id: portfolio_id.to_string(),
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
        })
        .await
    }

    /// Receive the next event; `None` once the connection is closed.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.incoming.recv().await
    }

    /// Split into the send half and the inbound event stream, so a
    /// select loop can send from one arm while receiving in another.
    pub fn split(self) -> (RelaySender, mpsc::UnboundedReceiver<ServerMessage>) {
        (self.sender, self.incoming)
    }
}

/// Connect, join, and hand every received event to `on_event`, retrying
/// with a fixed backoff when the connection drops. Runs until `on_event`
/// returns `false`.
pub async fn run_with_reconnect<F>(
    addr: SocketAddr,
    portfolio_id: &str,
    identity: &Identity,
    backoff: Duration,
    mut on_event: F,
) -> Result<()>
where
    F: FnMut(ServerMessage) -> bool,
{
    loop {
        match RelayClient::connect(addr).await {
            Ok(mut client) => {
                if let Err(err) = client.join(portfolio_id, identity).await {
                    warn!(%err, "join failed, retrying");
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                while let Some(event) = client.recv().await {
                    if !on_event(event) {
                        return Ok(());
                    }
                }
                warn!("relay connection lost, reconnecting");
            }
            Err(err) => {
                warn!(%err, "relay connect failed, retrying");
            }
        }
        tokio::time::sleep(backoff).await;
    }
}
