//! Relay server.
//!
//! One tokio TCP listener; each accepted socket is a persistent duplex
//! channel carrying newline-delimited JSON messages. Per connection the
//! server runs a read loop (parse line, dispatch to the registry) and a
//! writer task (drain the member's outbound queue into the socket).
//! Inbound handling is therefore serialized per connection and concurrent
//! across connections.
//!
//! Single process, in-memory only. Scaling to multiple relay instances
//! would need a shared pub/sub backplane.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::protocol::ClientMessage;
use crate::registry::{ConnId, Registry};

/// Relay server bound to a local address.
pub struct RelayServer {
    listener: TcpListener,
    registry: Registry,
}

impl RelayServer {
    /// Bind the listener. The registry is injected so tests and callers
    /// control its lifecycle.
    pub async fn bind(addr: SocketAddr, registry: Registry) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "relay listening");
        Ok(Self { listener, registry })
    }

    /// Address the server actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until ctrl-c.
    pub async fn serve(self) -> Result<()> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (socket, peer) = accepted?;
                    let registry = self.registry.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, peer, registry).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down relay");
                    return Ok(());
                }
            }
        }
    }

    /// Accept connections forever, without signal handling. Used by tests
    /// that drop the task to stop the server.
    pub async fn serve_forever(self) -> Result<()> {
        loop {
            let (socket, peer) = self.listener.accept().await?;
            let registry = self.registry.clone();
            tokio::spawn(async move {
                handle_connection(socket, peer, registry).await;
            });
        }
    }
}

async fn handle_connection(socket: TcpStream, peer: SocketAddr, registry: Registry) {
    let conn: ConnId = Uuid::new_v4();
    debug!(%conn, %peer, "connection opened");

    let (reader, mut writer) = socket.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let line = match serde_json::to_string(&msg) {
                Ok(line) => line,
                Err(err) => {
                    warn!(%err, "failed to serialize outbound message");
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientMessage>(line) {
                    Ok(msg) => registry.handle(conn, &outbound_tx, msg),
                    // A malformed line never kills the connection.
                    Err(err) => warn!(%conn, %err, "skipping malformed message"),
                }
            }
            Ok(None) => break,
            Err(err) => {
                debug!(%conn, %err, "read error, closing connection");
                break;
            }
        }
    }

    registry.disconnect(conn);
    drop(outbound_tx);
    let _ = writer_task.await;
    debug!(%conn, %peer, "connection closed");
}
