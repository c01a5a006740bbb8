//! decomp edit command implementation
//!
//! Interactive headless editor for one field: joins the portfolio,
//! announces focus, reads successive values from stdin (one per line),
//! and broadcasts them as coalesced `field_change` events. EOF releases
//! the field, flushing any pending value before the blur.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::client::RelayClient;
use crate::error::{Error, Result};
use crate::identity;
use crate::presence::FieldEditor;
use crate::protocol::{FieldKey, ServerMessage};

/// Options for the edit command
pub struct EditOptions {
    pub config: Option<PathBuf>,
    pub portfolio_id: String,
    pub field_id: String,
    pub task_id: Option<String>,
    pub addr: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

pub fn run(options: EditOptions) -> Result<()> {
    let config = super::load_config(options.config.as_ref())?;
    let addr: SocketAddr =
        super::parse_relay_addr(&options.addr.unwrap_or_else(|| config.relay.bind.clone()))?;

    let who = identity::resolve_identity(
        &config,
        options.user_id.as_deref(),
        options.username.as_deref(),
    );

    let key = FieldKey::new(options.field_id.clone(), options.task_id.clone());
    let mut editor = FieldEditor::new(options.portfolio_id.clone(), key, &config.collab);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut client = RelayClient::connect(addr).await?;
        client.join(&options.portfolio_id, &who).await?;
        let (mut sender, mut events) = client.split();
        sender.send(&editor.focus()).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let deadline = editor.deadline();
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(value) => editor.edit(value, Instant::now()),
                    None => break,
                },
                _ = sleep_until(deadline), if deadline.is_some() => {
                    if let Some(msg) = editor.poll(Instant::now()) {
                        sender.send(&msg).await?;
                    }
                }
                event = events.recv() => match event {
                    Some(ServerMessage::FieldChanged {
                        field_id,
                        task_id,
                        value,
                        username,
                        ..
                    }) if editor.is_editing(&field_id, task_id.as_deref()) => {
                        // Someone else is typing into the same field; their
                        // value never clobbers the local draft while focused.
                        if !editor.apply_remote(&value) {
                            debug!(%username, "ignoring remote value for the focused field");
                        }
                    }
                    Some(_) => {}
                    None => return Err(Error::ChannelClosed),
                },
            }
        }

        for msg in editor.blur() {
            sender.send(&msg).await?;
        }
        Ok(())
    })
}

async fn sleep_until(deadline: Option<Instant>) {
    let deadline = deadline.unwrap_or_else(Instant::now);
    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
}
