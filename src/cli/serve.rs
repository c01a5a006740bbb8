//! decomp serve command implementation
//!
//! Runs the relay server until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::Result;
use crate::registry::Registry;
use crate::relay::RelayServer;

/// Options for the serve command
pub struct ServeOptions {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
}

pub fn run(options: ServeOptions) -> Result<()> {
    let config = super::load_config(options.config.as_ref())?;
    let bind = options.bind.unwrap_or(config.relay.bind);
    let addr: SocketAddr = super::parse_relay_addr(&bind)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let registry = Registry::new();
        let server = RelayServer::bind(addr, registry).await?;
        server.serve().await
    })
}
