//! Command-line interface for decomp
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};

mod calc;
mod edit;
mod holidays;
mod serve;
mod summary;
mod watch;

/// decomp - Project decomposition planner
///
/// Computes project timelines with risk buffers from decomposed task
/// lists and relays live collaborative-editing events between users of
/// the same portfolio.
#[derive(Parser, Debug)]
#[command(name = "decomp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a `.decomp.toml` config file (defaults to the working directory)
    #[arg(long, global = true, env = "DECOMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Username attributed to collaborative edits
    #[arg(long, global = true, env = "DECOMP_USER")]
    pub username: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the schedule for a portfolio file
    Calc {
        /// Path to the portfolio JSON file
        portfolio: PathBuf,

        /// Override the portfolio's start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
    },

    /// Render the shareable Jira-style summary for a portfolio file
    Summary {
        /// Path to the portfolio JSON file
        portfolio: PathBuf,

        /// Override the portfolio's start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
    },

    /// Run the relay server for collaborative editing
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Join a portfolio and print relayed events as JSON lines
    Watch {
        /// Portfolio id to join
        portfolio_id: String,

        /// Relay address (overrides config)
        #[arg(long)]
        addr: Option<String>,

        /// User id attributed to this connection
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Edit one field collaboratively, reading values from stdin
    Edit {
        /// Portfolio id to join
        portfolio_id: String,

        /// Field to edit (e.g. "title", "description")
        field_id: String,

        /// Task the field belongs to; omit for portfolio-level fields
        #[arg(long)]
        task_id: Option<String>,

        /// Relay address (overrides config)
        #[arg(long)]
        addr: Option<String>,

        /// User id attributed to this connection
        #[arg(long)]
        user_id: Option<String>,
    },

    /// List the configured non-working dates
    Holidays,
}

impl Cli {
    /// Execute the parsed command.
    pub fn run(self) -> Result<()> {
        let output = crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Calc {
                ref portfolio,
                ref start_date,
            } => calc::run(calc::CalcOptions {
                config: self.config.clone(),
                portfolio: portfolio.clone(),
                start_date: start_date.clone(),
                output,
            }),
            Commands::Summary {
                ref portfolio,
                ref start_date,
            } => summary::run(summary::SummaryOptions {
                config: self.config.clone(),
                portfolio: portfolio.clone(),
                start_date: start_date.clone(),
            }),
            Commands::Serve { ref bind } => serve::run(serve::ServeOptions {
                config: self.config.clone(),
                bind: bind.clone(),
            }),
            Commands::Watch {
                ref portfolio_id,
                ref addr,
                ref user_id,
            } => watch::run(watch::WatchOptions {
                config: self.config.clone(),
                portfolio_id: portfolio_id.clone(),
                addr: addr.clone(),
                user_id: user_id.clone(),
                username: self.username.clone(),
            }),
            Commands::Edit {
                ref portfolio_id,
                ref field_id,
                ref task_id,
                ref addr,
                ref user_id,
            } => edit::run(edit::EditOptions {
                config: self.config.clone(),
                portfolio_id: portfolio_id.clone(),
                field_id: field_id.clone(),
                task_id: task_id.clone(),
                addr: addr.clone(),
                user_id: user_id.clone(),
                username: self.username.clone(),
            }),
            Commands::Holidays => holidays::run(holidays::HolidaysOptions {
                config: self.config.clone(),
                output,
            }),
        }
    }
}

/// Parse a relay address from config or a flag, with a usable message
/// when it is not a `host:port` pair.
pub(crate) fn parse_relay_addr(raw: &str) -> Result<SocketAddr> {
    raw.parse().map_err(|_| {
        Error::InvalidArgument(format!("invalid relay address '{raw}', expected host:port"))
    })
}

/// Load config from the explicit path or the working directory.
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<crate::config::Config> {
    match path {
        Some(path) => crate::config::Config::load_from_file(path),
        None => {
            let cwd = std::env::current_dir()?;
            crate::config::Config::load_from_dir(&cwd)
        }
    }
}
