//! decomp - Project Decomposition Planner Library
//!
//! This library provides the core functionality for the decomp CLI tool:
//! deterministic schedule/risk calculation for decomposed task lists and
//! a relay for real-time collaborative editing of the same portfolio.
//!
//! # Core Concepts
//!
//! - **Portfolios**: Named task collections with a start date, the unit
//!   of scheduling and of collaborative editing
//! - **Parallel groups**: Tasks sharing a label run concurrently; a group
//!   contributes its longest member to the critical path
//! - **Risk days**: A contingency buffer sized by a fixed bracket table
//! - **Relay**: Per-portfolio fan-out of edit and field-presence events
//! - **Field claims**: Transient "someone is editing" indicators derived
//!   client-side from the observed event stream
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.decomp.toml`
//! - `error`: Error types and result aliases
//! - `identity`: Collaborator identity resolution
//! - `task` / `portfolio`: Data model and portfolio file storage
//! - `calendar`: Working-day predicate with a configurable holiday table
//! - `schedule`: Pure scheduling calculator
//! - `summary`: Jira-style report renderer
//! - `protocol`: Wire messages for the relay channel
//! - `registry`: Portfolio membership and broadcast fan-out
//! - `relay` / `client`: Relay server and client over TCP JSON lines
//! - `presence`: Client-side field claims, debouncing, field binding

pub mod calendar;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod output;
pub mod portfolio;
pub mod presence;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod schedule;
pub mod summary;
pub mod task;

pub use error::{Error, Result};
