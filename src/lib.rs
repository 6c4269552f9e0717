//! Service-health registry core.
//!
//! Long-poll reads over a replicated in-memory store, routed to the right
//! leader or datacenter before they run.
//!
//! - [`StateStore`] holds the replicated state and advances per-table
//!   indexes through its [`WatchRegistry`].
//! - [`BlockingExecutor`] turns a snapshot query into a blocking query.
//! - [`Forwarder`] relays requests that must run on another node.
//! - [`Server`] wires them together; [`Health`] is its read surface.

mod blocking;
mod config;
mod consensus;
mod endpoints;
mod errors;
mod forward;
mod network;
mod rpc;
mod server;
mod state;

pub mod constants;
pub mod metrics;

pub use blocking::*;
pub use config::*;
pub use consensus::*;
pub use endpoints::*;
pub use errors::*;
pub use forward::*;
pub use network::*;
pub use rpc::*;
pub use server::*;
pub use state::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
