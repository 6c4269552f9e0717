//! Request routing.
//!
//! Every inbound request is routed once: executed here, relayed to the
//! leader of this datacenter, or relayed to a server of another datacenter.
//! A relayed request carries an explicit marker and is never relayed again.

mod conn_pool;
mod discovery;
mod forwarder;
mod router;

pub use conn_pool::*;
pub use discovery::*;
pub use forwarder::*;
pub use router::*;
