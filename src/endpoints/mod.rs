//! RPC endpoints.
//!
//! Each endpoint has the same shape: validate the arguments, let the
//! forwarder relay the request if it must run elsewhere, otherwise run the
//! store query under blocking-query semantics.

mod health;
mod structs;

pub use health::*;
pub use structs::*;
