//! Transport implementations for the [`Dialer`](crate::Dialer) and
//! [`RpcConn`](crate::RpcConn) seams.
//!
//! Only an in-process transport ships with the crate. Socket transports plug
//! in by implementing the same two traits and calling
//! [`Server::handle_rpc`](crate::Server::handle_rpc) on the receiving side.

mod in_process;

pub use in_process::*;
