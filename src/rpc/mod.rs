//! RPC seams: the request contract shared by every method, the wire codec,
//! and the transport traits a forwarded call travels through.
//!
//! Transports are external; anything that can move an opaque byte payload to
//! a named method on a remote server and bring the reply back can implement
//! [`RpcConn`].

mod codec;
mod request;

pub use codec::*;
pub use request::*;


use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// An established connection to one remote server
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RpcConn: Send + Sync + 'static {
    /// Invokes `method` with an encoded argument and returns the encoded reply.
    ///
    /// # Errors
    /// - Transport failures as `NetworkError`
    /// - Whatever the remote handler returned, unchanged
    async fn call(
        &self,
        method: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>>;
}

/// Opens connections to server addresses
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    async fn dial(
        &self,
        address: &str,
    ) -> Result<Arc<dyn RpcConn>>;
}
