use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use tracing::trace;

use crate::Dialer;
use crate::Result;
use crate::RpcConn;

/// Thread-safe pool of connections to remote servers, keyed by address
#[derive(Clone)]
pub struct ConnPool {
    cache: Arc<DashMap<String, Arc<dyn RpcConn>>>,
    dialer: Arc<dyn Dialer>,
}

impl ConnPool {
    pub fn new(dialer: Arc<dyn Dialer>) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            dialer,
        }
    }

    /// Get a cached connection to `address` or dial a new one
    pub async fn get_conn(
        &self,
        address: &str,
    ) -> Result<Arc<dyn RpcConn>> {
        // Fast path: reuse the cached connection
        if let Some(entry) = self.cache.get(address) {
            return Ok(entry.value().clone());
        }

        // Slow path: dial and cache
        debug!(%address, "Establishing new RPC connection");
        let conn = self.dialer.dial(address).await?;

        trace!(%address, "Connection cached");
        self.cache.insert(address.to_string(), conn.clone());

        Ok(conn)
    }

    /// Drop the connection to `address` so the next call dials again
    pub fn remove(
        &self,
        address: &str,
    ) {
        if self.cache.remove(address).is_some() {
            debug!(%address, "Evicted RPC connection");
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(
        &self,
        address: &str,
    ) -> bool {
        self.cache.contains_key(address)
    }
}

impl std::fmt::Debug for ConnPool {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ConnPool").field("connections", &self.cache.len()).finish()
    }
}
