use std::sync::Arc;
use std::sync::Weak;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use tracing::trace;

use crate::Dialer;
use crate::NetworkError;
use crate::Result;
use crate::RpcConn;
use crate::Server;

/// Address book of servers living in this process.
///
/// Entries hold weak references so a registered server can be dropped
/// without deregistering; calls to it then fail as unreachable.
#[derive(Clone, Default)]
pub struct InProcessNetwork {
    servers: Arc<DashMap<String, Weak<Server>>>,
}

impl InProcessNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `server` reachable at `address`.
    pub fn register(
        &self,
        address: impl Into<String>,
        server: &Arc<Server>,
    ) {
        let address = address.into();
        debug!(%address, "in-process server registered");
        self.servers.insert(address, Arc::downgrade(server));
    }

    /// Makes `address` unreachable. Open connections fail on their next call.
    pub fn deregister(
        &self,
        address: &str,
    ) {
        if self.servers.remove(address).is_some() {
            debug!(%address, "in-process server deregistered");
        }
    }

    fn lookup(
        &self,
        address: &str,
    ) -> Option<Arc<Server>> {
        self.servers.get(address).and_then(|e| e.value().upgrade())
    }
}

impl std::fmt::Debug for InProcessNetwork {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("InProcessNetwork").field("servers", &self.servers.len()).finish()
    }
}

#[async_trait]
impl Dialer for InProcessNetwork {
    async fn dial(
        &self,
        address: &str,
    ) -> Result<Arc<dyn RpcConn>> {
        if self.lookup(address).is_none() {
            return Err(NetworkError::ConnectError {
                address: address.to_string(),
                reason: "no server registered at address".to_string(),
            }
            .into());
        }

        Ok(Arc::new(InProcessConn {
            address: address.to_string(),
            network: self.clone(),
        }))
    }
}

/// Connection to a server of an [`InProcessNetwork`]
pub struct InProcessConn {
    address: String,
    network: InProcessNetwork,
}

#[async_trait]
impl RpcConn for InProcessConn {
    async fn call(
        &self,
        method: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let Some(server) = self.network.lookup(&self.address) else {
            return Err(NetworkError::Unreachable {
                address: self.address.clone(),
                source: "server is gone".into(),
            }
            .into());
        };

        trace!(address = %self.address, method, "in-process call");
        server.handle_rpc(method, &body).await
    }
}
