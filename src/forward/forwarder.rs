use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::route;
use super::ConnPool;
use super::DatacenterDiscovery;
use super::ForwardDecision;
use crate::decode;
use crate::encode;
use crate::metrics::RPC_FORWARDED;
use crate::ClusterConfig;
use crate::ConsensusHandle;
use crate::Dialer;
use crate::ForwardConfig;
use crate::NetworkError;
use crate::QueryConfig;
use crate::Result;
use crate::RoutingError;
use crate::RpcRequest;

/// Relays requests that must not run on this node.
///
/// Callers invoke [`Forwarder::forward`] first thing in every endpoint:
/// `Ok(None)` means "execute here", `Ok(Some(reply))` is the reply of the
/// node that executed it, returned to the client unchanged.
pub struct Forwarder {
    datacenter: String,
    own_address: String,
    consensus: Arc<dyn ConsensusHandle>,
    discovery: Arc<dyn DatacenterDiscovery>,
    pool: ConnPool,
    config: ForwardConfig,
    query: QueryConfig,
}

impl Forwarder {
    pub fn new(
        cluster: &ClusterConfig,
        config: ForwardConfig,
        query: QueryConfig,
        consensus: Arc<dyn ConsensusHandle>,
        discovery: Arc<dyn DatacenterDiscovery>,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        Self {
            datacenter: cluster.datacenter.clone(),
            own_address: cluster.rpc_address.clone(),
            consensus,
            discovery,
            pool: ConnPool::new(dialer),
            config,
            query,
        }
    }

    /// Routing decision for `request` on this node, right now.
    pub fn route<A: RpcRequest + ?Sized>(
        &self,
        request: &A,
    ) -> Result<ForwardDecision> {
        route(request, &self.datacenter, self.consensus.is_leader())
    }

    /// Relays `args` to the node that must execute it, if that is not us.
    ///
    /// # Errors
    /// - `RoutingError::NoLeader` when a leader-only request finds no leader
    ///   within `no_leader_wait`
    /// - `RoutingError::NoPathToDatacenter` when the target datacenter has no
    ///   known servers
    /// - `NetworkError` when the relayed call fails or exceeds its time bound
    /// - The remote handler's error, unchanged
    pub async fn forward<A, R>(
        &self,
        method: &str,
        args: &A,
    ) -> Result<Option<R>>
    where
        A: RpcRequest + Serialize + Clone + Send + Sync,
        R: DeserializeOwned + Send,
    {
        match self.route(args)? {
            ForwardDecision::ExecuteLocal => Ok(None),
            ForwardDecision::ForwardToLeader => {
                let Some(leader) = self.wait_for_leader().await? else {
                    trace!(method, "became leader while waiting, executing locally");
                    return Ok(None);
                };
                self.relay("leader", &leader, method, args).await.map(Some)
            }
            ForwardDecision::ForwardToDatacenter(datacenter) => {
                let server = self.pick_server(&datacenter)?;
                self.relay(&datacenter, &server, method, args).await.map(Some)
            }
        }
    }

    pub fn pool(&self) -> &ConnPool {
        &self.pool
    }

    /// Polls the consensus layer for a leader other than ourselves.
    ///
    /// Returns `None` if this node itself gained leadership.
    async fn wait_for_leader(&self) -> Result<Option<String>> {
        let deadline = Instant::now() + self.config.no_leader_wait();
        loop {
            if self.consensus.is_leader() {
                return Ok(None);
            }

            // A pointer at ourselves while not leading is stale
            if let Some(address) = self.consensus.leader_address() {
                if address != self.own_address {
                    return Ok(Some(address));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(datacenter = %self.datacenter, "no known leader, rejecting request");
                return Err(RoutingError::NoLeader.into());
            }

            let pause = self.config.leader_check_interval().min(deadline - now);
            tokio::time::sleep(pause).await;
        }
    }

    fn pick_server(
        &self,
        datacenter: &str,
    ) -> Result<String> {
        let servers = self.discovery.servers(datacenter);
        servers
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| RoutingError::NoPathToDatacenter(datacenter.to_string()).into())
    }

    /// Time bound of one relayed call: the transport timeout plus however
    /// long the remote side may legitimately hold a blocking read.
    pub fn relay_timeout(
        &self,
        max_wait: Duration,
    ) -> Duration {
        let wait = self.query.clamp_wait(max_wait);
        let jitter = match self.query.jitter_fraction {
            0 => Duration::ZERO,
            fraction => wait / fraction,
        };
        self.config.rpc_timeout() + wait + jitter
    }

    async fn relay<A, R>(
        &self,
        target: &str,
        address: &str,
        method: &str,
        args: &A,
    ) -> Result<R>
    where
        A: RpcRequest + Serialize + Clone + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let mut relayed = args.clone();
        relayed.mark_forwarded();
        let body = encode(&relayed)?;
        let timeout = self.relay_timeout(relayed.max_wait());

        RPC_FORWARDED.with_label_values(&[method, target]).inc();
        debug!(method, target, %address, ?timeout, "forwarding request");

        // The bound covers connection setup as well as the call itself
        let exchange = async {
            let conn = self.pool.get_conn(address).await?;
            conn.call(method, body).await
        };
        let reply = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                if e.is_forward_failure() {
                    warn!(method, %address, error = %e, "forwarded call failed");
                    self.pool.remove(address);
                }
                return Err(e);
            }
            Err(_) => {
                warn!(method, %address, ?timeout, "forwarded call timed out");
                self.pool.remove(address);
                return Err(NetworkError::Timeout {
                    address: address.to_string(),
                    duration: timeout,
                }
                .into());
            }
        };

        decode(&reply)
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("datacenter", &self.datacenter)
            .field("own_address", &self.own_address)
            .field("pool", &self.pool)
            .finish()
    }
}
