//! Registry server: wires the replicated store, the blocking query executor
//! and the forwarder together and dispatches inbound RPCs to endpoints.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::constants::METHOD_HEALTH_CHECKS_IN_STATE;
use crate::constants::METHOD_HEALTH_NODE_CHECKS;
use crate::constants::METHOD_HEALTH_SERVICE_CHECKS;
use crate::constants::METHOD_HEALTH_SERVICE_NODES;
use crate::decode;
use crate::encode;
use crate::BlockingExecutor;
use crate::ConsensusHandle;
use crate::DatacenterDiscovery;
use crate::Dialer;
use crate::Error;
use crate::Forwarder;
use crate::Health;
use crate::Index;
use crate::QueryOptions;
use crate::RegistryConfig;
use crate::Result;
use crate::RpcError;
use crate::RpcRequest;
use crate::StateSnapshot;
use crate::StateStore;

pub struct Server {
    config: RegistryConfig,
    store: Arc<StateStore>,
    executor: BlockingExecutor,
    forwarder: Forwarder,
    shutdown: CancellationToken,
}

impl Server {
    pub fn new(
        config: RegistryConfig,
        store: Arc<StateStore>,
        consensus: Arc<dyn ConsensusHandle>,
        discovery: Arc<dyn DatacenterDiscovery>,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let executor = BlockingExecutor::new(config.query.clone(), shutdown.clone());
        let forwarder = Forwarder::new(
            &config.cluster,
            config.forward.clone(),
            config.query.clone(),
            consensus,
            discovery,
            dialer,
        );

        info!(
            node = %config.cluster.node_name,
            datacenter = %config.cluster.datacenter,
            address = %config.cluster.rpc_address,
            "registry server created"
        );

        Self {
            config,
            store,
            executor,
            forwarder,
            shutdown,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    pub fn health(&self) -> Health<'_> {
        Health::new(self)
    }

    /// Releases every in-flight blocking query with its last result.
    pub fn shutdown(&self) {
        info!(node = %self.config.cluster.node_name, "registry server shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Relays `args` if it must run elsewhere; `None` means run it here.
    pub async fn forward<A, R>(
        &self,
        method: &str,
        args: &A,
    ) -> Result<Option<R>>
    where
        A: RpcRequest + Serialize + Clone + Send + Sync,
        R: DeserializeOwned + Send,
    {
        self.forwarder.forward(method, args).await
    }

    /// Runs `run` against fresh snapshots with the long-poll semantics of
    /// `opts`, waking on the tables read by `query_name`.
    ///
    /// # Errors
    /// An unknown `query_name` is a programming error (`Error::Fatal`).
    pub async fn blocking_rpc<F>(
        &self,
        opts: &QueryOptions,
        query_name: &str,
        mut run: F,
    ) -> Result<Index>
    where
        F: FnMut(&StateSnapshot) -> Result<Index> + Send,
    {
        let tables = StateStore::query_tables(query_name)
            .ok_or_else(|| Error::Fatal(format!("unknown query: {query_name}")))?;

        let store = &self.store;
        self.executor
            .blocking_query(&opts.blocking, tables, store, || run(&store.snapshot()))
            .await
    }

    /// Inbound dispatch for any transport: decodes the argument, runs the
    /// endpoint and encodes its reply.
    pub async fn handle_rpc(
        &self,
        method: &str,
        body: &[u8],
    ) -> Result<Vec<u8>> {
        debug!(method, "handling rpc");
        match method {
            METHOD_HEALTH_CHECKS_IN_STATE => encode(&self.health().checks_in_state(&decode(body)?).await?),
            METHOD_HEALTH_NODE_CHECKS => encode(&self.health().node_checks(&decode(body)?).await?),
            METHOD_HEALTH_SERVICE_CHECKS => encode(&self.health().service_checks(&decode(body)?).await?),
            METHOD_HEALTH_SERVICE_NODES => encode(&self.health().service_nodes(&decode(body)?).await?),
            _ => Err(RpcError::UnknownMethod(method.to_string()).into()),
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("node", &self.config.cluster.node_name)
            .field("datacenter", &self.config.cluster.datacenter)
            .field("index", &self.store.index())
            .finish()
    }
}
