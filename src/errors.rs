//! Registry Error Hierarchy
//!
//! Errors are grouped by the layer that raises them: request validation,
//! request routing, and infrastructure (network, storage, serialization).
//! Blocking and forwarding never rewrite an error produced by a query; they
//! only add their own failure modes around the success path.

use std::time::Duration;

use config::ConfigError;

use crate::Index;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request rejected before any store access
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Request could not be routed to a node able to serve it
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Infrastructure-level failures (network, storage, serialization)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unrecoverable failures, usually a programming error
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A required filter field is missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested filtering mode is not implemented by this query
    #[error("{0}")]
    Unsupported(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// Leader-required operation while no leader is known
    #[error("No cluster leader")]
    NoLeader,

    /// Target datacenter has no known servers
    #[error("No path to datacenter: {0}")]
    NoPathToDatacenter(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Remote call did not complete within its time bound
    #[error("RPC to {address} timed out after {duration:?}")]
    Timeout { address: String, duration: Duration },

    /// Connection could not be established
    #[error("Failed to connect to {address}: {reason}")]
    ConnectError { address: String, reason: String },

    /// Established connection failed mid-call
    #[error("Network unreachable: {address}")]
    Unreachable {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Log entry index does not advance the store
    #[error("Stale log entry: index {index} is not above current index {current}")]
    StaleEntry { index: Index, current: Index },

    /// A table index may only move forward
    #[error("Index regression on table {table}: {new} < {current}")]
    IndexRegression {
        table: &'static str,
        current: Index,
        new: Index,
    },

    /// Mutation references a node that is not registered
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Mutation references a service that is not registered on the node
    #[error("Unknown service {service_id} on node {node}")]
    UnknownService { node: String, service_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No endpoint is registered under this method name
    #[error("Unknown RPC method: {0}")]
    UnknownMethod(String),
}

// Serialization is classified separately (across protocol layers and system layers)
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("Bincode serialization failed: {0}")]
    Bincode(#[from] bincode::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    // Network layer
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    // Storage layer
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    //Serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    // Dispatch
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

impl Error {
    /// True when the failure means "retry later against the same cluster".
    pub fn is_no_leader(&self) -> bool {
        matches!(self, Error::Routing(RoutingError::NoLeader))
    }

    /// True for transport failures raised while relaying a request.
    pub fn is_forward_failure(&self) -> bool {
        matches!(self, Error::System(SystemError::Network(_)))
    }
}

// ============== Conversion Implementations ============== //
impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::System(SystemError::Network(e))
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::System(SystemError::Storage(e))
    }
}

impl From<SerializationError> for Error {
    fn from(e: SerializationError) -> Self {
        Error::System(SystemError::Serialization(e))
    }
}

impl From<RpcError> for Error {
    fn from(e: RpcError) -> Self {
        Error::System(SystemError::Rpc(e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        SerializationError::Bincode(e).into()
    }
}
