use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::BlockingQuery;

/// Routing-relevant view of any inbound RPC argument
pub trait RpcRequest {
    /// Target datacenter; empty means the local one
    fn datacenter(&self) -> &str;

    /// Whether only the leader may execute the request
    fn requires_leader(&self) -> bool;

    /// Whether the request already took its one forwarding hop
    fn is_forwarded(&self) -> bool;

    fn mark_forwarded(&mut self);

    /// Longest time the executing server may hold the request
    fn max_wait(&self) -> Duration {
        Duration::ZERO
    }
}

/// Options carried by every read request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub datacenter: String,
    pub blocking: BlockingQuery,
    /// Read must be served by the leader
    pub require_consistent: bool,
    /// Set by the forwarder on the relayed copy
    pub forwarded: bool,
}

impl QueryOptions {
    pub fn blocking(
        min_query_index: crate::Index,
        max_query_time: Duration,
    ) -> Self {
        Self {
            blocking: BlockingQuery::new(min_query_index, max_query_time),
            ..Default::default()
        }
    }

    pub fn in_datacenter(
        mut self,
        datacenter: impl Into<String>,
    ) -> Self {
        self.datacenter = datacenter.into();
        self
    }

    pub fn consistent(mut self) -> Self {
        self.require_consistent = true;
        self
    }
}

/// Options carried by every write request. Writes always need the leader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub datacenter: String,
    pub forwarded: bool,
}

/// Implemented by request types that embed [`QueryOptions`].
pub trait HasQueryOptions {
    fn query_options(&self) -> &QueryOptions;
    fn query_options_mut(&mut self) -> &mut QueryOptions;
}

impl HasQueryOptions for QueryOptions {
    fn query_options(&self) -> &QueryOptions {
        self
    }

    fn query_options_mut(&mut self) -> &mut QueryOptions {
        self
    }
}

impl<T: HasQueryOptions> RpcRequest for T {
    fn datacenter(&self) -> &str {
        &self.query_options().datacenter
    }

    fn requires_leader(&self) -> bool {
        self.query_options().require_consistent
    }

    fn is_forwarded(&self) -> bool {
        self.query_options().forwarded
    }

    fn mark_forwarded(&mut self) {
        self.query_options_mut().forwarded = true;
    }

    fn max_wait(&self) -> Duration {
        let blocking = &self.query_options().blocking;
        if blocking.is_blocking() {
            blocking.max_query_time
        } else {
            Duration::ZERO
        }
    }
}

impl RpcRequest for WriteRequest {
    fn datacenter(&self) -> &str {
        &self.datacenter
    }

    fn requires_leader(&self) -> bool {
        true
    }

    fn is_forwarded(&self) -> bool {
        self.forwarded
    }

    fn mark_forwarded(&mut self) {
        self.forwarded = true;
    }
}
