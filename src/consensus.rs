//! Facts supplied by the consensus layer.
//!
//! The replication protocol itself lives elsewhere; the registry only needs to
//! know whether this node leads and where the current leader can be reached.
//! Both are treated as possibly stale.

#[cfg(test)]
use mockall::automock;
use tokio::sync::watch;

/// Read-only view of the consensus layer's leadership state
#[cfg_attr(test, automock)]
pub trait ConsensusHandle: Send + Sync + 'static {
    /// Whether this node currently believes it is the leader
    fn is_leader(&self) -> bool;

    /// RPC address of the current leader, if one is known
    fn leader_address(&self) -> Option<String>;
}

/// Current leadership as last reported by the consensus layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderInfo {
    pub address: String,
    /// The leader is this node
    pub is_self: bool,
}

/// A [`ConsensusHandle`] fed by leader change notifications.
///
/// Holds an internal receiver so the channel stays valid even when nobody
/// has subscribed yet.
#[derive(Debug)]
pub struct LeaderTracker {
    tx: watch::Sender<Option<LeaderInfo>>,
    _rx: watch::Receiver<Option<LeaderInfo>>,
}

impl LeaderTracker {
    /// Creates a tracker with no leader known.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self { tx, _rx: rx }
    }

    /// Records the result of an election, or `None` when leadership is lost.
    pub fn set_leader(
        &self,
        leader: Option<LeaderInfo>,
    ) {
        self.tx.send_replace(leader);
    }

    /// Convenience for "this node won the election".
    pub fn become_leader(
        &self,
        own_address: impl Into<String>,
    ) {
        self.set_leader(Some(LeaderInfo {
            address: own_address.into(),
            is_self: true,
        }));
    }

    /// Convenience for "another node at `address` leads".
    pub fn follow(
        &self,
        address: impl Into<String>,
    ) {
        self.set_leader(Some(LeaderInfo {
            address: address.into(),
            is_self: false,
        }));
    }

    /// Subscribe to leader change notifications.
    pub fn subscribe(&self) -> watch::Receiver<Option<LeaderInfo>> {
        self.tx.subscribe()
    }
}

impl Default for LeaderTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusHandle for LeaderTracker {
    fn is_leader(&self) -> bool {
        self.tx.borrow().as_ref().is_some_and(|l| l.is_self)
    }

    fn leader_address(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|l| l.address.clone())
    }
}
