//! Replicated state
//!
//! An in-memory store fed by the consensus log. Readers work against an
//! immutable [`StateSnapshot`]; the single apply path swaps in a new version
//! and then advances the per-table indexes in the [`WatchRegistry`].

mod snapshot;
mod store;
mod types;
mod watch_registry;

pub use snapshot::*;
pub use store::*;
pub use types::*;
pub use watch_registry::*;


use serde::Deserialize;
use serde::Serialize;

/// Monotonic version of the replicated state
pub type Index = u64;

/// Logical partition of the state with its own change notification scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Nodes,
    Services,
    Checks,
}

impl Table {
    pub const COUNT: usize = 3;
    pub const ALL: [Table; Table::COUNT] = [Table::Nodes, Table::Services, Table::Checks];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Nodes => "nodes",
            Table::Services => "services",
            Table::Checks => "checks",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Table::Nodes => 0,
            Table::Services => 1,
            Table::Checks => 2,
        }
    }
}
