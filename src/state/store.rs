use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::LogEntry;
use super::StateSnapshot;
use super::Table;
use super::TableWatch;
use super::WatchRegistry;
use crate::constants::*;
use crate::Index;
use crate::Result;
use crate::StorageError;

/// In-memory registry state fed by the consensus log.
///
/// # Concurrency
/// - Reads load the current `Arc<StateSnapshot>` without locking.
/// - `apply` is serialized by `apply_lock`; it publishes the new snapshot
///   before advancing table indexes, so a woken waiter always re-reads data
///   at least as new as the index that woke it.
#[derive(Debug)]
pub struct StateStore {
    current: ArcSwap<StateSnapshot>,
    registry: WatchRegistry,
    apply_lock: Mutex<()>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(StateSnapshot::default()),
            registry: WatchRegistry::new(),
            apply_lock: Mutex::new(()),
        }
    }

    /// Current immutable version of the state
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.current.load_full()
    }

    /// Global index of the last applied mutation
    pub fn index(&self) -> Index {
        self.current.load().index()
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// Registers interest in changes to `tables`.
    pub fn watch(
        &self,
        tables: &[Table],
    ) -> TableWatch {
        self.registry.subscribe(tables)
    }

    /// Tables a named query reads from, `None` for unknown query names.
    pub fn query_tables(name: &str) -> Option<&'static [Table]> {
        let tables: &'static [Table] = match name {
            QUERY_NODES => &[Table::Nodes],
            QUERY_NODE_SERVICES | QUERY_SERVICE_NODES => &[Table::Nodes, Table::Services],
            QUERY_CHECKS_IN_STATE | QUERY_NODE_CHECKS | QUERY_SERVICE_CHECKS => &[Table::Checks],
            QUERY_CHECK_SERVICE_NODES => &[Table::Nodes, Table::Services, Table::Checks],
            _ => return None,
        };
        Some(tables)
    }

    /// Applies a committed log entry.
    ///
    /// The entry index must be strictly above the current global index. On
    /// error the state is left untouched.
    pub fn apply(
        &self,
        entry: &LogEntry,
    ) -> Result<Index> {
        let _guard = self.apply_lock.lock();

        let current = self.current.load_full();
        if entry.index <= current.index() {
            warn!(index = entry.index, current = current.index(), "rejecting stale log entry");
            return Err(StorageError::StaleEntry {
                index: entry.index,
                current: current.index(),
            }
            .into());
        }

        let mut next = StateSnapshot::clone(&current);
        let touched = next.apply(entry.index, &entry.command)?;
        self.current.store(Arc::new(next));

        for table in touched {
            self.registry.advance(*table, entry.index)?;
        }

        debug!(index = entry.index, ?touched, "log entry applied");
        Ok(entry.index)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
