//! Per-table change notification.
//!
//! Each table owns a `tokio::sync::watch` channel whose value is the index at
//! which the table last changed. Waiters compare that value against the index
//! they already observed, so an advance that lands between subscribing and
//! waiting is never lost: the first poll of the wait sees the new value.

use std::time::Duration;

use futures::future::select_all;
use tokio::sync::watch;
use tracing::trace;

use super::Table;
use crate::Index;
use crate::Result;
use crate::StorageError;

/// Tracks the last-changed index of every table and wakes waiters on change.
///
/// Owned by `StateStore`; only the store's apply path calls `advance`.
#[derive(Debug)]
pub struct WatchRegistry {
    channels: [watch::Sender<Index>; Table::COUNT],
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self {
            channels: Table::ALL.map(|_| watch::channel(0).0),
        }
    }

    /// Sets the table's last-changed index and broadcasts to all waiters.
    ///
    /// Advancing to the current index is a no-op; moving backwards is refused.
    pub fn advance(
        &self,
        table: Table,
        new_index: Index,
    ) -> Result<()> {
        let sender = &self.channels[table.slot()];
        let current = *sender.borrow();
        if new_index < current {
            return Err(StorageError::IndexRegression {
                table: table.name(),
                current,
                new: new_index,
            }
            .into());
        }

        // `send_if_modified` updates the value even when nobody is subscribed
        let notified = sender.send_if_modified(|value| {
            if new_index > *value {
                *value = new_index;
                true
            } else {
                false
            }
        });
        trace!(table = table.name(), new_index, notified, "table advanced");
        Ok(())
    }

    pub fn table_index(
        &self,
        table: Table,
    ) -> Index {
        *self.channels[table.slot()].borrow()
    }

    /// Highest last-changed index among `tables`, 0 when empty.
    pub fn max_index(
        &self,
        tables: &[Table],
    ) -> Index {
        tables.iter().map(|t| self.table_index(*t)).max().unwrap_or(0)
    }

    /// Registers interest in `tables`.
    ///
    /// Call before running the query whose result the caller intends to wait
    /// on, then pass the query's index to [`TableWatch::wait_for`].
    pub fn subscribe(
        &self,
        tables: &[Table],
    ) -> TableWatch {
        let receivers = tables
            .iter()
            .map(|t| self.channels[t.slot()].subscribe())
            .collect();
        TableWatch { receivers }
    }

    /// Number of live subscriptions on a table.
    pub fn waiter_count(
        &self,
        table: Table,
    ) -> usize {
        self.channels[table.slot()].receiver_count()
    }
}

impl Default for WatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered interest in a set of tables.
///
/// Dropping it unregisters the waiter.
#[derive(Debug)]
pub struct TableWatch {
    receivers: Vec<watch::Receiver<Index>>,
}

impl TableWatch {
    /// Waits until any watched table's index exceeds `since`, or `timeout`
    /// elapses. Returns whether a change was observed.
    pub async fn wait_for(
        &mut self,
        since: Index,
        timeout: Duration,
    ) -> bool {
        tokio::time::timeout(timeout, self.changed_since(since))
            .await
            .unwrap_or(false)
    }

    /// Waits without a time bound until any watched table's index exceeds `since`.
    pub async fn changed_since(
        &mut self,
        since: Index,
    ) -> bool {
        if self.receivers.is_empty() {
            return std::future::pending().await;
        }

        let waits = self
            .receivers
            .iter_mut()
            .map(|rx| Box::pin(rx.wait_for(move |index| *index > since)));
        let (result, _, remaining) = select_all(waits).await;
        drop(remaining);
        result.is_ok()
    }
}
