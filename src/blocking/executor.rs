use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use super::BlockingQuery;
use crate::metrics::BLOCKING_QUERY_TIMEOUTS;
use crate::metrics::BLOCKING_QUERY_TOTAL;
use crate::metrics::BLOCKING_QUERY_WAKEUPS;
use crate::Error;
use crate::Index;
use crate::QueryConfig;
use crate::Result;
use crate::StateStore;
use crate::Table;

/// Runs a query function with long-poll semantics.
///
/// Every read endpoint goes through [`BlockingExecutor::blocking_query`]; the
/// executor owns no state besides the server's query bounds and shutdown token.
#[derive(Debug, Clone)]
pub struct BlockingExecutor {
    config: QueryConfig,
    shutdown: CancellationToken,
}

impl BlockingExecutor {
    pub fn new(
        config: QueryConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self { config, shutdown }
    }

    /// Runs `run` until its index passes `opts.min_query_index` or the wait
    /// limit elapses.
    ///
    /// `run` writes its result into caller-owned state and returns the index
    /// it was computed at. The returned index is that of the last run.
    ///
    /// # Behavior
    /// - Non-blocking requests (`min_query_index == 0` or zero wait) run once.
    /// - Interest in `tables` is registered before each run, so a change
    ///   applied while the query executes still wakes the wait that follows.
    /// - Every wakeup re-runs the query and re-checks the index strictly; the
    ///   whole call is bounded by the clamped wait regardless of wakeups.
    /// - At the wait limit the query runs one final time and that result is
    ///   returned, changed or not. Reaching the limit is not an error.
    /// - Server shutdown returns the last result.
    ///
    /// # Errors
    /// Errors from `run` abort immediately and are returned untouched.
    /// A blocking request with no tables is a programming error (`Error::Fatal`).
    pub async fn blocking_query<F>(
        &self,
        opts: &BlockingQuery,
        tables: &[Table],
        store: &StateStore,
        mut run: F,
    ) -> Result<Index>
    where
        F: FnMut() -> Result<Index> + Send,
    {
        if !opts.is_blocking() {
            return run();
        }

        if tables.is_empty() {
            return Err(Error::Fatal("no tables to block on".to_string()));
        }

        let wait = self.effective_wait(opts.max_query_time);
        let deadline = Instant::now() + wait;
        BLOCKING_QUERY_TOTAL.inc();
        trace!(min_index = opts.min_query_index, ?wait, ?tables, "blocking query started");

        loop {
            let mut watch = store.watch(tables);

            let index = run()?;
            if index > opts.min_query_index {
                return Ok(index);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                BLOCKING_QUERY_TIMEOUTS.inc();
                return run();
            }

            tokio::select! {
                changed = watch.wait_for(index, remaining) => {
                    if changed {
                        BLOCKING_QUERY_WAKEUPS.inc();
                        trace!(index, "tables changed, re-running query");
                        continue;
                    }
                    debug!(index, ?wait, "blocking query reached wait limit");
                    BLOCKING_QUERY_TIMEOUTS.inc();
                    return run();
                }
                _ = self.shutdown.cancelled() => {
                    debug!(index, "server shutting down, releasing blocking query");
                    return Ok(index);
                }
            }
        }
    }

    /// Requested wait clamped into the server's bounds, plus optional jitter.
    pub fn effective_wait(
        &self,
        requested: Duration,
    ) -> Duration {
        let wait = self.config.clamp_wait(requested);
        if self.config.jitter_fraction == 0 || wait.is_zero() {
            return wait;
        }

        let spread = wait / self.config.jitter_fraction;
        if spread.is_zero() {
            return wait;
        }
        wait + rand::thread_rng().gen_range(Duration::ZERO..spread)
    }
}
