//! Blocking queries (long-poll reads).
//!
//! A client that already holds data at index `N` sends `min_query_index = N`
//! and a wait limit. The server answers as soon as the data it reads moves
//! past `N`, or with the unchanged data once the wait limit elapses.

mod executor;
pub use executor::*;


use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Index;

/// Client-supplied long-poll parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingQuery {
    /// Index the client already has; 0 means "return current data now"
    pub min_query_index: Index,
    /// Upper bound on how long the server may hold the request
    pub max_query_time: Duration,
}

impl BlockingQuery {
    pub fn new(
        min_query_index: Index,
        max_query_time: Duration,
    ) -> Self {
        Self {
            min_query_index,
            max_query_time,
        }
    }

    /// Whether the request asks the server to hold it at all
    pub fn is_blocking(&self) -> bool {
        self.min_query_index > 0 && !self.max_query_time.is_zero()
    }
}
