use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Server-enforced bounds for blocking queries
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QueryConfig {
    /// Upper bound applied to a client's requested wait
    #[serde(default = "default_max_query_time_in_ms")]
    pub max_query_time_in_ms: u64,

    /// Lower bound applied to a non-zero requested wait
    #[serde(default = "default_min_query_time_in_ms")]
    pub min_query_time_in_ms: u64,

    /// Adds up to `wait / jitter_fraction` of random extra wait so that
    /// many watchers of one table do not all time out together.
    /// 0 disables jitter.
    #[serde(default)]
    pub jitter_fraction: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_query_time_in_ms: default_max_query_time_in_ms(),
            min_query_time_in_ms: default_min_query_time_in_ms(),
            jitter_fraction: 0,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_query_time_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "max_query_time_in_ms must be greater than 0".into(),
            )));
        }

        if self.min_query_time_in_ms > self.max_query_time_in_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "min_query_time_in_ms ({}) exceeds max_query_time_in_ms ({})",
                self.min_query_time_in_ms, self.max_query_time_in_ms
            ))));
        }

        Ok(())
    }

    pub fn max_query_time(&self) -> Duration {
        Duration::from_millis(self.max_query_time_in_ms)
    }

    pub fn min_query_time(&self) -> Duration {
        Duration::from_millis(self.min_query_time_in_ms)
    }

    /// Clamps a requested wait into the server's bounds.
    ///
    /// Zero stays zero: a zero wait means "do not block". If the bounds are
    /// inverted (an unvalidated config), the maximum wins.
    pub fn clamp_wait(
        &self,
        requested: Duration,
    ) -> Duration {
        if requested.is_zero() {
            return requested;
        }
        requested.max(self.min_query_time()).min(self.max_query_time())
    }
}

fn default_max_query_time_in_ms() -> u64 {
    600_000
}
fn default_min_query_time_in_ms() -> u64 {
    10
}
