use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// RPC forwarding parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForwardConfig {
    /// Time bound of a relayed call, on top of the request's own blocking wait
    #[serde(default = "default_rpc_timeout_in_ms")]
    pub rpc_timeout_in_ms: u64,

    /// How long a leader-required request waits for a leader to appear
    /// before failing with `NoLeader`
    #[serde(default = "default_no_leader_wait_in_ms")]
    pub no_leader_wait_in_ms: u64,

    /// Poll interval while waiting for a leader
    #[serde(default = "default_leader_check_interval_in_ms")]
    pub leader_check_interval_in_ms: u64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_in_ms: default_rpc_timeout_in_ms(),
            no_leader_wait_in_ms: default_no_leader_wait_in_ms(),
            leader_check_interval_in_ms: default_leader_check_interval_in_ms(),
        }
    }
}

impl ForwardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rpc_timeout_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "rpc_timeout_in_ms must be greater than 0".into(),
            )));
        }

        if self.leader_check_interval_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "leader_check_interval_in_ms must be greater than 0".into(),
            )));
        }

        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_in_ms)
    }

    pub fn no_leader_wait(&self) -> Duration {
        Duration::from_millis(self.no_leader_wait_in_ms)
    }

    pub fn leader_check_interval(&self) -> Duration {
        Duration::from_millis(self.leader_check_interval_in_ms)
    }
}

fn default_rpc_timeout_in_ms() -> u64 {
    5_000
}
fn default_no_leader_wait_in_ms() -> u64 {
    100
}
fn default_leader_check_interval_in_ms() -> u64 {
    10
}
