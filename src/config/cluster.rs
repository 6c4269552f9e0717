use std::collections::HashMap;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Node identity and the datacenters it can reach
///
/// # Defaults
/// Field-level defaults use helper functions prefixed with `default_`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Unique node name inside its datacenter
    ///
    /// Default: `default_node_name()` ("node1")
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// Datacenter this node belongs to
    ///
    /// Default: `default_datacenter()` ("dc1")
    #[serde(default = "default_datacenter")]
    pub datacenter: String,

    /// Address other servers use to reach this node's RPC endpoint
    ///
    /// Default: `default_rpc_address()` (127.0.0.1:8300)
    #[serde(default = "default_rpc_address")]
    pub rpc_address: String,

    /// Known servers of remote datacenters, keyed by datacenter name
    ///
    /// Default: empty
    #[serde(default)]
    pub remote_datacenters: HashMap<String, Vec<String>>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            datacenter: default_datacenter(),
            rpc_address: default_rpc_address(),
            remote_datacenters: HashMap::new(),
        }
    }
}

impl ClusterConfig {
    /// Validates cluster configuration consistency
    /// # Errors
    /// Returns `Error::Config` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        if self.node_name.trim().is_empty() {
            return Err(invalid("node_name cannot be empty"));
        }

        if self.datacenter.trim().is_empty() {
            return Err(invalid("datacenter cannot be empty"));
        }

        if self.rpc_address.trim().is_empty() {
            return Err(invalid("rpc_address cannot be empty"));
        }

        if self.remote_datacenters.contains_key(&self.datacenter) {
            return Err(Error::Config(ConfigError::Message(format!(
                "remote_datacenters must not contain the local datacenter {}",
                self.datacenter
            ))));
        }

        for (dc, servers) in &self.remote_datacenters {
            if servers.is_empty() {
                return Err(Error::Config(ConfigError::Message(format!(
                    "remote datacenter {dc} has no servers"
                ))));
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::Config(ConfigError::Message(msg.to_string()))
}

fn default_node_name() -> String {
    "node1".to_string()
}
fn default_datacenter() -> String {
    "dc1".to_string()
}
fn default_rpc_address() -> String {
    "127.0.0.1:8300".to_string()
}
