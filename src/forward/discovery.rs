use std::collections::HashMap;

use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;

/// Lookup of the servers reachable in each remote datacenter
#[cfg_attr(test, automock)]
pub trait DatacenterDiscovery: Send + Sync + 'static {
    /// RPC addresses of the servers in `datacenter`; empty when unknown
    fn servers(
        &self,
        datacenter: &str,
    ) -> Vec<String>;

    /// Every datacenter with at least one known server
    fn datacenters(&self) -> Vec<String>;
}

/// Discovery seeded from configuration and updated by membership events.
#[derive(Debug, Default)]
pub struct StaticDatacenters {
    servers: DashMap<String, Vec<String>>,
}

impl StaticDatacenters {
    pub fn new(remote_datacenters: &HashMap<String, Vec<String>>) -> Self {
        let servers = DashMap::new();
        for (dc, addrs) in remote_datacenters {
            servers.insert(dc.clone(), addrs.clone());
        }
        Self { servers }
    }

    /// Replaces the known servers of `datacenter`.
    pub fn set_servers(
        &self,
        datacenter: impl Into<String>,
        addresses: Vec<String>,
    ) {
        let datacenter = datacenter.into();
        if addresses.is_empty() {
            self.servers.remove(&datacenter);
            return;
        }
        self.servers.insert(datacenter, addresses);
    }

    pub fn remove(
        &self,
        datacenter: &str,
    ) {
        self.servers.remove(datacenter);
    }
}

impl DatacenterDiscovery for StaticDatacenters {
    fn servers(
        &self,
        datacenter: &str,
    ) -> Vec<String> {
        self.servers.get(datacenter).map(|e| e.value().clone()).unwrap_or_default()
    }

    fn datacenters(&self) -> Vec<String> {
        let mut names: Vec<String> = self.servers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
