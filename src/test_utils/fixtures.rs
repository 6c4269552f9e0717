use std::collections::HashMap;
use std::sync::Arc;

use super::EntryBuilder;
use crate::ClusterConfig;
use crate::ForwardConfig;
use crate::HealthCheck;
use crate::HealthStatus;
use crate::InProcessNetwork;
use crate::LeaderTracker;
use crate::Node;
use crate::NodeService;
use crate::QueryConfig;
use crate::RegistryConfig;
use crate::Server;
use crate::StateStore;
use crate::StaticDatacenters;

pub fn node(name: &str) -> Node {
    Node {
        node: name.to_string(),
        address: format!("10.0.0.{}", name.len()),
    }
}

pub fn service(
    id: &str,
    name: &str,
    tags: &[&str],
) -> NodeService {
    NodeService {
        id: id.to_string(),
        service: name.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        port: 8000,
    }
}

pub fn check(
    node: &str,
    check_id: &str,
    status: HealthStatus,
    service_id: &str,
) -> HealthCheck {
    HealthCheck {
        node: node.to_string(),
        check_id: check_id.to_string(),
        name: check_id.to_string(),
        status,
        notes: String::new(),
        output: String::new(),
        service_id: service_id.to_string(),
        service_name: String::new(),
    }
}

/// Query bounds small enough for fast tests
pub fn fast_query_config() -> QueryConfig {
    QueryConfig {
        max_query_time_in_ms: 2_000,
        min_query_time_in_ms: 1,
        jitter_fraction: 0,
    }
}

/// Store holding two nodes with one "web" instance each:
///
/// | index | entry                                         |
/// |-------|-----------------------------------------------|
/// | 1     | node n1                                       |
/// | 2     | node n2                                       |
/// | 3     | web1 (tags: primary) on n1                    |
/// | 4     | web2 (tags: backup) on n2                     |
/// | 5     | node-level check "serf" passing on n1         |
/// | 6     | service check "web1-http" passing on n1       |
/// | 7     | service check "web2-http" critical on n2      |
///
/// The returned builder continues at index 8.
pub fn seeded_store() -> (Arc<StateStore>, EntryBuilder) {
    let store = Arc::new(StateStore::new());
    let mut entries = EntryBuilder::new(1);
    let seed = vec![
        entries.node(node("n1")),
        entries.node(node("n2")),
        entries.service("n1", service("web1", "web", &["primary"])),
        entries.service("n2", service("web2", "web", &["backup"])),
        entries.check(check("n1", "serf", HealthStatus::Passing, "")),
        entries.check(check("n1", "web1-http", HealthStatus::Passing, "web1")),
        entries.check(check("n2", "web2-http", HealthStatus::Critical, "web2")),
    ];
    for entry in &seed {
        store.apply(entry).expect("seed entry should apply");
    }
    (store, entries)
}

pub fn server_config(
    node_name: &str,
    datacenter: &str,
    rpc_address: &str,
) -> RegistryConfig {
    RegistryConfig {
        cluster: ClusterConfig {
            node_name: node_name.to_string(),
            datacenter: datacenter.to_string(),
            rpc_address: rpc_address.to_string(),
            remote_datacenters: HashMap::new(),
        },
        query: fast_query_config(),
        forward: ForwardConfig::default(),
    }
}

/// Single leader server of "dc1" over `store`, with no peers
pub fn local_server(store: Arc<StateStore>) -> Arc<Server> {
    let config = server_config("n1", "dc1", "10.0.0.1:8300");
    let consensus = Arc::new(LeaderTracker::new());
    consensus.become_leader(config.cluster.rpc_address.clone());
    let discovery = Arc::new(StaticDatacenters::default());
    Arc::new(Server::new(config, store, consensus, discovery, Arc::new(InProcessNetwork::new())))
}
