use std::sync::Arc;

use d_registry::ClusterConfig;
use d_registry::Command;
use d_registry::ForwardConfig;
use d_registry::HealthCheck;
use d_registry::HealthStatus;
use d_registry::InProcessNetwork;
use d_registry::Index;
use d_registry::LeaderTracker;
use d_registry::LogEntry;
use d_registry::Node;
use d_registry::NodeService;
use d_registry::QueryConfig;
use d_registry::RegistryConfig;
use d_registry::Server;
use d_registry::StateStore;
use d_registry::StaticDatacenters;

/// Index of the last entry applied by [`seed`]
pub const SEEDED_INDEX: Index = 5;

/// Last index at which [`seed`] touched the checks table
pub const SEEDED_CHECKS_INDEX: Index = 4;

pub struct TestNode {
    pub server: Arc<Server>,
    pub store: Arc<StateStore>,
    pub consensus: Arc<LeaderTracker>,
    pub discovery: Arc<StaticDatacenters>,
    pub address: String,
}

pub fn config(
    node_name: &str,
    datacenter: &str,
    rpc_address: &str,
) -> RegistryConfig {
    RegistryConfig {
        cluster: ClusterConfig {
            node_name: node_name.to_string(),
            datacenter: datacenter.to_string(),
            rpc_address: rpc_address.to_string(),
            ..Default::default()
        },
        query: QueryConfig {
            max_query_time_in_ms: 5_000,
            min_query_time_in_ms: 1,
            jitter_fraction: 0,
        },
        forward: ForwardConfig::default(),
    }
}

/// Starts a server over `store` and makes it reachable on `network`.
pub fn start_node(
    network: &InProcessNetwork,
    name: &str,
    datacenter: &str,
    address: &str,
    store: Arc<StateStore>,
) -> TestNode {
    let consensus = Arc::new(LeaderTracker::new());
    let discovery = Arc::new(StaticDatacenters::default());
    let server = Arc::new(Server::new(
        config(name, datacenter, address),
        store.clone(),
        consensus.clone(),
        discovery.clone(),
        Arc::new(network.clone()),
    ));
    network.register(address, &server);

    TestNode {
        server,
        store,
        consensus,
        discovery,
        address: address.to_string(),
    }
}

pub fn node(name: &str) -> Node {
    Node {
        node: name.to_string(),
        address: format!("192.168.0.{}", name.len()),
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

/// Node `n1` running `api` (tag `v1`) with a passing node check and a
/// warning service check, at indexes 1 to [`SEEDED_INDEX`].
pub fn seed(store: &StateStore) {
    let commands = vec![
        Command::RegisterNode(node("n1")),
        Command::RegisterService {
            node: "n1".to_string(),
            service: NodeService {
                id: "api1".to_string(),
                service: "api".to_string(),
                tags: vec!["v1".to_string()],
                port: 9000,
            },
        },
        Command::RegisterCheck(check("n1", "serf", HealthStatus::Passing, "")),
        Command::RegisterCheck(check("n1", "api1-http", HealthStatus::Warning, "api1")),
        Command::RegisterNode(node("n2")),
    ];
    for (offset, command) in commands.into_iter().enumerate() {
        store
            .apply(&LogEntry::new(offset as Index + 1, command))
            .expect("seed entry should apply");
    }
}

pub fn seeded_store() -> Arc<StateStore> {
    let store = Arc::new(StateStore::new());
    seed(&store);
    store
}
