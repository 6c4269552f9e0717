use std::time::Duration;

use d_registry::ChecksInStateRequest;
use d_registry::Command;
use d_registry::Error;
use d_registry::HealthCheck;
use d_registry::HealthStatus;
use d_registry::InProcessNetwork;
use d_registry::LogEntry;
use d_registry::NodeSpecificRequest;
use d_registry::QueryOptions;
use d_registry::RoutingError;
use d_registry::ServiceSpecificRequest;
use d_registry::StateStore;
use tokio::time::Instant;

use crate::common::check;
use crate::common::seeded_store;
use crate::common::start_node;
use crate::common::SEEDED_CHECKS_INDEX;
use crate::common::SEEDED_INDEX;

const DC1_LEADER: &str = "10.0.1.1:8300";
const DC1_FOLLOWER: &str = "10.0.1.2:8300";
const DC2_LEADER: &str = "10.0.2.1:8300";

fn api_nodes(datacenter: &str) -> ServiceSpecificRequest {
    ServiceSpecificRequest {
        service_name: "api".to_string(),
        options: QueryOptions::default().in_datacenter(datacenter),
        ..Default::default()
    }
}

fn sorted_ids(checks: &[HealthCheck]) -> Vec<String> {
    let mut ids: Vec<String> = checks.iter().map(|c| c.check_id.clone()).collect();
    ids.sort();
    ids
}

/// # Case 1: A read for a remote datacenter returns exactly what that
/// datacenter would answer locally
///
/// ## Setup
/// - dc1 and dc2 each run one leader over identically seeded stores
/// - dc1 knows dc2's server through discovery
///
/// ## Validation criteria
/// - Reply through dc1 equals dc2's own local reply
/// - After a write lands in dc2 only, the relayed reply follows dc2
#[tokio::test]
async fn test_remote_datacenter_forwarding_is_transparent() {
    let network = InProcessNetwork::new();
    let dc1 = start_node(&network, "a1", "dc1", DC1_LEADER, seeded_store());
    let dc2 = start_node(&network, "b1", "dc2", DC2_LEADER, seeded_store());
    dc1.consensus.become_leader(DC1_LEADER);
    dc2.consensus.become_leader(DC2_LEADER);
    dc1.discovery.set_servers("dc2", vec![DC2_LEADER.to_string()]);

    let local = dc2.server.health().service_nodes(&api_nodes("")).await.unwrap();
    let relayed = dc1.server.health().service_nodes(&api_nodes("dc2")).await.unwrap();
    assert_eq!(relayed, local);
    assert_eq!(relayed.index, SEEDED_INDEX);

    dc2.store
        .apply(&LogEntry::new(
            SEEDED_INDEX + 1,
            Command::RegisterCheck(check("n1", "disk", HealthStatus::Critical, "")),
        ))
        .unwrap();

    let relayed = dc1.server.health().service_nodes(&api_nodes("dc2")).await.unwrap();
    assert_eq!(relayed.index, SEEDED_INDEX + 1);
    assert!(relayed.nodes[0].checks.iter().any(|c| c.check_id == "disk"));

    let own = dc1.server.health().service_nodes(&api_nodes("dc1")).await.unwrap();
    assert_eq!(own.index, SEEDED_INDEX);
}

/// # Case 2: A forwarded blocking read still long-polls at the remote side
///
/// ## Setup
/// - dc1 client blocks on dc2's checks at the seeded checks index, wait 2s
/// - dc2 applies a new check after 200ms
///
/// ## Validation criteria
/// - The relayed reply carries the new index after ~200ms
#[tokio::test(start_paused = true)]
async fn test_forwarded_blocking_read_wakes_on_remote_change() {
    let network = InProcessNetwork::new();
    let dc1 = start_node(&network, "a1", "dc1", DC1_LEADER, seeded_store());
    let dc2 = start_node(&network, "b1", "dc2", DC2_LEADER, seeded_store());
    dc1.consensus.become_leader(DC1_LEADER);
    dc2.consensus.become_leader(DC2_LEADER);
    dc1.discovery.set_servers("dc2", vec![DC2_LEADER.to_string()]);

    let remote_store = dc2.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        remote_store
            .apply(&LogEntry::new(
                SEEDED_INDEX + 1,
                Command::RegisterCheck(check("n1", "mem", HealthStatus::Warning, "")),
            ))
            .unwrap();
    });

    let start = Instant::now();
    let reply = dc1
        .server
        .health()
        .node_checks(&NodeSpecificRequest {
            node: "n1".to_string(),
            options: QueryOptions::blocking(SEEDED_CHECKS_INDEX, Duration::from_secs(2)).in_datacenter("dc2"),
        })
        .await
        .unwrap();

    assert_eq!(reply.index, SEEDED_INDEX + 1);
    assert_eq!(sorted_ids(&reply.health_checks), vec!["api1-http", "mem", "serf"]);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(400));
}

/// # Case 3: Consistent reads on a follower are answered by the leader
///
/// ## Setup
/// - Leader and follower of dc1 with separate stores; the follower lags
///   one entry behind
///
/// ## Validation criteria
/// - A consistent read via the follower sees the leader's newer entry
/// - A default read via the follower is served from its own store
#[tokio::test]
async fn test_consistent_read_on_follower_reaches_leader() {
    let network = InProcessNetwork::new();
    let leader = start_node(&network, "a1", "dc1", DC1_LEADER, seeded_store());
    let follower = start_node(&network, "a2", "dc1", DC1_FOLLOWER, seeded_store());
    leader.consensus.become_leader(DC1_LEADER);
    follower.consensus.follow(DC1_LEADER);

    leader
        .store
        .apply(&LogEntry::new(
            SEEDED_INDEX + 1,
            Command::RegisterCheck(check("n2", "serf", HealthStatus::Critical, "")),
        ))
        .unwrap();

    let consistent = ChecksInStateRequest {
        state: "critical".to_string(),
        options: QueryOptions::default().consistent(),
    };
    let reply = follower.server.health().checks_in_state(&consistent).await.unwrap();
    assert_eq!(reply.index, SEEDED_INDEX + 1);
    assert_eq!(reply.health_checks.len(), 1);
    assert!(follower.server.forwarder().pool().contains(DC1_LEADER));

    let stale = ChecksInStateRequest {
        state: "critical".to_string(),
        options: QueryOptions::default(),
    };
    let reply = follower.server.health().checks_in_state(&stale).await.unwrap();
    assert_eq!(reply.index, SEEDED_CHECKS_INDEX);
    assert!(reply.health_checks.is_empty());
}

/// # Case 4: Leader-only reads fail fast while no leader is known
#[tokio::test(start_paused = true)]
async fn test_no_leader_fails_fast() {
    let network = InProcessNetwork::new();
    let follower = start_node(&network, "a2", "dc1", DC1_FOLLOWER, seeded_store());

    let start = Instant::now();
    let result = follower
        .server
        .health()
        .checks_in_state(&ChecksInStateRequest {
            state: "any".to_string(),
            options: QueryOptions::blocking(SEEDED_CHECKS_INDEX, Duration::from_secs(5)).consistent(),
        })
        .await;

    assert!(result.unwrap_err().is_no_leader());
    assert!(start.elapsed() < Duration::from_millis(200));
}

/// # Case 5: Stale leader pointers cannot cause a forwarding loop
///
/// ## Setup
/// - Two followers that each believe the other one leads
///
/// ## Validation criteria
/// - One hop happens, the second node refuses with `NoLeader`
#[tokio::test]
async fn test_forwarding_is_at_most_one_hop() {
    let network = InProcessNetwork::new();
    let store = seeded_store();
    let a = start_node(&network, "a1", "dc1", DC1_LEADER, store.clone());
    let b = start_node(&network, "a2", "dc1", DC1_FOLLOWER, store);
    a.consensus.follow(DC1_FOLLOWER);
    b.consensus.follow(DC1_LEADER);

    let result = a
        .server
        .health()
        .node_checks(&NodeSpecificRequest {
            node: "n1".to_string(),
            options: QueryOptions::default().consistent(),
        })
        .await;

    assert!(result.unwrap_err().is_no_leader());
    assert!(a.server.forwarder().pool().contains(DC1_FOLLOWER));
    assert!(b.server.forwarder().pool().is_empty());
}

#[tokio::test]
async fn test_unknown_datacenter_has_no_path() {
    let network = InProcessNetwork::new();
    let dc1 = start_node(&network, "a1", "dc1", DC1_LEADER, seeded_store());
    dc1.consensus.become_leader(DC1_LEADER);

    let result = dc1.server.health().service_nodes(&api_nodes("dc7")).await;

    assert!(matches!(
        result,
        Err(Error::Routing(RoutingError::NoPathToDatacenter(ref dc))) if dc == "dc7"
    ));
}

/// # Case 6: A remote datacenter whose only server is gone surfaces a
/// transport failure
#[tokio::test]
async fn test_unreachable_datacenter_is_a_forward_failure() {
    let network = InProcessNetwork::new();
    let dc1 = start_node(&network, "a1", "dc1", DC1_LEADER, seeded_store());
    dc1.consensus.become_leader(DC1_LEADER);
    dc1.discovery.set_servers("dc2", vec![DC2_LEADER.to_string()]);

    let result = dc1.server.health().service_nodes(&api_nodes("dc2")).await;

    assert!(result.unwrap_err().is_forward_failure());
}

#[tokio::test]
async fn test_validation_happens_before_forwarding() {
    let network = InProcessNetwork::new();
    let dc1 = start_node(&network, "a1", "dc1", DC1_LEADER, std::sync::Arc::new(StateStore::new()));
    dc1.consensus.become_leader(DC1_LEADER);

    let mut request = api_nodes("dc7");
    request.service_name.clear();
    let result = dc1.server.health().service_nodes(&request).await;

    assert!(matches!(result, Err(Error::Query(_))));
}
