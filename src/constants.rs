// -
// Query names understood by `StateStore::query_tables`

pub const QUERY_NODES: &str = "Nodes";
pub const QUERY_NODE_SERVICES: &str = "NodeServices";
pub const QUERY_SERVICE_NODES: &str = "ServiceNodes";
pub const QUERY_CHECKS_IN_STATE: &str = "ChecksInState";
pub const QUERY_NODE_CHECKS: &str = "NodeChecks";
pub const QUERY_SERVICE_CHECKS: &str = "ServiceChecks";
pub const QUERY_CHECK_SERVICE_NODES: &str = "CheckServiceNodes";

// -
// RPC method names

pub const METHOD_HEALTH_CHECKS_IN_STATE: &str = "Health.ChecksInState";
pub const METHOD_HEALTH_NODE_CHECKS: &str = "Health.NodeChecks";
pub const METHOD_HEALTH_SERVICE_CHECKS: &str = "Health.ServiceChecks";
pub const METHOD_HEALTH_SERVICE_NODES: &str = "Health.ServiceNodes";

/// Pseudo-state matching every health check
pub const HEALTH_ANY: &str = "any";
