use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::HEALTH_ANY;
use crate::Index;
use crate::QueryError;

/// A registered cluster member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub node: String,
    pub address: String,
}

/// A service instance running on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeService {
    pub id: String,
    pub service: String,
    pub tags: Vec<String>,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Passing,
    Warning,
    Critical,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Passing => "passing",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passing" => Ok(HealthStatus::Passing),
            "warning" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            "unknown" => Ok(HealthStatus::Unknown),
            other => Err(QueryError::InvalidArgument(format!(
                "unknown health state {other:?}"
            ))),
        }
    }
}

/// Filter used by the checks-in-state query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStateFilter {
    Any,
    Only(HealthStatus),
}

impl CheckStateFilter {
    pub fn parse(state: &str) -> Result<Self, QueryError> {
        if state == HEALTH_ANY {
            return Ok(CheckStateFilter::Any);
        }
        state.parse().map(CheckStateFilter::Only)
    }

    pub fn matches(
        &self,
        status: HealthStatus,
    ) -> bool {
        match self {
            CheckStateFilter::Any => true,
            CheckStateFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// A health check, either node-level (empty `service_id`) or bound to a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub node: String,
    pub check_id: String,
    pub name: String,
    pub status: HealthStatus,
    pub notes: String,
    pub output: String,
    pub service_id: String,
    pub service_name: String,
}

/// A service instance joined with its node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub node: Node,
    pub service: NodeService,
}

/// A service instance joined with its node and all checks that apply to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckServiceNode {
    pub node: Node,
    pub service: NodeService,
    pub checks: Vec<HealthCheck>,
}

/// Every service registered on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeServices {
    pub node: Node,
    pub services: Vec<NodeService>,
}

/// State mutation carried by a committed log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    RegisterNode(Node),
    RegisterService { node: String, service: NodeService },
    RegisterCheck(HealthCheck),
    DeregisterNode { node: String },
    DeregisterService { node: String, service_id: String },
    DeregisterCheck { node: String, check_id: String },
}

/// A committed log entry as handed to the store by the consensus layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub index: Index,
    pub command: Command,
}

impl LogEntry {
    pub fn new(
        index: Index,
        command: Command,
    ) -> Self {
        Self { index, command }
    }
}
