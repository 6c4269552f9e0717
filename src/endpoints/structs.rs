use serde::Deserialize;
use serde::Serialize;

use crate::CheckServiceNode;
use crate::HasQueryOptions;
use crate::HealthCheck;
use crate::Index;
use crate::QueryOptions;

/// Checks in one state, or in any state with `"any"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksInStateRequest {
    pub state: String,
    pub options: QueryOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpecificRequest {
    pub node: String,
    pub options: QueryOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpecificRequest {
    pub service_name: String,
    pub service_tag: String,
    /// Restrict results to instances carrying `service_tag`
    pub tag_filter: bool,
    pub options: QueryOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedHealthChecks {
    pub index: Index,
    pub health_checks: Vec<HealthCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCheckServiceNodes {
    pub index: Index,
    pub nodes: Vec<CheckServiceNode>,
}

macro_rules! impl_has_query_options {
    ($($ty:ty),+) => {
        $(
            impl HasQueryOptions for $ty {
                fn query_options(&self) -> &QueryOptions {
                    &self.options
                }

                fn query_options_mut(&mut self) -> &mut QueryOptions {
                    &mut self.options
                }
            }
        )+
    };
}

impl_has_query_options!(ChecksInStateRequest, NodeSpecificRequest, ServiceSpecificRequest);
