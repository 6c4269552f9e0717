use tracing::debug;

use super::ChecksInStateRequest;
use super::IndexedCheckServiceNodes;
use super::IndexedHealthChecks;
use super::NodeSpecificRequest;
use super::ServiceSpecificRequest;
use crate::constants::METHOD_HEALTH_CHECKS_IN_STATE;
use crate::constants::METHOD_HEALTH_NODE_CHECKS;
use crate::constants::METHOD_HEALTH_SERVICE_CHECKS;
use crate::constants::METHOD_HEALTH_SERVICE_NODES;
use crate::constants::QUERY_CHECKS_IN_STATE;
use crate::constants::QUERY_CHECK_SERVICE_NODES;
use crate::constants::QUERY_NODE_CHECKS;
use crate::constants::QUERY_SERVICE_CHECKS;
use crate::metrics::HEALTH_SERVICE_NOT_FOUND;
use crate::metrics::HEALTH_SERVICE_QUERY;
use crate::metrics::HEALTH_SERVICE_QUERY_TAG;
use crate::CheckStateFilter;
use crate::QueryError;
use crate::Result;
use crate::Server;

/// Health check queries
pub struct Health<'a> {
    srv: &'a Server,
}

impl<'a> Health<'a> {
    pub fn new(srv: &'a Server) -> Self {
        Self { srv }
    }

    /// All checks in the requested state
    pub async fn checks_in_state(
        &self,
        args: &ChecksInStateRequest,
    ) -> Result<IndexedHealthChecks> {
        let filter = CheckStateFilter::parse(&args.state)?;

        if let Some(reply) = self.srv.forward(METHOD_HEALTH_CHECKS_IN_STATE, args).await? {
            return Ok(reply);
        }

        let mut reply = IndexedHealthChecks::default();
        self.srv
            .blocking_rpc(&args.options, QUERY_CHECKS_IN_STATE, |state| {
                (reply.index, reply.health_checks) = state.checks_in_state(filter);
                Ok(reply.index)
            })
            .await?;
        Ok(reply)
    }

    /// All checks registered on one node
    pub async fn node_checks(
        &self,
        args: &NodeSpecificRequest,
    ) -> Result<IndexedHealthChecks> {
        if args.node.is_empty() {
            return Err(QueryError::InvalidArgument("Must provide node".to_string()).into());
        }

        if let Some(reply) = self.srv.forward(METHOD_HEALTH_NODE_CHECKS, args).await? {
            return Ok(reply);
        }

        let mut reply = IndexedHealthChecks::default();
        self.srv
            .blocking_rpc(&args.options, QUERY_NODE_CHECKS, |state| {
                (reply.index, reply.health_checks) = state.node_checks(&args.node);
                Ok(reply.index)
            })
            .await?;
        Ok(reply)
    }

    /// All checks bound to instances of one service
    pub async fn service_checks(
        &self,
        args: &ServiceSpecificRequest,
    ) -> Result<IndexedHealthChecks> {
        if args.tag_filter {
            return Err(QueryError::Unsupported("Tag filtering is not supported".to_string()).into());
        }

        if let Some(reply) = self.srv.forward(METHOD_HEALTH_SERVICE_CHECKS, args).await? {
            return Ok(reply);
        }

        let mut reply = IndexedHealthChecks::default();
        self.srv
            .blocking_rpc(&args.options, QUERY_SERVICE_CHECKS, |state| {
                (reply.index, reply.health_checks) = state.service_checks(&args.service_name);
                Ok(reply.index)
            })
            .await?;
        Ok(reply)
    }

    /// Instances of a service with their node and health checks
    pub async fn service_nodes(
        &self,
        args: &ServiceSpecificRequest,
    ) -> Result<IndexedCheckServiceNodes> {
        if args.service_name.is_empty() {
            return Err(QueryError::InvalidArgument("Must provide service name".to_string()).into());
        }

        if let Some(reply) = self.srv.forward(METHOD_HEALTH_SERVICE_NODES, args).await? {
            return Ok(reply);
        }

        let mut reply = IndexedCheckServiceNodes::default();
        self.srv
            .blocking_rpc(&args.options, QUERY_CHECK_SERVICE_NODES, |state| {
                (reply.index, reply.nodes) = if args.tag_filter {
                    state.check_service_tag_nodes(&args.service_name, &args.service_tag)
                } else {
                    state.check_service_nodes(&args.service_name)
                };
                Ok(reply.index)
            })
            .await?;

        HEALTH_SERVICE_QUERY.with_label_values(&[&args.service_name]).inc();
        if !args.service_tag.is_empty() {
            HEALTH_SERVICE_QUERY_TAG
                .with_label_values(&[&args.service_name, &args.service_tag])
                .inc();
        }
        if reply.nodes.is_empty() {
            debug!(service = %args.service_name, "no instances found");
            HEALTH_SERVICE_NOT_FOUND.with_label_values(&[&args.service_name]).inc();
        }

        Ok(reply)
    }
}
