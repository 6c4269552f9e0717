use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::CheckServiceNode;
use super::types::CheckStateFilter;
use super::types::Command;
use super::types::HealthCheck;
use super::types::Node;
use super::types::NodeService;
use super::types::NodeServices;
use super::types::ServiceNode;
use super::Table;
use crate::Index;
use crate::Result;
use crate::StorageError;

type NodeKey = String;
/// (node, service id)
type ServiceKey = (String, String);
/// (node, check id)
type CheckKey = (String, String);

/// One immutable version of the replicated state.
///
/// Tables are individually reference counted so a mutation only copies the
/// tables it touches.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    index: Index,
    table_index: [Index; Table::COUNT],
    nodes: Arc<BTreeMap<NodeKey, Node>>,
    services: Arc<BTreeMap<ServiceKey, NodeService>>,
    checks: Arc<BTreeMap<CheckKey, HealthCheck>>,
}

impl StateSnapshot {
    /// Global index of the last mutation applied to this version
    pub fn index(&self) -> Index {
        self.index
    }

    pub fn table_index(
        &self,
        table: Table,
    ) -> Index {
        self.table_index[table.slot()]
    }

    fn max_index(
        &self,
        tables: &[Table],
    ) -> Index {
        tables.iter().map(|t| self.table_index(*t)).max().unwrap_or(0)
    }

    //---
    // Queries. Each returns the index the data was computed at: the highest
    // last-changed index among the tables it reads.

    pub fn nodes(&self) -> (Index, Vec<Node>) {
        let index = self.max_index(&[Table::Nodes]);
        (index, self.nodes.values().cloned().collect())
    }

    pub fn node_services(
        &self,
        node: &str,
    ) -> (Index, Option<NodeServices>) {
        let index = self.max_index(&[Table::Nodes, Table::Services]);
        let Some(found) = self.nodes.get(node) else {
            return (index, None);
        };
        let services = self.services_of(node).cloned().collect();
        (
            index,
            Some(NodeServices {
                node: found.clone(),
                services,
            }),
        )
    }

    pub fn service_nodes(
        &self,
        service: &str,
        tag: Option<&str>,
    ) -> (Index, Vec<ServiceNode>) {
        let index = self.max_index(&[Table::Nodes, Table::Services]);
        let nodes = self
            .instances_of(service, tag)
            .filter_map(|((node, _), svc)| {
                self.nodes.get(node).map(|n| ServiceNode {
                    node: n.clone(),
                    service: svc.clone(),
                })
            })
            .collect();
        (index, nodes)
    }

    pub fn checks_in_state(
        &self,
        filter: CheckStateFilter,
    ) -> (Index, Vec<HealthCheck>) {
        let index = self.max_index(&[Table::Checks]);
        let checks = self
            .checks
            .values()
            .filter(|c| filter.matches(c.status))
            .cloned()
            .collect();
        (index, checks)
    }

    pub fn node_checks(
        &self,
        node: &str,
    ) -> (Index, Vec<HealthCheck>) {
        let index = self.max_index(&[Table::Checks]);
        (index, self.checks_of(node).cloned().collect())
    }

    pub fn service_checks(
        &self,
        service: &str,
    ) -> (Index, Vec<HealthCheck>) {
        let index = self.max_index(&[Table::Checks]);
        let checks = self
            .checks
            .values()
            .filter(|c| c.service_name == service)
            .cloned()
            .collect();
        (index, checks)
    }

    pub fn check_service_nodes(
        &self,
        service: &str,
    ) -> (Index, Vec<CheckServiceNode>) {
        self.check_service_nodes_filtered(service, None)
    }

    pub fn check_service_tag_nodes(
        &self,
        service: &str,
        tag: &str,
    ) -> (Index, Vec<CheckServiceNode>) {
        self.check_service_nodes_filtered(service, Some(tag))
    }

    fn check_service_nodes_filtered(
        &self,
        service: &str,
        tag: Option<&str>,
    ) -> (Index, Vec<CheckServiceNode>) {
        let index = self.max_index(&[Table::Nodes, Table::Services, Table::Checks]);
        let nodes = self
            .instances_of(service, tag)
            .filter_map(|((node, service_id), svc)| {
                let found = self.nodes.get(node)?;
                // Node-level checks apply to every service on the node
                let checks = self
                    .checks_of(node)
                    .filter(|c| c.service_id.is_empty() || c.service_id == *service_id)
                    .cloned()
                    .collect();
                Some(CheckServiceNode {
                    node: found.clone(),
                    service: svc.clone(),
                    checks,
                })
            })
            .collect();
        (index, nodes)
    }

    fn services_of<'a>(
        &'a self,
        node: &'a str,
    ) -> impl Iterator<Item = &'a NodeService> + 'a {
        self.services
            .range((node.to_string(), String::new())..)
            .take_while(move |((n, _), _)| n == node)
            .map(|(_, svc)| svc)
    }

    fn checks_of<'a>(
        &'a self,
        node: &'a str,
    ) -> impl Iterator<Item = &'a HealthCheck> + 'a {
        self.checks
            .range((node.to_string(), String::new())..)
            .take_while(move |((n, _), _)| n == node)
            .map(|(_, check)| check)
    }

    fn instances_of<'a>(
        &'a self,
        service: &'a str,
        tag: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a ServiceKey, &'a NodeService)> + 'a {
        self.services.iter().filter(move |(_, svc)| {
            svc.service == service && tag.map_or(true, |t| svc.tags.iter().any(|x| x == t))
        })
    }

    //---
    // Mutation. Only `StateStore::apply` calls this, on a private clone.

    /// Applies `command` at `index`, returning the tables it changed.
    pub(super) fn apply(
        &mut self,
        index: Index,
        command: &Command,
    ) -> Result<&'static [Table]> {
        let touched: &'static [Table] = match command {
            Command::RegisterNode(node) => {
                Arc::make_mut(&mut self.nodes).insert(node.node.clone(), node.clone());
                &[Table::Nodes]
            }
            Command::RegisterService { node, service } => {
                self.require_node(node)?;
                Arc::make_mut(&mut self.services)
                    .insert((node.clone(), service.id.clone()), service.clone());
                &[Table::Services]
            }
            Command::RegisterCheck(check) => {
                self.require_node(&check.node)?;
                let mut check = check.clone();
                if !check.service_id.is_empty() {
                    let key = (check.node.clone(), check.service_id.clone());
                    let svc = self.services.get(&key).ok_or_else(|| StorageError::UnknownService {
                        node: check.node.clone(),
                        service_id: check.service_id.clone(),
                    })?;
                    check.service_name = svc.service.clone();
                }
                Arc::make_mut(&mut self.checks)
                    .insert((check.node.clone(), check.check_id.clone()), check);
                &[Table::Checks]
            }
            Command::DeregisterNode { node } => {
                Arc::make_mut(&mut self.nodes).remove(node);
                Arc::make_mut(&mut self.services).retain(|(n, _), _| n != node);
                Arc::make_mut(&mut self.checks).retain(|(n, _), _| n != node);
                &[Table::Nodes, Table::Services, Table::Checks]
            }
            Command::DeregisterService { node, service_id } => {
                Arc::make_mut(&mut self.services).remove(&(node.clone(), service_id.clone()));
                Arc::make_mut(&mut self.checks)
                    .retain(|(n, _), c| !(n == node && c.service_id == *service_id));
                &[Table::Services, Table::Checks]
            }
            Command::DeregisterCheck { node, check_id } => {
                Arc::make_mut(&mut self.checks).remove(&(node.clone(), check_id.clone()));
                &[Table::Checks]
            }
        };

        self.index = index;
        for table in touched {
            self.table_index[table.slot()] = index;
        }
        Ok(touched)
    }

    fn require_node(
        &self,
        node: &str,
    ) -> Result<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(StorageError::UnknownNode(node.to_string()).into())
        }
    }
}
