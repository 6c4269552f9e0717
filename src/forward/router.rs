use crate::RoutingError;
use crate::Result;
use crate::RpcRequest;

/// Where a request is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardDecision {
    ExecuteLocal,
    ForwardToLeader,
    ForwardToDatacenter(String),
}

/// Decides where `request` runs, given this node's datacenter and role.
///
/// A request that already took its forwarding hop is never forwarded again.
/// It gets the failure the next hop would have had to report instead.
pub fn route<R: RpcRequest + ?Sized>(
    request: &R,
    local_datacenter: &str,
    is_leader: bool,
) -> Result<ForwardDecision> {
    let datacenter = request.datacenter();
    if !datacenter.is_empty() && datacenter != local_datacenter {
        if request.is_forwarded() {
            return Err(RoutingError::NoPathToDatacenter(datacenter.to_string()).into());
        }
        return Ok(ForwardDecision::ForwardToDatacenter(datacenter.to_string()));
    }

    if request.requires_leader() && !is_leader {
        if request.is_forwarded() {
            return Err(RoutingError::NoLeader.into());
        }
        return Ok(ForwardDecision::ForwardToLeader);
    }

    Ok(ForwardDecision::ExecuteLocal)
}
