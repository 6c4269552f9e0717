use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::MockConsensusHandle;
use crate::MockDialer;
use crate::MockRpcConn;
use crate::Dialer;
use crate::Result;
use crate::RpcConn;

/// Consensus view with a fixed role and leader pointer
pub fn mock_consensus(
    is_leader: bool,
    leader: Option<&str>,
) -> MockConsensusHandle {
    let leader = leader.map(str::to_string);
    let mut consensus = MockConsensusHandle::new();
    consensus.expect_is_leader().return_const(is_leader);
    consensus.expect_leader_address().returning(move || leader.clone());
    consensus
}

/// Dialer that must never be used
pub fn unused_dialer() -> MockDialer {
    let mut dialer = MockDialer::new();
    dialer.expect_dial().never();
    dialer
}

/// Dialer that hands out `conn` for `address` only
pub fn dialer_to(
    address: &'static str,
    conn: Arc<dyn RpcConn>,
) -> MockDialer {
    let mut dialer = MockDialer::new();
    dialer
        .expect_dial()
        .withf(move |a| a == address)
        .returning(move |_| Ok(conn.clone()));
    dialer
}

/// Connection whose `call` answers with `handler`
pub fn conn_with<F>(handler: F) -> Arc<dyn RpcConn>
where
    F: Fn(&str, Vec<u8>) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    let mut conn = MockRpcConn::new();
    conn.expect_call().returning(move |method, body| handler(method, body));
    Arc::new(conn)
}

/// Connection to a server that never answers
pub struct HangingConn;

#[async_trait]
impl RpcConn for HangingConn {
    async fn call(
        &self,
        _method: &str,
        _body: Vec<u8>,
    ) -> Result<Vec<u8>> {
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        Ok(Vec::new())
    }
}

/// Dialer whose connection attempts never complete
pub struct HangingDialer;

#[async_trait]
impl Dialer for HangingDialer {
    async fn dial(
        &self,
        _address: &str,
    ) -> Result<Arc<dyn RpcConn>> {
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        Ok(Arc::new(HangingConn))
    }
}
