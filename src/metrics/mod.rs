//! Fire-and-forget instrumentation. Nothing here affects request behavior.


use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use tracing::warn;

lazy_static! {
    pub static ref BLOCKING_QUERY_TOTAL: IntCounter =
        IntCounter::new("blocking_query_total", "Blocking queries that entered the wait loop")
            .expect("metric can not be created");

    pub static ref BLOCKING_QUERY_WAKEUPS: IntCounter =
        IntCounter::new("blocking_query_wakeups", "Table change wakeups observed by blocking queries")
            .expect("metric can not be created");

    pub static ref BLOCKING_QUERY_TIMEOUTS: IntCounter =
        IntCounter::new("blocking_query_timeouts", "Blocking queries that reached their wait limit")
            .expect("metric can not be created");

    pub static ref RPC_FORWARDED: IntCounterVec = IntCounterVec::new(
        Opts::new("rpc_forwarded", "Requests relayed to another server"),
        &["method", "target"]
    )
    .expect("metric can not be created");

    pub static ref HEALTH_SERVICE_QUERY: IntCounterVec = IntCounterVec::new(
        Opts::new("health_service_query", "Service health queries"),
        &["service"]
    )
    .expect("metric can not be created");

    pub static ref HEALTH_SERVICE_QUERY_TAG: IntCounterVec = IntCounterVec::new(
        Opts::new("health_service_query_tag", "Service health queries filtered by tag"),
        &["service", "tag"]
    )
    .expect("metric can not be created");

    pub static ref HEALTH_SERVICE_NOT_FOUND: IntCounterVec = IntCounterVec::new(
        Opts::new("health_service_not_found", "Service health queries with no instances"),
        &["service"]
    )
    .expect("metric can not be created");

    /// Crate registry holding every collector of this crate
    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_custom_metrics(&registry);
        registry
    };
}

/// Registers every collector of this crate into `registry`.
///
/// Re-registering the same collector is reported and skipped.
pub fn register_custom_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BLOCKING_QUERY_TOTAL.clone()),
        Box::new(BLOCKING_QUERY_WAKEUPS.clone()),
        Box::new(BLOCKING_QUERY_TIMEOUTS.clone()),
        Box::new(RPC_FORWARDED.clone()),
        Box::new(HEALTH_SERVICE_QUERY.clone()),
        Box::new(HEALTH_SERVICE_QUERY_TAG.clone()),
        Box::new(HEALTH_SERVICE_NOT_FOUND.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            warn!("collector can not be registered: {}", e);
        }
    }
}

/// Prometheus text exposition of `registry`
pub fn gather_metrics(registry: &Registry) -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        warn!("could not encode custom metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Prometheus text exposition of the crate [`REGISTRY`], for the host's
/// metrics endpoint
pub fn gather() -> String {
    gather_metrics(&REGISTRY)
}
