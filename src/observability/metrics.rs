use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token provider metrics
    pub token_fetch_requests: IntCounter,
    pub token_fetch_failures: IntCounterVec,
    pub token_fetch_duration: HistogramVec,
    pub token_fetched_at_unix: IntGauge,

    // Action client metrics
    pub action_calls: IntCounterVec,
    pub action_reauthentications: IntCounter,
    pub action_duration: HistogramVec,

    // Gateway metrics
    pub gateway_rejections: IntCounterVec,

    // Config/runtime
    pub config_parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("serialbridge".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token provider
            token_fetch_requests: IntCounter::new("token_fetch_requests_total", "Total token endpoint requests").unwrap(),
            token_fetch_failures: IntCounterVec::new(Opts::new("token_fetch_failures_total", "Token fetch failures by reason"),&["reason"],).unwrap(),
            token_fetch_duration: HistogramVec::new(HistogramOpts::new("token_fetch_duration_seconds", "Token fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["result"],).unwrap(),
            token_fetched_at_unix: IntGauge::new("token_fetched_at_unix_seconds", "Fetch timestamp of the cached token").unwrap(),

            // Action client
            action_calls: IntCounterVec::new(Opts::new("action_calls_total", "Action invocations by outcome"),&["outcome"],).unwrap(),
            action_reauthentications: IntCounter::new("action_reauthentications_total", "Re-authentications triggered by a 401").unwrap(),
            action_duration: HistogramVec::new(HistogramOpts::new("action_duration_seconds", "Action invocation duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["outcome"],).unwrap(),

            // Gateway
            gateway_rejections: IntCounterVec::new(Opts::new("gateway_rejections_total", "Inbound requests rejected before invoking the action"),&["reason"],).unwrap(),

            // Config/runtime
            config_parse_failures: IntCounter::new("config_parse_failures_total", "YAML parse failures").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetched_at_unix.clone())).unwrap();
        reg.register(Box::new(metrics.action_calls.clone())).unwrap();
        reg.register(Box::new(metrics.action_reauthentications.clone())).unwrap();
        reg.register(Box::new(metrics.action_duration.clone())).unwrap();
        reg.register(Box::new(metrics.gateway_rejections.clone())).unwrap();
        reg.register(Box::new(metrics.config_parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
