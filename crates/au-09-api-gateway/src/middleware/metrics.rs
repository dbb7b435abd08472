//! Gateway counters.
//!
//! Plain atomics, readable as JSON at `/api/admin/metrics` and, with the
//! `metrics` feature, in Prometheus text format at
//! `/api/admin/metrics/prometheus`.

use axum::{body::Body, http::Request, http::StatusCode, response::Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tower::{Layer, Service};

/// API Gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    /// Any 4xx or 5xx answer
    pub requests_error: AtomicU64,
    /// 5xx answers only
    pub requests_server_error: AtomicU64,

    pub rate_limit_rejected: AtomicU64,

    /// Webhooks that verified and were reconciled (any outcome)
    pub webhooks_processed: AtomicU64,
    /// Webhooks refused for signature, payload or handling errors
    pub webhooks_rejected: AtomicU64,

    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request
    pub fn record_request(&self, status: StatusCode, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if status.is_client_error() || status.is_server_error() {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        }
        if status.is_server_error() {
            self.requests_server_error.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limit_rejection(&self) {
        self.rate_limit_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_webhook(&self, accepted: bool) {
        if accepted {
            self.webhooks_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.webhooks_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    fn counters(&self) -> [(&'static str, &'static str, u64); 7] {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        [
            ("requests_total", "Total HTTP requests", load(&self.requests_total)),
            (
                "requests_success_total",
                "Requests answered with 1xx-3xx",
                load(&self.requests_success),
            ),
            (
                "requests_error_total",
                "Requests answered with 4xx or 5xx",
                load(&self.requests_error),
            ),
            (
                "requests_server_error_total",
                "Requests answered with 5xx",
                load(&self.requests_server_error),
            ),
            (
                "rate_limit_rejected_total",
                "Requests refused by the rate limiter",
                load(&self.rate_limit_rejected),
            ),
            (
                "webhooks_processed_total",
                "Payment webhooks verified and reconciled",
                load(&self.webhooks_processed),
            ),
            (
                "webhooks_rejected_total",
                "Payment webhooks refused",
                load(&self.webhooks_rejected),
            ),
        ]
    }

    /// Export metrics in Prometheus text format
    #[cfg(feature = "metrics")]
    pub fn to_prometheus(&self) -> Result<String, prometheus::Error> {
        use prometheus::{Encoder, Gauge, IntCounter, Opts, Registry, TextEncoder};

        let registry = Registry::new_custom(Some("aurelia_gateway".to_string()), None)?;
        for (name, help, value) in self.counters() {
            let counter = IntCounter::with_opts(Opts::new(name, help))?;
            counter.inc_by(value);
            registry.register(Box::new(counter))?;
        }
        let latency = Gauge::with_opts(Opts::new(
            "average_latency_ms",
            "Average request latency in milliseconds",
        ))?;
        latency.set(self.average_latency_ms());
        registry.register(Box::new(latency))?;

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        serde_json::json!({
            "requests": {
                "total": load(&self.requests_total),
                "success": load(&self.requests_success),
                "error": load(&self.requests_error),
                "server_error": load(&self.requests_server_error),
            },
            "rate_limiting": {
                "rejected": load(&self.rate_limit_rejected),
            },
            "webhooks": {
                "processed": load(&self.webhooks_processed),
                "rejected": load(&self.webhooks_rejected),
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    pub fn finish(self, status: StatusCode) {
        let latency_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.metrics.record_request(status, latency_ms);
    }
}

/// Counts every request and its latency
#[derive(Clone)]
pub struct MetricsLayer {
    metrics: Arc<GatewayMetrics>,
}

impl MetricsLayer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Metrics service
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    metrics: Arc<GatewayMetrics>,
}

impl<S> Service<Request<Body>> for MetricsService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let timer = RequestTimer::new(Arc::clone(&self.metrics));
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let result = inner.call(req).await;
            let status = result
                .as_ref()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, |r| r.status());
            timer.finish(status);
            result
        })
    }
}
