//! Per-IP rate limiting with governor token buckets.
//!
//! Safe methods and mutating methods draw from separate buckets, so a
//! browsing visitor cannot starve their own checkout. Processor webhooks are
//! exempt: they come from a handful of processor IPs and are retried anyway.

use crate::domain::config::RateLimitConfig;
use crate::domain::error::ApiError;
use crate::middleware::metrics::GatewayMetrics;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Paths never rate limited.
const EXEMPT_PREFIXES: &[&str] = &["/api/webhooks/", "/health"];

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Token buckets for one IP address
struct TokenBucket {
    read_limiter: DirectLimiter,
    write_limiter: DirectLimiter,
    /// Last access time (for cleanup)
    last_access: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let read_quota = Quota::per_second(non_zero(config.requests_per_second))
            .allow_burst(non_zero(config.burst_size));
        let write_quota = Quota::per_second(non_zero(config.writes_per_second))
            .allow_burst(non_zero((config.burst_size / 10).max(config.writes_per_second)));

        Self {
            read_limiter: RateLimiter::direct(read_quota),
            write_limiter: RateLimiter::direct(write_quota),
            last_access: Instant::now(),
        }
    }

    fn check(&mut self, is_write: bool) -> Result<(), Duration> {
        self.last_access = Instant::now();
        let limiter = if is_write {
            &self.write_limiter
        } else {
            &self.read_limiter
        };
        limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(DefaultClock::default().now()))
    }
}

/// Rate limiter state shared across requests
pub struct RateLimitState {
    buckets: DashMap<IpAddr, TokenBucket>,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    /// `Err(wait)` when the caller must back off.
    pub fn check(&self, ip: IpAddr, is_write: bool) -> Result<(), Duration> {
        if !self.config.enabled || self.config.whitelist.contains(&ip) {
            return Ok(());
        }

        let mut bucket = self.buckets.entry(ip).or_insert_with(|| {
            debug!(ip = %ip, "[au-09] New rate limit bucket");
            TokenBucket::new(&self.config)
        });
        bucket.check(is_write)
    }

    /// Drop buckets idle for longer than `max_age`. Returns how many went.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_access) <= max_age);
        before.saturating_sub(self.buckets.len())
    }

    /// Get number of tracked IPs
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// Rate limit layer
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
    metrics: Arc<GatewayMetrics>,
}

impl RateLimitLayer {
    pub fn new(state: Arc<RateLimitState>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { state, metrics }
    }

    pub fn state(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Rate limit service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
    metrics: Arc<GatewayMetrics>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
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
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();
            if EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
                return inner.call(req).await;
            }

            let ip = extract_client_ip(&req);
            let is_write = is_write_method(req.method());

            match state.check(ip, is_write) {
                Ok(()) => inner.call(req).await,
                Err(retry_after) => {
                    let retry_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        ip = %ip,
                        retry_after_ms = retry_ms,
                        is_write,
                        "[au-09] Rate limit exceeded"
                    );
                    metrics.record_rate_limit_rejection();
                    Ok(ApiError::rate_limited(retry_ms).into_response())
                }
            }
        })
    }
}

fn is_write_method(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Client IP: first `X-Forwarded-For` hop, then `X-Real-IP`, then the socket.
pub(crate) fn extract_client_ip<B>(req: &Request<B>) -> IpAddr {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());
    if let Some(ip) = forwarded {
        return ip;
    }

    let real_ip = req
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());
    if let Some(ip) = real_ip {
        return ip;
    }

    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip();
    }

    IpAddr::from([127, 0, 0, 1])
}

/// Periodically drop idle buckets until `shutdown` flips to true.
pub async fn cleanup_task(
    state: Arc<RateLimitState>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let interval = state.config().cleanup_interval.max(Duration::from_secs(1));
    let max_age = state.config().idle_bucket_ttl;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = state.cleanup(max_age);
                if removed > 0 {
                    debug!(removed, remaining = state.bucket_count(), "[au-09] Rate limit buckets collected");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
