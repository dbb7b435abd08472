//! Request deadlines.
//!
//! Routes that wait on the payment processor get the longer payment
//! timeout; everything else gets the default.

use crate::domain::config::TimeoutConfig;
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tower::{Layer, Service};
use tracing::warn;

/// Timeout layer
#[derive(Clone)]
pub struct TimeoutLayer {
    config: Arc<TimeoutConfig>,
}

impl TimeoutLayer {
    pub fn new(config: TimeoutConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Timeout service
#[derive(Clone)]
pub struct TimeoutService<S> {
    inner: S,
    config: Arc<TimeoutConfig>,
}

impl<S> Service<Request<Body>> for TimeoutService<S>
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
        let deadline = timeout_for_path(req.uri().path(), &self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match timeout(deadline, inner.call(req)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = deadline.as_millis(), "[au-09] Request timed out");
                    Ok(ApiError::timeout(format!(
                        "Request exceeded {}s timeout",
                        deadline.as_secs_f32()
                    ))
                    .into_response())
                }
            }
        })
    }
}

/// Checkout and refunds call out to the payment processor.
fn timeout_for_path(path: &str, config: &TimeoutConfig) -> Duration {
    let is_payment = path == "/api/checkout"
        || (path.starts_with("/api/admin/orders/") && path.ends_with("/refund"));
    if is_payment {
        config.payment
    } else {
        config.default
    }
}
