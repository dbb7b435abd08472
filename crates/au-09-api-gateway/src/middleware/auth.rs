//! Back-office authentication.
//!
//! Every request under `/api/admin` must carry the configured key, either as
//! `Authorization: Bearer <key>` or as `X-API-Key: <key>`. Without a
//! configured key the back-office is closed.

use crate::domain::error::ApiError;
use axum::{body::Body, http::Request, response::IntoResponse, response::Response};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Authentication configuration
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Admin key (`None` = every admin request is refused)
    pub api_key: Option<String>,
}

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    config: Arc<AuthConfig>,
}

impl AuthLayer {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    config: Arc<AuthConfig>,
}

impl<S> Service<Request<Body>> for AuthService<S>
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
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !check_api_key(&req, &config) {
                warn!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "[au-09] Admin request rejected"
                );
                return Ok(ApiError::unauthorized("Valid admin API key required").into_response());
            }
            inner.call(req).await
        })
    }
}

/// Key presented on the request, from `Authorization: Bearer` or `X-API-Key`.
fn presented_key<B>(req: &Request<B>) -> Option<&str> {
    let bearer = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer.or_else(|| {
        req.headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
    })
}

/// Check API key from request
fn check_api_key<B>(req: &Request<B>, config: &AuthConfig) -> bool {
    let Some(expected) = &config.api_key else {
        return false;
    };
    presented_key(req).is_some_and(|key| constant_time_compare(key.trim(), expected))
}

/// Constant-time string comparison.
///
/// Both inputs are padded to the longer length with different bytes, so the
/// time taken depends only on the lengths.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
