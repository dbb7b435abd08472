//! Request body size limit.
//!
//! `Content-Length` is checked up front; bodies without one are buffered up
//! to the limit. Either way an oversized body is a JSON 413.

use crate::domain::config::LimitsConfig;
use crate::domain::error::ApiError;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Body limit layer
#[derive(Clone)]
pub struct BodyLimitLayer {
    config: Arc<LimitsConfig>,
}

impl BodyLimitLayer {
    pub fn new(config: LimitsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for BodyLimitLayer {
    type Service = BodyLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BodyLimitService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Body limit service
#[derive(Clone)]
pub struct BodyLimitService<S> {
    inner: S,
    config: Arc<LimitsConfig>,
}

impl<S> Service<Request<Body>> for BodyLimitService<S>
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
        let limit = self.config.max_request_size;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let declared = req
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());

            match declared {
                Some(len) if len > limit => {
                    warn!(size = len, max = limit, "[au-09] Request body too large");
                    Ok(ApiError::payload_too_large(limit).into_response())
                }
                Some(_) => inner.call(req).await,
                None => {
                    let (parts, body) = req.into_parts();
                    match to_bytes(body, limit).await {
                        Ok(bytes) => inner.call(Request::from_parts(parts, Body::from(bytes))).await,
                        Err(e) => {
                            warn!(error = %e, max = limit, "[au-09] Request body rejected");
                            Ok(ApiError::payload_too_large(limit).into_response())
                        }
                    }
                }
            }
        })
    }
}
