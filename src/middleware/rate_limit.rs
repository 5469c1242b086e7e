use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    kv::RateCounter,
    utils::{client_ip, error_codes, error_to_api_response},
};

pub struct RateLimiter {
    counter: RateCounter,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(counter: RateCounter, max_requests: u32) -> Self {
        Self {
            counter,
            max_requests,
        }
    }

    async fn check(&self, req: Request<Body>, next: Next) -> Response {
        let ip = client_ip(req.headers(), req.extensions());

        let count = match self.counter.hit(&ip).await {
            Ok(count) => count,
            Err(e) => {
                // Fail open when Redis is unreachable.
                tracing::warn!(%ip, "rate limit check skipped: {}", e);
                return next.run(req).await;
            }
        };

        if count > i64::from(self.max_requests) {
            tracing::info!(%ip, count, "rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!(
                        "too many requests, retry in {} seconds",
                        self.counter.window().as_secs()
                    ),
                ),
            )
                .into_response();
        }

        next.run(req).await
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check(req, next).await
}
