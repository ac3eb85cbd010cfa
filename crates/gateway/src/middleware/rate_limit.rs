//! Rate limiting middleware using token bucket algorithm

use academicworld_common::errors::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Global limiter plus the configured rate for error reporting
pub struct RequestLimiter {
    limiter: GlobalRateLimiter,
    requests_per_second: u32,
}

impl RequestLimiter {
    pub fn check(&self) -> Result<(), AppError> {
        self.limiter.check().map_err(|_| AppError::RateLimited {
            limit: self.requests_per_second,
        })
    }
}

/// Create a new rate limiter; zero settings fall back to one request
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Arc<RequestLimiter> {
    let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst).unwrap_or(rate);
    let quota = Quota::per_second(rate).allow_burst(burst);

    Arc::new(RequestLimiter {
        limiter: RateLimiter::direct(quota),
        requests_per_second: rate.get(),
    })
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RequestLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check()?;
    Ok(next.run(request).await)
}
