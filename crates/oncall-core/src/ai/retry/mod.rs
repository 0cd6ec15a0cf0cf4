//! Rate limiting and retry logic
//!
//! Provides geometric backoff for oracle calls that hit rate limits (429 /
//! `RESOURCE_EXHAUSTED`). This is the only place transient oracle failures
//! are absorbed; everything else propagates.

mod backoff;

pub use backoff::{
    has_rate_limit_marker, is_rate_limit_status, with_retry, IsRateLimited, RetryConfig,
};
