//! Oracle layer
//!
//! Everything needed to talk to the reasoning service: conversation types,
//! the `Oracle` call boundary, the structured-output codec, and retry.

pub mod client;
pub mod codec;
pub mod oracle;
pub mod retry;
pub mod schema;
pub mod types;

pub use codec::{decode_structured, parse_json_payload, DecodeError};
pub use oracle::{Oracle, OracleError, OracleReply};
pub use retry::{with_retry, IsRateLimited, RetryConfig};
