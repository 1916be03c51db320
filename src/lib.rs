//! Limiter - rate limit policy definitions
//!
//! This crate turns compact period commands such as `10-M` and a request
//! limit into validated rate records, either global (per client, any
//! endpoint) or scoped to one path and HTTP method. Scoped rates live in an
//! ordered registry that resolves the limit for a request. Counting requests
//! and enforcing limits is left to the caller.

pub mod config;
pub mod error;
pub mod ratelimit;

pub use error::{LimiterError, Result};
pub use ratelimit::{
    parse_global_rate, parse_scoped_rate, GlobalRate, RateRegistry, RateUnit, ScopedRate,
    SharedRateRegistry, NO_LIMIT,
};
