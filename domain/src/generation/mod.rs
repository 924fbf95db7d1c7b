//! Generation request/response contract and token usage counters.

pub mod request;
pub mod usage;
