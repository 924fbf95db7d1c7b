//! Subprocess invocation: environment construction, failure-text
//! classification, and the timeout-racing invoker.

pub mod env;
pub mod invoker;
pub mod scan;
