//! IPO terminal library
//!
//! Exposes the non-UI modules so integration tests can drive the cache,
//! clock, and CLI parsing without a terminal.

pub mod academy;
pub mod cache;
pub mod cli;
pub mod data;
pub mod freshness;
pub mod tools;
