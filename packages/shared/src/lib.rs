//! Shared utilities for Roomchat.
//!
//! Logger setup and time helpers used by the client crate.

pub mod logger;
pub mod time;
