//! Async client for the configuration API.

mod client;

pub use client::*;
