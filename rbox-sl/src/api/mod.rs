//! Shopping-list API boundary
//!
//! `types` mirrors the backend's JSON and converts it into the domain model,
//! rejecting malformed values. `client` performs the authenticated calls.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError, ServingsUpdate};
