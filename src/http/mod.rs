//! HTTP transport for the Waldur REST API.

mod client;
pub mod link;
pub mod retry;

pub use client::{HttpClient, OK, RESULT_COUNT_HEADER, RawResponse};
