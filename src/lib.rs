//! Async client for the Waldur cloud-management REST API.
//!
//! ```no_run
//! use waldur_client::{ClientConfig, Query, WaldurClient};
//!
//! # async fn run() -> waldur_client::Result<()> {
//! let client = WaldurClient::new(ClientConfig::new("https://waldur.example.com/api", "token"))?;
//! let projects = client.list_projects(Query::new().with("customer_uuid", "c1")).await?;
//! println!("{}", projects);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod identifier;
pub mod models;
pub mod query;
pub mod release_tag;
pub mod runtime;

pub use client::{QueryMode, WaldurClient};
pub use config::ClientConfig;
pub use endpoints::{Endpoint, OfferingType};
pub use error::{Result, WaldurError};
pub use models::Resource;
pub use query::Query;
