//! An async client for a remote HTTP key-value store
//!
//! The store exposes a minimal REST surface: GET a key's value by path,
//! POST a form body to set, DELETE to remove, and GET with query
//! parameters to list keys by prefix. This library wraps that surface
//! with typed value encoding/decoding and best-effort multi-key
//! operations.
//!
//! # Features
//! - Async/await API using tokio and hyper
//! - JSON value round-tripping with an explicit absent-value sum type
//! - Raw-mode reads that bypass structured decoding
//! - Multi-key operations (`empty`, `get_all`, `set_all`,
//!   `delete_multiple`) with documented ordering and failure semantics
//! - Endpoint from an explicit argument or the `KV_STORE_URL`
//!   environment variable
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kv_store_client::StoreClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kv_store_client::Error> {
//!     let client = StoreClient::new("http://localhost:3000")?;
//!
//!     // Store a value
//!     client.set("user:1", &json!({ "name": "Ada" })).await?;
//!
//!     // Retrieve it
//!     let value = client.get("user:1").await?;
//!     println!("Retrieved: {:?}", value.as_json());
//!
//!     // List keys by prefix
//!     for key in client.list("user:").await? {
//!         println!("key: {}", key);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! There are no transactions, retries or caching: every operation is an
//! independent request, and multi-key operations never roll back partial
//! effects on failure.

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
mod transport;

pub use client::{GetOptions, StoreClient};
pub use codec::StoredValue;
pub use config::{ClientConfig, ENDPOINT_ENV};
pub use error::{Error, Result};
