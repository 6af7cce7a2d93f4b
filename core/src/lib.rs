//! Blocking client for the Drone CI REST API.
//!
//! # Overview
//! `DroneClient` wraps a server address and credentials and exposes one
//! method per API endpoint: repositories, builds, logs, secrets, registries
//! and the user account. Each method formats a path, optionally attaches a
//! query string or JSON body, and performs a single HTTP call.
//!
//! # Design
//! - The client holds only an immutable `ClientConfig` plus a `Transport`.
//! - A status of 300 or above is returned as `ApiResponse::Failure`, never as
//!   an `Err`. Only transport and local faults are errors.
//! - No retries, pagination or caching. Timeouts are a transport setting.
//!
//! ```no_run
//! use drone_client::{DroneClient, QueryOptions};
//!
//! let client = DroneClient::from_env();
//! let builds = client.get_build_list("octocat", "hello-world", &QueryOptions::from([("page", "1")]))?;
//! println!("{:?}", builds.into_result());
//! # Ok::<(), drone_client::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod response;
pub mod types;

pub use client::DroneClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use query::{encode_query_string, QueryOptions};
pub use response::{ApiResponse, Failure};
pub use types::{Registry, RepoPatch, Secret, SignRequest};
