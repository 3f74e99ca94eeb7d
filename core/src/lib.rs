//! Multi-get request builder for a search-engine client.
//!
//! # Overview
//! Turns a loosely-typed parameter mapping into an `HttpRequest` for the
//! `_mget` endpoint and hands it to a caller-supplied `Transport`. The crate
//! never touches the network itself, so building is deterministic and can be
//! tested without a cluster.
//!
//! # Design
//! - `build_mget` is a single validation pass that stops at the first bad
//!   option with `ApiError::InvalidArgument`.
//! - `Client` pairs the builder with a `Transport`; the transport owns the
//!   base URL, connections and retries.
//! - Request and response types use owned `String` / `Vec` fields so they
//!   move cleanly into whatever executes them.

pub mod client;
pub mod error;
pub mod http;
pub mod mget;
pub mod params;
pub mod query;
pub mod types;

pub use client::{Client, Transport};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mget::build_mget;
pub use params::Params;
pub use types::{MgetBody, MgetDoc};
