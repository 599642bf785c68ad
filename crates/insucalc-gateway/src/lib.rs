//! Lookup gateway implementations.
//!
//! - [`HttpGateway`]: the product backend over HTTP (reqwest).
//! - [`FixtureGateway`]: an in-memory backend loaded from JSON.

pub mod fixture;
pub mod http;

pub use fixture::{BackendFixture, Endpoint, FailureKind, FixtureError, FixtureGateway};
pub use http::HttpGateway;
