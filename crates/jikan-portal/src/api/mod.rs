//! Jikan API v4 client implementation.
//!
//! The client builds endpoint URLs through [`crate::query::Endpoints`] and
//! delegates the actual GET to an [`HttpTransport`], so listings can be
//! rendered against scripted responses as well as the live API.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::JikanClient;
pub use error::FetchError;
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::*;
