//! Jikan portal: anime and manga listings rendered from the Jikan API v4.
//!
//! A page is an in-memory [`Document`] of identified elements. The
//! [`Bootstrapper`] probes it, binds the search controls that are present,
//! and fills each present container through the fetch-and-render
//! [`Pipeline`].

pub mod api;
pub mod bootstrap;
pub mod debounce;
pub mod detail;
pub mod dom;
pub mod pipeline;
pub mod query;
pub mod render;
pub mod search;

#[cfg(test)]
mod testing;

pub use api::{FetchError, HttpTransport, JikanClient, ReqwestTransport};
pub use bootstrap::{BootReport, Bootstrapper, Page};
pub use debounce::Debouncer;
pub use detail::{AnimePageOutcome, DetailController};
pub use dom::{Document, Location};
pub use pipeline::{Outcome, Pipeline};
pub use query::{is_record_id, parse_year, Endpoints, Query, YearError};
pub use search::{SearchController, SearchKind, YearSearch};
