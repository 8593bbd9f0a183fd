//! Fetch-and-render pipeline.
//!
//! One invocation: take a request token for the container, optionally show
//! a loading notice, issue one GET, and replace the container with either
//! the rendered cards or a notice. Failures are logged and rendered, never
//! returned to the caller.

use crate::api::{FetchError, HttpTransport, JikanClient, MediaRecord};
use crate::dom::{Document, RequestToken};
use crate::query::Query;
use crate::render::{self, CardKind, RenderError, Tone};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// What one invocation did to its container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Cards rendered for this many records
    Rendered(usize),
    /// Empty result set (notice or blank container, per listing)
    Empty,
    /// Failure notice rendered
    Failed,
    /// A later invocation owns the container; nothing was written
    Stale,
    /// The container is not on this page
    Missing,
}

/// Per-listing presentation of the loading, empty and failure states
#[derive(Debug, Clone)]
pub struct ListingPolicy {
    pub card: CardKind,
    pub loading: Option<&'static str>,
    /// `None` leaves the container blank on an empty result
    pub empty: Option<(&'static str, Tone)>,
    pub failure: (String, Tone),
}

impl ListingPolicy {
    /// Observed behaviour of each listing
    ///
    /// Manga and genre listings announce an empty result; the other anime
    /// listings leave the container blank.
    pub fn for_query(query: &Query) -> Self {
        match query {
            Query::AnimeSearch(_) | Query::TopAnime => Self {
                card: CardKind::Anime,
                loading: None,
                empty: None,
                failure: ("Failed to load anime.".to_string(), Tone::Error),
            },
            Query::AnimeYear(year) => Self {
                card: CardKind::Anime,
                loading: None,
                empty: None,
                failure: (format!("Failed to load anime for {year}"), Tone::Error),
            },
            Query::Upcoming => Self {
                card: CardKind::Anime,
                loading: Some("Loading upcoming anime..."),
                empty: None,
                failure: ("Failed to load upcoming anime.".to_string(), Tone::Plain),
            },
            Query::AnimeGenre(_) => Self {
                card: CardKind::Anime,
                loading: Some("Loading genre anime..."),
                empty: Some((GENRE_EMPTY, Tone::Plain)),
                failure: ("Failed to load data.".to_string(), Tone::Plain),
            },
            Query::MangaSearch(_) | Query::TopManga => Self {
                card: CardKind::Manga,
                loading: None,
                empty: Some(("No manga found.", Tone::Light)),
                failure: ("Failed to load manga.".to_string(), Tone::Error),
            },
        }
    }
}

const GENRE_EMPTY: &str = "No anime found in this genre.";
const GENRE_LOADING_TITLE: &str = "Loading...";
const GENRE_ERROR_TITLE: &str = "Error loading genre.";

/// Everything that can end an invocation early
#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Shared fetch-and-render context for one page
pub struct Pipeline<T> {
    client: Arc<JikanClient<T>>,
    document: Document,
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            document: self.document.clone(),
        }
    }
}

impl<T: HttpTransport> Pipeline<T> {
    pub fn new(client: Arc<JikanClient<T>>, document: Document) -> Self {
        Self { client, document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Run one listing into one container
    pub async fn run(&self, container: &str, query: &Query) -> Outcome {
        let policy = ListingPolicy::for_query(query);
        let Some(token) = self.start(container, &policy) else {
            return Outcome::Missing;
        };

        let result = self.client.fetch_listing(query).await;
        self.finish(&token, query, &policy, result)
    }

    /// Run the genre listing, keeping the optional title label in step
    ///
    /// The label reads "Top {Genre} Anime" using the first record's genre
    /// with the requested id.
    pub async fn run_genre(&self, container: &str, title_label: &str, genre_id: u32) -> Outcome {
        let query = Query::AnimeGenre(genre_id);
        let policy = ListingPolicy::for_query(&query);

        self.set_label(title_label, GENRE_LOADING_TITLE);
        let Some(token) = self.start(container, &policy) else {
            return Outcome::Missing;
        };

        let result = self.client.fetch_listing(&query).await;
        let title = match &result {
            Ok(records) if records.is_empty() => GENRE_EMPTY.to_string(),
            Ok(records) => format!("Top {} Anime", genre_name(records, genre_id)),
            Err(_) => GENRE_ERROR_TITLE.to_string(),
        };

        let outcome = self.finish(&token, &query, &policy, result);
        if outcome != Outcome::Stale {
            self.set_label(title_label, &title);
        }
        outcome
    }

    /// Issue a token and show the loading notice, if the listing has one
    fn start(&self, container: &str, policy: &ListingPolicy) -> Option<RequestToken> {
        let token = self.document.begin_request(container)?;

        if let Some(loading) = policy.loading {
            match render::message(loading, Tone::Plain) {
                Ok(html) => {
                    self.document.apply(&token, html);
                }
                Err(e) => debug!(error = %e, "Failed to render loading notice"),
            }
        }

        Some(token)
    }

    /// Render the fetch result and write it if the token is still current
    fn finish(
        &self,
        token: &RequestToken,
        query: &Query,
        policy: &ListingPolicy,
        result: Result<Vec<MediaRecord>, FetchError>,
    ) -> Outcome {
        let rendered = result
            .map_err(LoadError::from)
            .and_then(|records| render_listing(policy, &records).map_err(LoadError::from));

        let (outcome, html) = match rendered {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(
                    container = token.element(),
                    query = query.name(),
                    error = %e,
                    "Failed to load listing"
                );
                let (text, tone) = &policy.failure;
                let html = render::message(text, *tone).unwrap_or_default();
                (Outcome::Failed, html)
            }
        };

        if !self.document.apply(token, html) {
            return Outcome::Stale;
        }

        info!(
            container = token.element(),
            query = query.name(),
            token = token.seq(),
            outcome = ?outcome,
            "Listing rendered"
        );
        outcome
    }

    fn set_label(&self, id: &str, title: &str) {
        match render::text(title) {
            Ok(html) => {
                self.document.set_html(id, html);
            }
            Err(e) => debug!(error = %e, "Failed to render label"),
        }
    }
}

fn render_listing(
    policy: &ListingPolicy,
    records: &[MediaRecord],
) -> Result<(Outcome, String), RenderError> {
    if records.is_empty() {
        let html = match policy.empty {
            Some((text, tone)) => render::message(text, tone)?,
            None => String::new(),
        };
        return Ok((Outcome::Empty, html));
    }

    Ok((
        Outcome::Rendered(records.len()),
        render::cards(policy.card, records)?,
    ))
}

fn genre_name(records: &[MediaRecord], genre_id: u32) -> &str {
    records
        .first()
        .and_then(|record| {
            record
                .genres
                .iter()
                .find(|g| g.mal_id == Some(u64::from(genre_id)))
        })
        .and_then(|g| g.name.as_deref())
        .unwrap_or("Genre")
}
