//! Listing queries and endpoint URLs.
//!
//! Every listing translates deterministically to one GET URL; the mapping
//! is pure and lives here so the pipeline never formats URLs itself.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::config::ListingConfig;
use thiserror::Error;
use url::Url;

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

/// One logical listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Free-text anime search (term is trimmed and non-empty)
    AnimeSearch(String),
    /// Top-rated anime
    TopAnime,
    /// Best-scored anime that started airing in the given year
    AnimeYear(i32),
    /// Best-scored anime in one genre
    AnimeGenre(u32),
    /// Upcoming season
    Upcoming,
    /// Free-text manga search (term is trimmed and non-empty)
    MangaSearch(String),
    /// Top-rated manga
    TopManga,
}

impl Query {
    /// Anime search for raw input text; blank input means the top listing
    pub fn anime_search(term: &str) -> Self {
        match term.trim() {
            "" => Query::TopAnime,
            term => Query::AnimeSearch(term.to_string()),
        }
    }

    /// Manga search for raw input text; blank input means the top listing
    pub fn manga_search(term: &str) -> Self {
        match term.trim() {
            "" => Query::TopManga,
            term => Query::MangaSearch(term.to_string()),
        }
    }

    /// Short name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            Query::AnimeSearch(_) => "anime_search",
            Query::TopAnime => "top_anime",
            Query::AnimeYear(_) => "anime_year",
            Query::AnimeGenre(_) => "anime_genre",
            Query::Upcoming => "upcoming",
            Query::MangaSearch(_) => "manga_search",
            Query::TopManga => "top_manga",
        }
    }
}

/// Rejected year input; the message is shown to the user verbatim
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearError {
    #[error("Please enter a valid 4-digit year.")]
    Format,
    #[error("Year must be between {min} and {max}.")]
    Range { min: i32, max: i32 },
}

/// True if the identifier can stand as one URL path segment
///
/// Empty, `.` and `..` would be collapsed by URL normalization and address
/// a different endpoint, so they are not record identifiers.
pub fn is_record_id(id: &str) -> bool {
    !matches!(id, "" | "." | "..")
}

/// Validate year input against `^[0-9]{4}$` and the closed range `[min, max]`
pub fn parse_year(input: &str, min: i32, max: i32) -> Result<i32, YearError> {
    let input = input.trim();
    if !YEAR_PATTERN.is_match(input) {
        return Err(YearError::Format);
    }

    let year: i32 = input.parse().map_err(|_| YearError::Format)?;
    if year < min || year > max {
        return Err(YearError::Range { min, max });
    }

    Ok(year)
}

/// Endpoint URL builder for one API base
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    limits: ListingConfig,
}

impl Endpoints {
    /// Create a builder; the base must be an absolute hierarchical URL
    pub fn new(base_url: &str, limits: ListingConfig) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self { base, limits })
    }

    pub fn limits(&self) -> &ListingConfig {
        &self.limits
    }

    /// Base URL with extra path segments; segments are percent-encoded
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL for a listing query
    pub fn listing(&self, query: &Query) -> Url {
        let limits = &self.limits;
        match query {
            Query::AnimeSearch(term) => {
                let mut url = self.endpoint(["anime"]);
                url.query_pairs_mut()
                    .append_pair("q", term.trim())
                    .append_pair("limit", &limits.search_limit.to_string());
                url
            }
            Query::TopAnime => {
                let mut url = self.endpoint(["top", "anime"]);
                url.query_pairs_mut()
                    .append_pair("limit", &limits.top_limit.to_string());
                url
            }
            Query::AnimeYear(year) => {
                let mut url = self.endpoint(["anime"]);
                url.query_pairs_mut()
                    .append_pair("start_date", &format!("{year:04}-01-01"))
                    .append_pair("end_date", &format!("{year:04}-12-31"))
                    .append_pair("order_by", "score")
                    .append_pair("sort", "desc")
                    .append_pair("limit", &limits.year_limit.to_string());
                url
            }
            Query::AnimeGenre(genre_id) => {
                let mut url = self.endpoint(["anime"]);
                url.query_pairs_mut()
                    .append_pair("genres", &genre_id.to_string())
                    .append_pair("order_by", "score")
                    .append_pair("sort", "desc")
                    .append_pair("limit", &limits.genre_limit.to_string());
                url
            }
            Query::Upcoming => self.endpoint(["seasons", "upcoming"]),
            Query::MangaSearch(term) => {
                let mut url = self.endpoint(["manga"]);
                url.query_pairs_mut()
                    .append_pair("q", term.trim())
                    .append_pair("limit", &limits.manga_search_limit.to_string());
                url
            }
            Query::TopManga => {
                let mut url = self.endpoint(["top", "manga"]);
                url.query_pairs_mut()
                    .append_pair("limit", &limits.top_limit.to_string());
                url
            }
        }
    }

    /// Client-side truncation applied after the fetch, if any
    pub fn client_cap(&self, query: &Query) -> Option<usize> {
        match query {
            Query::Upcoming => Some(self.limits.upcoming_max),
            _ => None,
        }
    }

    /// Full anime representation (primary detail endpoint)
    pub fn anime_full(&self, id: &str) -> Url {
        self.endpoint(["anime", id, "full"])
    }

    /// Reduced anime representation (detail fallback)
    pub fn anime(&self, id: &str) -> Url {
        self.endpoint(["anime", id])
    }

    pub fn anime_characters(&self, id: &str) -> Url {
        self.endpoint(["anime", id, "characters"])
    }

    pub fn manga(&self, id: &str) -> Url {
        self.endpoint(["manga", id])
    }
}
