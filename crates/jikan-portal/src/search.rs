//! Interactive controls: debounced search boxes and the year form.

use crate::api::HttpTransport;
use crate::debounce::Debouncer;
use crate::pipeline::{Outcome, Pipeline};
use crate::query::{parse_year, Query, YearError};
use std::time::Duration;
use tracing::{debug, warn};

/// Which catalogue a search box queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Anime,
    Manga,
}

impl SearchKind {
    fn query(self, term: &str) -> Query {
        match self {
            SearchKind::Anime => Query::anime_search(term),
            SearchKind::Manga => Query::manga_search(term),
        }
    }
}

/// Search box bound to a listing container through a debouncer
pub struct SearchController<T> {
    pipeline: Pipeline<T>,
    container: String,
    kind: SearchKind,
    debouncer: Debouncer,
}

impl<T: HttpTransport> SearchController<T> {
    pub fn new(pipeline: Pipeline<T>, container: &str, kind: SearchKind, delay: Duration) -> Self {
        Self {
            pipeline,
            container: container.to_string(),
            kind,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Handle one input-change event with the box's current value
    pub fn on_input(&mut self, value: &str) {
        let query = self.kind.query(value);
        debug!(container = %self.container, query = query.name(), "Search input changed");

        let pipeline = self.pipeline.clone();
        let container = self.container.clone();
        self.debouncer.schedule(async move {
            pipeline.run(&container, &query).await;
        });
    }

    /// Wait until the last scheduled search has rendered
    pub async fn settle(&mut self) {
        self.debouncer.flush().await;
    }
}

/// Year input plus submit control for the yearly listing
pub struct YearSearch<T> {
    pipeline: Pipeline<T>,
    container: String,
    min_year: i32,
    max_year: i32,
}

impl<T: HttpTransport> YearSearch<T> {
    pub fn new(pipeline: Pipeline<T>, container: &str, min_year: i32, max_year: i32) -> Self {
        Self {
            pipeline,
            container: container.to_string(),
            min_year,
            max_year,
        }
    }

    /// Submit the year input (button click or Enter)
    ///
    /// Invalid input raises an alert and issues no request.
    pub async fn submit(&self, input: &str) -> Result<Outcome, YearError> {
        let year = match parse_year(input, self.min_year, self.max_year) {
            Ok(year) => year,
            Err(e) => {
                warn!(input = input, error = %e, "Rejected year input");
                self.pipeline.document().alert(e.to_string());
                return Err(e);
            }
        };

        Ok(self.pipeline.run(&self.container, &Query::AnimeYear(year)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Location};
    use crate::testing::{self, anime, listing, manga, MockTransport};
    use tokio::time::sleep;

    fn pipeline(mock: &MockTransport) -> Pipeline<MockTransport> {
        let document = Document::new(
            Location::default(),
            ["anime-list", "manga-list", "anime-yearly"],
        );
        Pipeline::new(testing::client(mock), document)
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_issues_one_request() {
        let mock = MockTransport::new();
        mock.reply("/anime?q=naruto&limit=23", listing(vec![anime(20, "Naruto")]));
        let mut search = SearchController::new(
            pipeline(&mock),
            "anime-list",
            SearchKind::Anime,
            Duration::from_millis(300),
        );

        for value in ["n", "na", "nar", "naru", "narut", "naruto"] {
            search.on_input(value);
            sleep(Duration::from_millis(120)).await;
        }
        search.settle().await;

        assert_eq!(mock.requests(), vec!["/anime?q=naruto&limit=23"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_box_reloads_top_listing() {
        let mock = MockTransport::new();
        mock.reply("/top/anime?limit=24", listing(vec![anime(1, "Frieren")]));
        let mut search = SearchController::new(
            pipeline(&mock),
            "anime-list",
            SearchKind::Anime,
            Duration::from_millis(300),
        );

        search.on_input("   ");
        search.settle().await;

        assert_eq!(mock.requests(), vec!["/top/anime?limit=24"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manga_search() {
        let mock = MockTransport::new();
        mock.reply(
            "/manga?q=vinland+saga&limit=25",
            listing(vec![manga(642, "Vinland Saga")]),
        );
        let pipeline = pipeline(&mock);
        let mut search = SearchController::new(
            pipeline.clone(),
            "manga-list",
            SearchKind::Manga,
            Duration::from_millis(300),
        );

        search.on_input(" vinland saga ");
        search.settle().await;

        assert!(pipeline
            .document()
            .html("manga-list")
            .unwrap()
            .contains("Vinland Saga"));
    }

    #[tokio::test]
    async fn test_invalid_year_alerts_without_request() {
        let mock = MockTransport::new();
        let pipeline = pipeline(&mock);
        let form = YearSearch::new(pipeline.clone(), "anime-yearly", 1964, 2025);

        assert_eq!(form.submit("20a5").await, Err(YearError::Format));
        assert_eq!(
            form.submit("1950").await,
            Err(YearError::Range {
                min: 1964,
                max: 2025
            })
        );

        assert!(mock.requests().is_empty());
        assert_eq!(
            pipeline.document().alerts(),
            vec![
                "Please enter a valid 4-digit year.",
                "Year must be between 1964 and 2025."
            ]
        );
    }

    #[tokio::test]
    async fn test_valid_year_loads_listing() {
        let mock = MockTransport::new();
        mock.reply(
            "/anime?start_date=2006-01-01&end_date=2006-12-31&order_by=score&sort=desc&limit=15",
            listing(vec![anime(1535, "Death Note")]),
        );
        let form = YearSearch::new(pipeline(&mock), "anime-yearly", 1964, 2025);

        assert_eq!(form.submit(" 2006 ").await, Ok(Outcome::Rendered(1)));
    }
}
