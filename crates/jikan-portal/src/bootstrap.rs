//! Page bootstrapper.
//!
//! Runs once per page load: probes the document for the configured element
//! ids, binds the interactive controls that are present, and starts the
//! default listings for the containers that are present. This is the only
//! place default parameters are chosen.

use crate::api::{HttpTransport, JikanClient};
use crate::detail::{AnimePageOutcome, DetailContainers, DetailController};
use crate::dom::Document;
use crate::pipeline::{Outcome, Pipeline};
use crate::query::{is_record_id, Query};
use crate::render::{ANIME_ID_PARAM, MANGA_ID_PARAM};
use crate::search::{SearchController, SearchKind, YearSearch};
use shared::config::{ContainerIds, ListingConfig};
use shared::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What the initial load did; `None` means the controller was not activated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    pub anime_list: Option<Outcome>,
    pub yearly: Option<Outcome>,
    pub upcoming: Option<Outcome>,
    pub genre: Option<Outcome>,
    pub anime_page: Option<AnimePageOutcome>,
    pub manga_list: Option<Outcome>,
    pub manga_detail: Option<Outcome>,
}

impl BootReport {
    /// Number of controllers that ran
    pub fn activated(&self) -> usize {
        [
            self.anime_list.is_some(),
            self.yearly.is_some(),
            self.upcoming.is_some(),
            self.genre.is_some(),
            self.anime_page.is_some(),
            self.manga_list.is_some(),
            self.manga_detail.is_some(),
        ]
        .into_iter()
        .filter(|&active| active)
        .count()
    }
}

/// A booted page: the initial report plus the controls bound to it
pub struct Page<T> {
    pub report: BootReport,
    pub anime_search: Option<SearchController<T>>,
    pub manga_search: Option<SearchController<T>>,
    pub year_search: Option<YearSearch<T>>,
    pipeline: Pipeline<T>,
    containers: ContainerIds,
}

impl<T: HttpTransport> Page<T> {
    pub fn document(&self) -> &Document {
        self.pipeline.document()
    }

    /// Load a genre listing into the genre container, if the page has one
    pub async fn load_genre(&self, genre_id: u32) -> Outcome {
        self.pipeline
            .run_genre(
                &self.containers.genre_results,
                &self.containers.genre_title,
                genre_id,
            )
            .await
    }
}

pub struct Bootstrapper<T> {
    pipeline: Pipeline<T>,
    detail: DetailController<T>,
    containers: ContainerIds,
    listing: ListingConfig,
    debounce: Duration,
}

impl<T: HttpTransport> Bootstrapper<T> {
    pub fn new(client: Arc<JikanClient<T>>, document: Document, config: &Config) -> Self {
        let containers = config.containers.clone();
        let detail = DetailController::new(
            Arc::clone(&client),
            document.clone(),
            DetailContainers {
                anime_detail: containers.anime_detail.clone(),
                anime_characters: containers.anime_characters.clone(),
                manga_detail: containers.manga_detail.clone(),
            },
        );

        Self {
            pipeline: Pipeline::new(client, document),
            detail,
            containers,
            listing: config.listing.clone(),
            debounce: Duration::from_millis(config.search.debounce_ms),
        }
    }

    fn has(&self, id: &str) -> bool {
        self.pipeline.document().has(id)
    }

    /// Bind controls and run the default listings, concurrently
    pub async fn boot(self) -> Page<T> {
        let ids = &self.containers;
        let location = self.pipeline.document().location();
        info!(path = location.path(), "Bootstrapping page");

        let anime_search = (self.has(&ids.search_box) && self.has(&ids.anime_list)).then(|| {
            SearchController::new(
                self.pipeline.clone(),
                &ids.anime_list,
                SearchKind::Anime,
                self.debounce,
            )
        });

        let manga_search = (self.has(&ids.manga_search_box) && self.has(&ids.manga_list))
            .then(|| {
                SearchController::new(
                    self.pipeline.clone(),
                    &ids.manga_list,
                    SearchKind::Manga,
                    self.debounce,
                )
            });

        let year_search = (self.has(&ids.year_input)
            && self.has(&ids.year_button)
            && self.has(&ids.anime_yearly))
        .then(|| {
            YearSearch::new(
                self.pipeline.clone(),
                &ids.anime_yearly,
                self.listing.min_year,
                self.listing.max_year,
            )
        });

        let anime_list = async {
            if !self.has(&ids.anime_list) {
                return None;
            }
            Some(self.pipeline.run(&ids.anime_list, &Query::TopAnime).await)
        };

        let yearly = async {
            if !self.has(&ids.anime_yearly) {
                return None;
            }
            let query = Query::AnimeYear(self.listing.max_year);
            Some(self.pipeline.run(&ids.anime_yearly, &query).await)
        };

        let upcoming = async {
            if !self.has(&ids.anime_upcoming) {
                return None;
            }
            Some(self.pipeline.run(&ids.anime_upcoming, &Query::Upcoming).await)
        };

        let genre = async {
            let Some(genre_id) = self.listing.default_genre else {
                return None;
            };
            if !self.has(&ids.genre_results) {
                return None;
            }
            Some(
                self.pipeline
                    .run_genre(&ids.genre_results, &ids.genre_title, genre_id)
                    .await,
            )
        };

        let anime_page = async {
            if !self.has(&ids.anime_detail) && !self.has(&ids.anime_characters) {
                return None;
            }
            match location.param(ANIME_ID_PARAM).filter(|id| is_record_id(id)) {
                Some(id) => Some(self.detail.show_anime(id).await),
                None => {
                    self.detail.missing_anime_id();
                    None
                }
            }
        };

        let manga_list = async {
            if !self.has(&ids.manga_list) {
                return None;
            }
            Some(self.pipeline.run(&ids.manga_list, &Query::TopManga).await)
        };

        let manga_detail = async {
            if !self.has(&ids.manga_detail) {
                return None;
            }
            match location.param(MANGA_ID_PARAM).filter(|id| is_record_id(id)) {
                Some(id) => Some(self.detail.show_manga(id).await),
                None => {
                    self.detail.missing_manga_id();
                    None
                }
            }
        };

        let (anime_list, yearly, upcoming, genre, anime_page, manga_list, manga_detail) = tokio::join!(
            anime_list,
            yearly,
            upcoming,
            genre,
            anime_page,
            manga_list,
            manga_detail
        );

        let report = BootReport {
            anime_list,
            yearly,
            upcoming,
            genre,
            anime_page,
            manga_list,
            manga_detail,
        };
        info!(activated = report.activated(), "Page bootstrapped");

        Page {
            report,
            anime_search,
            manga_search,
            year_search,
            pipeline: self.pipeline,
            containers: self.containers,
        }
    }
}
